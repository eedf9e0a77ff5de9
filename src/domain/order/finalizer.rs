use actix::Addr;

use crate::actors::{AccumulatorActor, RestoreOrder, TakeOrder};
use crate::storage::{PricedLine, StorageGateway};

use super::errors::OrderError;
use super::partial_order::PartialOrder;

// ============================================================================
// Order Finalizer
// ============================================================================
//
// Orchestrates: drain session buffer → price against menu → commit atomically
//
// The buffer entry is drained up front so finalization never holds the
// session map across storage I/O; any failure restores the drained order,
// so a failed completion leaves the buffer intact and zero rows committed.
//
// ============================================================================

/// Result of a successful finalization, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    pub order_id: i64,
    pub total: f64,
}

/// Converts the session's partial order into persisted rows plus a tracking
/// record, clearing the session on success.
pub async fn complete(
    session: &str,
    accumulator: &Addr<AccumulatorActor>,
    storage: &dyn StorageGateway,
) -> Result<OrderReceipt, OrderError> {
    let order = accumulator
        .send(TakeOrder {
            session: session.to_string(),
        })
        .await?
        .ok_or_else(|| OrderError::NoActiveOrder(session.to_string()))?;

    let priced = match price_order(&order, storage).await {
        Ok(priced) => priced,
        Err(err) => {
            restore(accumulator, session, order).await;
            return Err(err);
        }
    };

    let order_id = match storage.commit_order(&priced).await {
        Ok(order_id) => order_id,
        Err(err) => {
            restore(accumulator, session, order).await;
            return Err(err.into());
        }
    };

    tracing::info!(
        session,
        order_id,
        lines = priced.len(),
        "order finalized"
    );

    // The persisted total is authoritative; fall back to the locally priced
    // sum if the read-back fails.
    let total = match storage.get_order_total(order_id).await {
        Ok(total) => total,
        Err(err) => {
            tracing::warn!(order_id, error = %err, "could not read back order total");
            priced.iter().map(|line| line.total_price).sum()
        }
    };

    Ok(OrderReceipt { order_id, total })
}

/// Looks up every line in the menu and computes its total price. Fails on
/// the first unknown item, before anything is written.
async fn price_order(
    order: &PartialOrder,
    storage: &dyn StorageGateway,
) -> Result<Vec<PricedLine>, OrderError> {
    let mut priced = Vec::with_capacity(order.len());

    for line in order.lines() {
        let item = storage
            .lookup_menu_item(&line.name)
            .await?
            .ok_or_else(|| OrderError::UnknownItem(line.name.clone()))?;

        priced.push(PricedLine {
            item_id: item.item_id,
            name: item.name,
            quantity: line.quantity,
            total_price: item.price * f64::from(line.quantity),
        });
    }

    Ok(priced)
}

async fn restore(accumulator: &Addr<AccumulatorActor>, session: &str, order: PartialOrder) {
    let send = accumulator.send(RestoreOrder {
        session: session.to_string(),
        order,
    });

    if let Err(err) = send.await {
        tracing::error!(
            session,
            error = %err,
            "failed to restore drained order after finalization failure"
        );
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{AddItems, PeekOrder};
    use crate::domain::order::OrderLine;
    use crate::metrics::Metrics;
    use crate::storage::mock::MockStorage;
    use actix::Actor;
    use std::sync::Arc;

    async fn accumulator_with(
        session: &str,
        lines: Vec<OrderLine>,
    ) -> Addr<AccumulatorActor> {
        let accumulator = AccumulatorActor::new(Arc::new(Metrics::new().unwrap())).start();
        accumulator
            .send(AddItems {
                session: session.to_string(),
                lines,
            })
            .await
            .unwrap()
            .unwrap();
        accumulator
    }

    #[actix::test]
    async fn test_complete_persists_lines_and_clears_session() {
        let storage = MockStorage::with_menu(&[("Pizza", 10.5), ("Coke", 2.0)]);
        let accumulator = accumulator_with(
            "s1",
            vec![OrderLine::new("Pizza", 2), OrderLine::new("Coke", 1)],
        )
        .await;

        let receipt = complete("s1", &accumulator, &storage).await.unwrap();

        assert_eq!(receipt.total, 2.0 * 10.5 + 2.0);
        assert_eq!(storage.order_lines(receipt.order_id).len(), 2);
        assert_eq!(
            storage.tracking_status(receipt.order_id).as_deref(),
            Some("in progress")
        );

        let buffered = accumulator
            .send(PeekOrder {
                session: "s1".to_string(),
            })
            .await
            .unwrap();
        assert!(buffered.is_none());
    }

    #[actix::test]
    async fn test_order_ids_increase_across_completions() {
        let storage = MockStorage::with_menu(&[("Coke", 2.0)]);

        let first = {
            let accumulator = accumulator_with("s1", vec![OrderLine::new("Coke", 1)]).await;
            complete("s1", &accumulator, &storage).await.unwrap()
        };
        let second = {
            let accumulator = accumulator_with("s2", vec![OrderLine::new("Coke", 2)]).await;
            complete("s2", &accumulator, &storage).await.unwrap()
        };

        assert!(second.order_id > first.order_id);
    }

    #[actix::test]
    async fn test_unknown_item_commits_nothing_and_restores_buffer() {
        let storage = MockStorage::with_menu(&[("Pizza", 10.5)]);
        let accumulator = accumulator_with(
            "s1",
            vec![OrderLine::new("Pizza", 1), OrderLine::new("Unicorn Steak", 1)],
        )
        .await;

        let err = complete("s1", &accumulator, &storage).await.unwrap_err();

        assert!(matches!(err, OrderError::UnknownItem(name) if name == "Unicorn Steak"));
        assert_eq!(storage.committed_orders(), 0);

        let buffered = accumulator
            .send(PeekOrder {
                session: "s1".to_string(),
            })
            .await
            .unwrap()
            .expect("buffer should be restored after a failed completion");
        assert_eq!(buffered.len(), 2);
    }

    #[actix::test]
    async fn test_storage_failure_restores_buffer() {
        let storage = MockStorage::with_menu(&[("Pizza", 10.5)]);
        storage.fail_commits(true);
        let accumulator = accumulator_with("s1", vec![OrderLine::new("Pizza", 1)]).await;

        let err = complete("s1", &accumulator, &storage).await.unwrap_err();

        assert!(matches!(err, OrderError::Storage(_)));
        let buffered = accumulator
            .send(PeekOrder {
                session: "s1".to_string(),
            })
            .await
            .unwrap();
        assert!(buffered.is_some());
    }

    #[actix::test]
    async fn test_complete_without_session_is_not_found() {
        let storage = MockStorage::with_menu(&[]);
        let accumulator = AccumulatorActor::new(Arc::new(Metrics::new().unwrap())).start();

        let err = complete("ghost", &accumulator, &storage).await.unwrap_err();
        assert!(matches!(err, OrderError::NoActiveOrder(_)));
    }
}
