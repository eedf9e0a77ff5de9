use actix::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::order::{OrderError, OrderLine, PartialOrder, RemovalReport};
use crate::metrics::Metrics;

// ============================================================================
// Accumulator Actor - exclusive owner of the session → partial-order map
// ============================================================================
//
// Every mutation of the in-progress order map goes through this actor's
// mailbox, one message at a time, so interleaved read-modify-write of a
// session entry cannot happen. Handlers are synchronous and purely
// in-memory; storage I/O belongs to the finalizer, outside the actor, so
// unrelated sessions never wait on the database.
//
// ============================================================================

pub struct AccumulatorActor {
    orders: HashMap<String, PartialOrder>,
    metrics: Arc<Metrics>,
}

impl AccumulatorActor {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            orders: HashMap::new(),
            metrics,
        }
    }

    fn record_session_count(&self) {
        self.metrics.active_sessions.set(self.orders.len() as i64);
    }
}

impl Actor for AccumulatorActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("AccumulatorActor started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(
            open_sessions = self.orders.len(),
            "AccumulatorActor stopped"
        );
    }
}

// ============================================================================
// Actor Messages
// ============================================================================

/// Merge lines into the session's partial order, creating it if needed.
/// Returns the full merged order for rendering.
#[derive(Message)]
#[rtype(result = "Result<PartialOrder, OrderError>")]
pub struct AddItems {
    pub session: String,
    pub lines: Vec<OrderLine>,
}

/// Remove at most one line per name (case-insensitive). Deletes the session
/// entry when the order ends up empty.
#[derive(Message)]
#[rtype(result = "Result<RemovalReport, OrderError>")]
pub struct RemoveItems {
    pub session: String,
    pub names: Vec<String>,
}

/// Read-only snapshot of the session's partial order.
#[derive(Message)]
#[rtype(result = "Option<PartialOrder>")]
pub struct PeekOrder {
    pub session: String,
}

/// Atomically remove and return the session's partial order. Finalization
/// drains the entry up front so the map is never held across storage I/O.
#[derive(Message)]
#[rtype(result = "Option<PartialOrder>")]
pub struct TakeOrder {
    pub session: String,
}

/// Put a drained order back after a failed finalization. Its lines land in
/// front of anything the session added in the meantime.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RestoreOrder {
    pub session: String,
    pub order: PartialOrder,
}

/// Unconditionally drop the session entry; idempotent.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClearSession {
    pub session: String,
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Handler<AddItems> for AccumulatorActor {
    type Result = Result<PartialOrder, OrderError>;

    fn handle(&mut self, msg: AddItems, _: &mut Self::Context) -> Self::Result {
        // Positive quantity is a map invariant; reject before touching state.
        if let Some(line) = msg.lines.iter().find(|line| line.quantity == 0) {
            return Err(OrderError::InvalidQuantity {
                quantity: 0.0,
                name: line.name.clone(),
            });
        }

        let order = self.orders.entry(msg.session.clone()).or_default();
        order.merge(msg.lines);
        let merged = order.clone();

        tracing::debug!(
            session = %msg.session,
            lines = merged.len(),
            "merged items into in-progress order"
        );
        self.record_session_count();

        Ok(merged)
    }
}

impl Handler<RemoveItems> for AccumulatorActor {
    type Result = Result<RemovalReport, OrderError>;

    fn handle(&mut self, msg: RemoveItems, _: &mut Self::Context) -> Self::Result {
        let Some(order) = self.orders.get_mut(&msg.session) else {
            return Err(OrderError::NoActiveOrder(msg.session));
        };

        let (removed, not_found) = order.remove_by_names(&msg.names);
        let remaining = order.clone();

        if remaining.is_empty() {
            self.orders.remove(&msg.session);
            tracing::debug!(session = %msg.session, "order emptied, session dropped");
        }
        self.record_session_count();

        Ok(RemovalReport {
            removed,
            not_found,
            remaining,
        })
    }
}

impl Handler<PeekOrder> for AccumulatorActor {
    type Result = Option<PartialOrder>;

    fn handle(&mut self, msg: PeekOrder, _: &mut Self::Context) -> Self::Result {
        self.orders.get(&msg.session).cloned()
    }
}

impl Handler<TakeOrder> for AccumulatorActor {
    type Result = Option<PartialOrder>;

    fn handle(&mut self, msg: TakeOrder, _: &mut Self::Context) -> Self::Result {
        let taken = self.orders.remove(&msg.session);
        self.record_session_count();
        taken
    }
}

impl Handler<RestoreOrder> for AccumulatorActor {
    type Result = ();

    fn handle(&mut self, msg: RestoreOrder, _: &mut Self::Context) {
        tracing::debug!(session = %msg.session, "restoring drained order");
        match self.orders.get_mut(&msg.session) {
            Some(existing) => existing.prepend(msg.order.into_lines()),
            None => {
                self.orders.insert(msg.session, msg.order);
            }
        }
        self.record_session_count();
    }
}

impl Handler<ClearSession> for AccumulatorActor {
    type Result = ();

    fn handle(&mut self, msg: ClearSession, _: &mut Self::Context) {
        self.orders.remove(&msg.session);
        self.record_session_count();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
