use chrono::Utc;
use sqlx::postgres::PgPool;
use std::future::Future;
use std::time::Duration;

use super::retry::{retry_read, RetryConfig};
use super::{MenuItem, PricedLine, StorageError, StorageGateway, TRACKING_IN_PROGRESS};

// ============================================================================
// PostgreSQL Storage Gateway
// ============================================================================
//
// All queries are parameterized; no identifier is ever interpolated into SQL
// text. Every call carries a bounded timeout, and read paths retry transient
// failures. The order commit runs in one transaction with the order id drawn
// from a sequence, so concurrent finalizations cannot collide or leave
// partial rows behind.
//
// ============================================================================

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS food_items (
        item_id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        price DOUBLE PRECISION NOT NULL
    )",
    "CREATE SEQUENCE IF NOT EXISTS order_id_seq",
    "CREATE TABLE IF NOT EXISTS orders (
        order_id BIGINT NOT NULL,
        item_id BIGINT NOT NULL REFERENCES food_items (item_id),
        quantity INTEGER NOT NULL CHECK (quantity > 0),
        total_price DOUBLE PRECISION NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS orders_order_id_idx ON orders (order_id)",
    "CREATE TABLE IF NOT EXISTS order_tracking (
        order_id BIGINT PRIMARY KEY,
        status TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )",
];

pub struct PgStorageGateway {
    pool: PgPool,
    timeout: Duration,
    retry: RetryConfig,
}

impl PgStorageGateway {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self {
            pool,
            timeout,
            retry: RetryConfig::default(),
        }
    }

    /// Creates the menu, order, and tracking tables plus the order id
    /// sequence if they do not exist yet. Called once at startup.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Runs a query future under the configured deadline; expiry is a
    /// storage error, and an expired commit transaction rolls back on drop.
    async fn bounded<T>(
        &self,
        query: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, StorageError> {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => result.map_err(StorageError::from),
            Err(_) => Err(StorageError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

#[async_trait::async_trait]
impl StorageGateway for PgStorageGateway {
    async fn lookup_menu_item(&self, name: &str) -> Result<Option<MenuItem>, StorageError> {
        let row = retry_read(&self.retry, "lookup_menu_item", move || {
            self.bounded(
                sqlx::query_as::<_, (i64, f64)>(
                    "SELECT item_id, price FROM food_items WHERE name = $1",
                )
                .bind(name)
                .fetch_optional(&self.pool),
            )
        })
        .await?;

        Ok(row.map(|(item_id, price)| MenuItem {
            item_id,
            name: name.to_string(),
            price,
        }))
    }

    async fn commit_order(&self, lines: &[PricedLine]) -> Result<i64, StorageError> {
        self.bounded(async {
            let mut tx = self.pool.begin().await?;
            let now = Utc::now();

            let (order_id,): (i64,) = sqlx::query_as("SELECT nextval('order_id_seq')")
                .fetch_one(&mut *tx)
                .await?;

            for line in lines {
                sqlx::query(
                    "INSERT INTO orders (order_id, item_id, quantity, total_price, created_at) \
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(order_id)
                .bind(line.item_id)
                .bind(line.quantity as i32)
                .bind(line.total_price)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }

            sqlx::query(
                "INSERT INTO order_tracking (order_id, status, created_at) VALUES ($1, $2, $3)",
            )
            .bind(order_id)
            .bind(TRACKING_IN_PROGRESS)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;

            tracing::debug!(order_id, lines = lines.len(), "order transaction committed");
            Ok(order_id)
        })
        .await
    }

    async fn get_order_total(&self, order_id: i64) -> Result<f64, StorageError> {
        retry_read(&self.retry, "get_order_total", move || {
            self.bounded(
                sqlx::query_scalar::<_, f64>(
                    "SELECT COALESCE(SUM(total_price), 0) FROM orders WHERE order_id = $1",
                )
                .bind(order_id)
                .fetch_one(&self.pool),
            )
        })
        .await
    }

    async fn get_tracking_status(&self, order_id: i64) -> Result<Option<String>, StorageError> {
        retry_read(&self.retry, "get_tracking_status", move || {
            self.bounded(
                sqlx::query_scalar::<_, String>(
                    "SELECT status FROM order_tracking WHERE order_id = $1",
                )
                .bind(order_id)
                .fetch_optional(&self.pool),
            )
        })
        .await
    }
}
