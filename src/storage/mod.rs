// ============================================================================
// Storage Gateway - relational persistence for menu, orders, and tracking
// ============================================================================
//
// The trait is the seam between the order logic and PostgreSQL: the finalizer
// and webhook handlers only ever see `StorageGateway`, so tests run against
// an in-memory mock. Order commit is a single transaction; the id allocation,
// line inserts, and tracking insert all land or none do.
//
// ============================================================================

mod postgres;
mod retry;

#[cfg(test)]
pub mod mock;

pub use postgres::PgStorageGateway;
pub use retry::{retry_read, RetryConfig};

use async_trait::async_trait;

/// Tracking status written for every freshly committed order.
pub const TRACKING_IN_PROGRESS: &str = "in progress";

/// A menu row: the item's storage identity and unit price.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub item_id: i64,
    pub name: String,
    pub price: f64,
}

/// An order line resolved against the menu, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub item_id: i64,
    pub name: String,
    pub quantity: u32,
    pub total_price: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("storage operation timed out after {0} ms")]
    Timeout(u64),
}

impl StorageError {
    /// Transient failures are worth retrying on read paths; everything else
    /// (constraint violations, decode errors, closed pools) is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Timeout(_) => true,
            StorageError::Query(err) => {
                matches!(err, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut)
            }
        }
    }
}

#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Menu lookup by exact item name.
    async fn lookup_menu_item(&self, name: &str) -> Result<Option<MenuItem>, StorageError>;

    /// Atomically allocates a fresh order id, inserts every line row, and
    /// writes the initial tracking record. Returns the new order id.
    async fn commit_order(&self, lines: &[PricedLine]) -> Result<i64, StorageError>;

    /// Sum of the order's line totals; 0 when no rows match.
    async fn get_order_total(&self, order_id: i64) -> Result<f64, StorageError>;

    async fn get_tracking_status(&self, order_id: i64) -> Result<Option<String>, StorageError>;
}
