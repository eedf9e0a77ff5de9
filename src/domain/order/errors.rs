use crate::storage::StorageError;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("got {quantities} quantities for {items} food items")]
    MisalignedItems { quantities: usize, items: usize },

    #[error("invalid quantity {quantity} for {name}")]
    InvalidQuantity { quantity: f64, name: String },

    #[error("no order in progress for session {0:?}")]
    NoActiveOrder(String),

    #[error("{0} is not on the menu")]
    UnknownItem(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("order buffer unavailable: {0}")]
    BufferUnavailable(#[from] actix::MailboxError),
}
