// ============================================================================
// Webhook Surface - Dialogflow payload parsing, intent dispatch, rendering
// ============================================================================

mod handlers;
mod intent;
mod payload;
mod session;

pub use handlers::{handle, health, metrics, AppState};
