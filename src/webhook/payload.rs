use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Webhook Payload Types - Dialogflow request/response wire format
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub query_result: QueryResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub intent: IntentRef,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub output_contexts: Vec<OutputContext>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRef {
    #[serde(default)]
    pub display_name: String,
}

/// Slot-filled parameters. Field names are the agent's parameter names, not
/// camelCase.
#[derive(Debug, Default, Deserialize)]
pub struct Parameters {
    #[serde(default)]
    pub food_item: Vec<String>,
    #[serde(default)]
    pub number: Vec<f64>,
    #[serde(default)]
    pub order_id: Option<Value>,
}

impl Parameters {
    /// Dialogflow delivers the order id as either a JSON string or a bare
    /// number; anything else is treated as absent.
    pub fn order_id(&self) -> Option<i64> {
        match self.order_id.as_ref()? {
            Value::String(text) => text.trim().parse().ok(),
            Value::Number(number) => number.as_i64().or_else(|| {
                number
                    .as_f64()
                    .filter(|value| value.fract() == 0.0)
                    .map(|value| value as i64)
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OutputContext {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub fulfillment_text: String,
}

impl WebhookResponse {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            fulfillment_text: message.into(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
