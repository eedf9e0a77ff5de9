use actix::Addr;
use actix_web::{web, HttpResponse};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::actors::{AccumulatorActor, AddItems, RemoveItems};
use crate::domain::order::{finalizer, OrderError, OrderLine, RemovalReport};
use crate::metrics::Metrics;
use crate::storage::StorageGateway;

use super::intent::Intent;
use super::payload::{Parameters, WebhookRequest, WebhookResponse};
use super::session::extract_session_id;

// ============================================================================
// Webhook Handlers - one POST route, four terminal actions
// ============================================================================
//
// Business-logic failures (invalid order id, unknown intent, item not on the
// menu) degrade to a fulfillment message with HTTP 200; only an unparseable
// body produces a non-200. Raw error text never reaches the conversational
// platform.
//
// ============================================================================

pub struct AppState {
    pub accumulator: Addr<AccumulatorActor>,
    pub storage: Arc<dyn StorageGateway>,
    pub metrics: Arc<Metrics>,
}

const MSG_UNRECOGNIZED: &str = "Intent not recognized.";
const MSG_APOLOGY: &str =
    "Sorry, something went wrong while processing your order. Please try again.";

/// Entry point for the conversational platform's webhook calls.
pub async fn handle(
    state: web::Data<AppState>,
    payload: web::Json<WebhookRequest>,
) -> HttpResponse {
    let query = payload.into_inner().query_result;
    let session = query
        .output_contexts
        .first()
        .map(|context| extract_session_id(&context.name))
        .unwrap_or_default();

    let intent = Intent::from_display_name(&query.intent.display_name);
    let label = intent.map_or("unrecognized", Intent::label);
    let span = tracing::info_span!(
        "webhook",
        request_id = %Uuid::new_v4(),
        intent = label,
        session = %session,
    );

    async {
        state.metrics.requests_total.with_label_values(&[label]).inc();
        let timer = state
            .metrics
            .request_duration
            .with_label_values(&[label])
            .start_timer();

        let reply = match intent {
            Some(Intent::AddToOrder) => add_to_order(&state, &session, &query.parameters).await,
            Some(Intent::RemoveFromOrder) => {
                remove_from_order(&state, &session, &query.parameters).await
            }
            Some(Intent::CompleteOrder) => complete_order(&state, &session).await,
            Some(Intent::TrackOrder) => track_order(&state, &query.parameters).await,
            None => {
                tracing::debug!(display_name = %query.intent.display_name, "unrecognized intent");
                MSG_UNRECOGNIZED.to_string()
            }
        };

        timer.observe_duration();
        HttpResponse::Ok().json(WebhookResponse::text(reply))
    }
    .instrument(span)
    .await
}

// ============================================================================
// Intent Actions
// ============================================================================

async fn add_to_order(state: &AppState, session: &str, params: &Parameters) -> String {
    if params.food_item.is_empty() {
        return "I didn't catch the food items. Could you repeat that?".to_string();
    }

    let lines = match OrderLine::from_params(&params.number, &params.food_item) {
        Ok(lines) => lines,
        Err(err @ OrderError::MisalignedItems { .. }) => {
            tracing::debug!(error = %err, "rejected add request");
            return "Please provide a quantity for each food item.".to_string();
        }
        Err(err) => {
            tracing::debug!(error = %err, "rejected add request");
            return "Quantities need to be whole numbers of at least 1. Could you repeat that?"
                .to_string();
        }
    };

    let sent = state
        .accumulator
        .send(AddItems {
            session: session.to_string(),
            lines,
        })
        .await;

    match sent {
        Ok(Ok(order)) => {
            format!("So far, you have ordered: {order}. Do you need anything else?")
        }
        Ok(Err(err)) => {
            tracing::debug!(error = %err, "accumulator rejected add");
            "Quantities need to be whole numbers of at least 1. Could you repeat that?".to_string()
        }
        Err(err) => internal_apology(err.into()),
    }
}

async fn remove_from_order(state: &AppState, session: &str, params: &Parameters) -> String {
    if params.food_item.is_empty() {
        return "Please specify which items you want to remove.".to_string();
    }

    let sent = state
        .accumulator
        .send(RemoveItems {
            session: session.to_string(),
            names: params.food_item.clone(),
        })
        .await;

    match sent {
        Ok(Ok(report)) => render_removal(&report),
        Ok(Err(OrderError::NoActiveOrder(_))) => {
            "I'm having trouble finding your order. Can you place a new one?".to_string()
        }
        Ok(Err(err)) => internal_apology(err),
        Err(err) => internal_apology(err.into()),
    }
}

fn render_removal(report: &RemovalReport) -> String {
    let mut text = String::new();

    if !report.removed.is_empty() {
        text.push_str(&format!(
            "Removed {} from your order! ",
            report.removed.join(", ")
        ));
    }
    if !report.not_found.is_empty() {
        text.push_str(&format!(
            "Your current order does not have {}. ",
            report.not_found.join(", ")
        ));
    }

    if report.remaining.is_empty() {
        text.push_str("Your order is now empty!");
    } else {
        text.push_str(&format!(
            "Here is what remains in your order: {}",
            report.remaining
        ));
    }

    text
}

async fn complete_order(state: &AppState, session: &str) -> String {
    match finalizer::complete(session, &state.accumulator, state.storage.as_ref()).await {
        Ok(receipt) => {
            state.metrics.orders_completed_total.inc();
            format!(
                "Awesome! Your order has been placed successfully. \
                 Here is your order ID: #{}. \
                 Your total is {:.2}, payable upon delivery!",
                receipt.order_id, receipt.total
            )
        }
        Err(OrderError::NoActiveOrder(_)) => {
            "I'm having trouble finding your order. Sorry! Can you place a new order, please?"
                .to_string()
        }
        Err(OrderError::UnknownItem(name)) => {
            tracing::info!(item = %name, "completion rejected, item not on the menu");
            format!("Sorry, {name} is not on the menu. Please order from the menu only!")
        }
        Err(OrderError::Storage(err)) => {
            state.metrics.record_storage_error("finalize_order");
            internal_apology(err.into())
        }
        Err(err) => internal_apology(err),
    }
}

async fn track_order(state: &AppState, params: &Parameters) -> String {
    let Some(order_id) = params.order_id() else {
        return "Invalid order ID. Please provide a numeric order ID.".to_string();
    };

    match state.storage.get_tracking_status(order_id).await {
        Ok(Some(status)) => format!("The current status of order {order_id} is: {status}."),
        Ok(None) => format!("Sorry, I couldn't find an order with ID {order_id}."),
        Err(err) => {
            state.metrics.record_storage_error("get_tracking_status");
            tracing::error!(order_id, error = %err, "tracking status query failed");
            "Sorry, an error occurred while fetching the order status.".to_string()
        }
    }
}

fn internal_apology(err: OrderError) -> String {
    tracing::error!(error = %err, "webhook action failed");
    MSG_APOLOGY.to_string()
}

// ============================================================================
// Operational Endpoints
// ============================================================================

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "order-webhook"
    }))
}

pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&state.metrics.registry().gather(), &mut buffer) {
        tracing::error!(error = %err, "failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

// ============================================================================
// Handler Tests
// ============================================================================
