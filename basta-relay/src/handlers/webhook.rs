use std::time::Instant;

use axum::{
    extract::{rejection::BytesRejection, State},
    Json,
};
use basta_events::translate::translate_inbound;
use basta_events::{EventKind, InboundEvent, NormalizedEvent, Translation};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::metrics::{report_publish_error, report_published, report_webhook, WebhookOutcome};
use crate::publisher::{publish_event, PublishError};

use super::app::AppState;

/// Acknowledgement sent back to BASTA. Always `ok`, `handled` tells whether
/// an event was produced.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub ok: bool,
    pub handled: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventKind>,
}

impl WebhookResponse {
    fn handled(kind: EventKind) -> Self {
        WebhookResponse {
            ok: true,
            handled: true,
            kind: Some(kind),
        }
    }

    fn unhandled() -> Self {
        WebhookResponse {
            ok: true,
            handled: false,
            kind: None,
        }
    }
}

/// The body is taken as raw bytes: BASTA does not reliably send a
/// content type, so the `Json` extractor would reject its requests.
/// Bodies that cannot be read (over the body limit) are acknowledged
/// without being translated.
#[instrument(skip_all, fields(action_type))]
pub async fn post_webhook(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Json<WebhookResponse> {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            report_webhook(WebhookOutcome::Rejected);
            warn!(error = %e, "failed to read webhook body");
            return Json(WebhookResponse::unhandled());
        }
    };

    let inbound = InboundEvent::from_bytes(&body);
    let action_type = inbound.action_type.as_deref().unwrap_or("<missing>");
    tracing::Span::current().record("action_type", action_type);

    debug!(payload = %inbound.data, "received webhook");

    let response = match translate_inbound(&inbound) {
        Translation::Event(event) => {
            report_webhook(WebhookOutcome::Handled);
            info!(kind = %event.kind(), "translated webhook");

            publish(&state, &event).await;
            WebhookResponse::handled(event.kind())
        }
        Translation::Dropped => {
            report_webhook(WebhookOutcome::Dropped);
            info!("webhook produced no event");
            WebhookResponse::unhandled()
        }
        Translation::Unmapped => {
            report_webhook(WebhookOutcome::Unmapped);
            warn!("no translation for webhook action type");
            WebhookResponse::unhandled()
        }
    };

    Json(response)
}

/// Best effort: failures are logged and counted, never surfaced to the caller.
async fn publish(state: &AppState, event: &NormalizedEvent) {
    let start = Instant::now();

    match publish_event(state.publisher.as_ref(), &state.channel, event).await {
        Ok(()) => {
            report_published(start.elapsed());
            info!(channel = %state.channel, kind = %event.kind(), "published event");
        }
        Err(e) => {
            let reason = match &e {
                PublishError::NotConnected => "not_connected",
                PublishError::Encode(_) => "encode",
                PublishError::Redis(_) => "redis",
            };
            report_publish_error(reason);
            error!(channel = %state.channel, error = %e, "failed to publish event");
        }
    }
}
