use std::time::{Duration, Instant};

use axum::{
    body::Body, extract::MatchedPath, http::Request, middleware::Next, response::IntoResponse,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

const WEBHOOKS_TOTAL: &str = "basta_webhooks_total";
const PUBLISH_ERRORS_TOTAL: &str = "basta_publish_errors_total";
const PUBLISH_DURATION: &str = "basta_publish_duration_seconds";

/// What happened to a received webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Handled,
    Dropped,
    Unmapped,
    Rejected,
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Handled => "handled",
            WebhookOutcome::Dropped => "dropped",
            WebhookOutcome::Unmapped => "unmapped",
            WebhookOutcome::Rejected => "rejected",
        }
    }
}

pub fn report_webhook(outcome: WebhookOutcome) {
    counter!(WEBHOOKS_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

pub fn report_published(elapsed: Duration) {
    histogram!(PUBLISH_DURATION).record(elapsed.as_secs_f64());
}

pub fn report_publish_error(reason: &'static str) {
    counter!(PUBLISH_ERRORS_TOTAL, "reason" => reason).increment(1);
}

pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    // publishes are a single round trip to redis, keep resolution at the low end
    const PUBLISH_SECONDS: &[f64] = &[
        0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
    ];

    PrometheusBuilder::new()
        .set_buckets(PUBLISH_SECONDS)?
        .install_recorder()
}

/// Middleware recording request count and latency per route.
pub async fn track_metrics(req: Request<Body>, next: Next) -> impl IntoResponse {
    let start = Instant::now();

    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| req.uri().path().to_owned(), |p| p.as_str().to_owned());
    let method = req.method().to_string();

    let response = next.run(req).await;

    let labels = [
        ("method", method),
        ("path", path),
        ("status", response.status().as_u16().to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_requests_duration_seconds", &labels).record(start.elapsed().as_secs_f64());

    response
}
