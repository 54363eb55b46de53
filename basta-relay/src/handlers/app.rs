use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use crate::metrics::track_metrics;
use crate::publisher::EventPublisher;

use super::{health, webhook};

#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<dyn EventPublisher + Send + Sync>,
    /// Channel every translated event is published on.
    pub channel: String,
}

impl AppState {
    pub fn new(publisher: Arc<dyn EventPublisher + Send + Sync>, channel: String) -> Self {
        AppState { publisher, channel }
    }
}

pub fn add_routes(router: Router, state: AppState, max_body_size: usize) -> Router {
    router
        .route("/", routing::get(index))
        .route("/_liveness", routing::get(index))
        .route(
            "/_readiness",
            routing::get(health::readiness).with_state(state.clone()),
        )
        .route(
            "/health",
            routing::get(health::health).with_state(state.clone()),
        )
        .route(
            "/webhook",
            routing::post(webhook::post_webhook)
                .with_state(state)
                .layer(DefaultBodyLimit::max(max_body_size)),
        )
}

/// The full service: routes, request tracing, HTTP metrics and, when a
/// recorder is installed, the prometheus endpoint.
pub fn app(state: AppState, max_body_size: usize, metrics: Option<PrometheusHandle>) -> Router {
    let router = add_routes(Router::new(), state, max_body_size);

    let router = match metrics {
        Some(recorder_handle) => router.route(
            "/metrics",
            routing::get(move || std::future::ready(recorder_handle.render())),
        ),
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(track_metrics))
}

pub async fn index() -> &'static str {
    "basta relay"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::MockPublisher;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt; // for `collect`
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`

    fn state() -> AppState {
        AppState::new(Arc::new(MockPublisher::new()), "agent:events:test".to_owned())
    }

    #[tokio::test]
    async fn index() {
        let app = add_routes(Router::new(), state(), 1_000_000);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"basta relay");
    }

    #[tokio::test]
    async fn liveness() {
        let app = app(state(), 1_000_000, None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/_liveness")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_route_is_absent_without_recorder() {
        let app = app(state(), 1_000_000, None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
