use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::app::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub redis: BusStatus,
}

fn bus_status(state: &AppState) -> BusStatus {
    if state.publisher.is_connected() {
        BusStatus::Connected
    } else {
        BusStatus::Disconnected
    }
}

/// Process is up; the bus state is reported but does not fail the check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        redis: bus_status(&state),
    })
}

/// Ready only once events can actually be published.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match bus_status(&state) {
        BusStatus::Connected => (StatusCode::OK, "ready"),
        BusStatus::Disconnected => (StatusCode::SERVICE_UNAVAILABLE, "redis disconnected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::{body::Body, http::Request, Router};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::handlers::app::add_routes;
    use crate::publisher::MockPublisher;

    fn router(publisher: MockPublisher) -> Router {
        let state = AppState::new(Arc::new(publisher), "agent:events:test".to_owned());
        add_routes(Router::new(), state, 1_000_000)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, bytes::Bytes) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        (status, response.into_body().collect().await.unwrap().to_bytes())
    }

    #[tokio::test]
    async fn health_follows_bus_connection() {
        let publisher = MockPublisher::disconnected();
        let app = router(publisher.clone());

        let (status, body) = get(app.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({"status": "ok", "redis": "disconnected"})
        );

        publisher.set_connected(true);

        let (status, body) = get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({"status": "ok", "redis": "connected"})
        );
    }

    #[tokio::test]
    async fn readiness_requires_bus_connection() {
        let publisher = MockPublisher::disconnected();
        let app = router(publisher.clone());

        let (status, _) = get(app.clone(), "/_readiness").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        publisher.set_connected(true);

        let (status, body) = get(app, "/_readiness").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"ready");
    }
}
