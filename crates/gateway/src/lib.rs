//! HTTP API gateway for AirAdvisor.
//!
//! Exposes the profile and chat endpoints plus a health check.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use airadvisor_advisory::AdvisoryPipeline;

/// Request bodies are small JSON objects.
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub pipeline: Arc<AdvisoryPipeline>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS open to any origin
/// - Request body size limit (64 KiB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(api::api_router(state))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: airadvisor_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let pipeline = airadvisor_advisory::build_from_config(&config).await?;
    let state = Arc::new(GatewayState {
        pipeline: Arc::new(pipeline),
    });

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use airadvisor_advisory::StaticRuleSource;
    use airadvisor_core::air_quality::{AirQualityLookup, AirQualityOutcome};
    use airadvisor_core::error::{AirQualityError, ProviderError};
    use airadvisor_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use airadvisor_core::rule::RuleTable;
    use airadvisor_store::InMemoryProfileStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct EchoProvider;

    #[async_trait::async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }
        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse {
                text: request.prompt,
                usage: None,
                model: request.model,
            })
        }
    }

    struct NoAirQuality;

    #[async_trait::async_trait]
    impl AirQualityLookup for NoAirQuality {
        async fn resolve(&self, _city: &str) -> AirQualityOutcome {
            AirQualityOutcome::Unavailable(AirQualityError::Timeout(10))
        }
    }

    fn test_state() -> SharedState {
        let pipeline = AdvisoryPipeline::new(
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(NoAirQuality),
            Arc::new(StaticRuleSource::new(RuleTable::builtin())),
            Arc::new(EchoProvider),
            "echo-model",
        );
        Arc::new(GatewayState {
            pipeline: Arc::new(pipeline),
        })
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = build_router(test_state());
        let query = "a".repeat(BODY_LIMIT_BYTES + 1);
        let body = format!(r#"{{"name":"alice","query":"{query}","city":"Chennai"}}"#);

        let req = Request::builder()
            .method("POST")
            .uri("/chat/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_ne!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let app = build_router(test_state());
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/chat/")
            .header("origin", "http://example.org")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn unavailable_air_quality_reaches_prompt() {
        let app = build_router(test_state());
        let profile = r#"{"name":"dana","condition":"heart","age_group":"senior"}"#;
        let req = Request::builder()
            .method("POST")
            .uri("/profile/")
            .header("content-type", "application/json")
            .body(Body::from(profile))
            .unwrap();
        assert_eq!(app.clone().oneshot(req).await.unwrap().status(), StatusCode::OK);

        let chat = r#"{"name":"dana","query":"Walk today?","city":"Delhi"}"#;
        let req = Request::builder()
            .method("POST")
            .uri("/chat/")
            .header("content-type", "application/json")
            .body(Body::from(chat))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        // the echo provider returns the prompt as the reply
        let reply = json["response"].as_str().unwrap();
        assert!(reply.contains("AQI data: unavailable"));
        assert!(reply.contains("- Age Group: senior"));
    }
}
