//! Profile and chat endpoints.
//!
//! Both routes are registered with and without a trailing slash.
//! Malformed bodies and empty required fields are 422; storage failures
//! are 500. Everything else (unknown city, rule file trouble, model
//! errors) is a 200 whose `response` text says what went wrong.

use axum::extract::rejection::JsonRejection;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use airadvisor_advisory::PipelineError;
use airadvisor_core::advisory::{AdvisoryDiagnostics, AdvisoryRequest};
use airadvisor_core::error::ValidationError;
use airadvisor_core::profile::HealthProfile;

use crate::SharedState;

pub const PROFILE_SAVED: &str = "Profile saved/updated successfully";

pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/profile", post(profile_handler))
        .route("/profile/", post(profile_handler))
        .route("/chat", post(chat_handler))
        .route("/chat/", post(chat_handler))
        .with_state(state)
}

// ── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    #[serde(alias = "identifier")]
    pub name: String,
    pub condition: String,
    pub age_group: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: &'static str,
    pub profile: HealthProfile,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub diagnostics: ChatDiagnostics,
}

#[derive(Debug, Serialize)]
pub struct ChatDiagnostics {
    /// `no_profile`, `reply`, or `model_error`
    pub outcome: &'static str,

    #[serde(flatten)]
    pub stages: Option<AdvisoryDiagnostics>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: error.into() }))
}

fn rejection_error(rejection: JsonRejection) -> ApiError {
    warn!(error = %rejection.body_text(), "Rejected request body");
    api_error(
        StatusCode::UNPROCESSABLE_ENTITY,
        ValidationError::MalformedBody(rejection.body_text()).to_string(),
    )
}

fn pipeline_error(err: PipelineError) -> ApiError {
    match err {
        PipelineError::Validation(e) => api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        PipelineError::Store(e) => {
            warn!(error = %e, "Profile storage failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ── Handlers ───────────────────────────────────────────────────────────────

async fn profile_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let Json(payload) = payload.map_err(rejection_error)?;
    info!(name = %payload.name, "profile request");

    let profile = HealthProfile::new(payload.name, payload.condition, payload.age_group);
    let profile = state.pipeline.save_profile(profile).await.map_err(pipeline_error)?;

    Ok(Json(ProfileResponse {
        message: PROFILE_SAVED,
        profile,
    }))
}

async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<AdvisoryRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(rejection_error)?;
    info!(name = %request.name, city = %request.city, "chat request");

    let outcome = state.pipeline.advise(&request).await.map_err(pipeline_error)?;

    Ok(Json(ChatResponse {
        response: outcome.reply().to_string(),
        diagnostics: ChatDiagnostics {
            outcome: outcome.kind(),
            stages: outcome.diagnostics().cloned(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    use airadvisor_advisory::{AdvisoryPipeline, StaticRuleSource};
    use airadvisor_core::air_quality::{
        AirQualityLookup, AirQualityOutcome, AirQualityReading, Coordinates,
    };
    use airadvisor_core::error::{AirQualityError, ProviderError, StoreError};
    use airadvisor_core::profile::ProfileStore;
    use airadvisor_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
    use airadvisor_core::rule::RuleTable;
    use airadvisor_store::InMemoryProfileStore;

    use crate::GatewayState;

    /// Lightweight mock provider for gateway tests.
    struct MockProvider {
        response: Result<String, ProviderError>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(ProviderError::RateLimited {
                    retry_after_secs: 30,
                }),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().map(|text| ProviderResponse {
                text,
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
                model: "mock-model".into(),
            })
        }
    }

    struct MockAirQuality;

    #[async_trait::async_trait]
    impl AirQualityLookup for MockAirQuality {
        async fn resolve(&self, city: &str) -> AirQualityOutcome {
            if city == "Chennai" {
                AirQualityOutcome::Live {
                    coordinates: Coordinates::new(13.08, 80.27),
                    reading: AirQualityReading {
                        pollutants: BTreeMap::from([("pm10".to_string(), 80.0)]),
                        aqi_index: 4,
                    },
                }
            } else {
                AirQualityOutcome::Unavailable(AirQualityError::CityNotFound(city.to_string()))
            }
        }
    }

    /// A store whose every operation fails.
    struct BrokenStore;

    #[async_trait::async_trait]
    impl ProfileStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }
        async fn save(&self, _profile: HealthProfile) -> Result<(), StoreError> {
            Err(StoreError::Storage("disk full".into()))
        }
        async fn find(&self, _name: &str) -> Result<Option<HealthProfile>, StoreError> {
            Err(StoreError::QueryFailed("database is locked".into()))
        }
        async fn count(&self) -> Result<usize, StoreError> {
            Err(StoreError::QueryFailed("database is locked".into()))
        }
    }

    fn app_with(store: Arc<dyn ProfileStore>, provider: Arc<MockProvider>) -> Router {
        let pipeline = AdvisoryPipeline::new(
            store,
            Arc::new(MockAirQuality),
            Arc::new(StaticRuleSource::new(RuleTable::builtin())),
            provider,
            "mock-model",
        );
        api_router(Arc::new(GatewayState {
            pipeline: Arc::new(pipeline),
        }))
    }

    fn app(provider: Arc<MockProvider>) -> Router {
        app_with(Arc::new(InMemoryProfileStore::new()), provider)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    const ALICE: &str = r#"{"name":"alice","condition":"asthma","age_group":"adult"}"#;

    #[tokio::test]
    async fn save_profile_returns_confirmation() {
        let app = app(Arc::new(MockProvider::new("x")));
        let response = app.oneshot(post_json("/profile/", ALICE)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["message"], PROFILE_SAVED);
        assert_eq!(json["profile"]["name"], "alice");
        assert_eq!(json["profile"]["condition"], "asthma");
        assert_eq!(json["profile"]["age_group"], "adult");
    }

    #[tokio::test]
    async fn profile_route_without_trailing_slash() {
        let app = app(Arc::new(MockProvider::new("x")));
        let response = app.oneshot(post_json("/profile", ALICE)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn profile_with_empty_name_is_422() {
        let app = app(Arc::new(MockProvider::new("x")));
        let body = r#"{"name":"  ","condition":"asthma","age_group":"adult"}"#;
        let response = app.oneshot(post_json("/profile/", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn profile_with_missing_field_is_422() {
        let app = app(Arc::new(MockProvider::new("x")));
        let response = app
            .oneshot(post_json("/profile/", r#"{"name":"alice"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unrecognized_condition_is_stored_verbatim() {
        let app = app(Arc::new(MockProvider::new("x")));
        let body = r#"{"name":"carol","condition":"Hay Fever","age_group":"adult"}"#;
        let response = app.oneshot(post_json("/profile/", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["profile"]["condition"], "Hay Fever");
    }

    #[tokio::test]
    async fn chat_after_profile_returns_model_reply() {
        let provider = Arc::new(MockProvider::new("Keep your inhaler close."));
        let app = app(provider.clone());

        let response = app.clone().oneshot(post_json("/profile/", ALICE)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = r#"{"name":"alice","query":"Can I cycle to work?","city":"Chennai"}"#;
        let response = app.oneshot(post_json("/chat/", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["response"], "Keep your inhaler close.");
        assert_eq!(json["diagnostics"]["outcome"], "reply");
        assert_eq!(json["diagnostics"]["scaled_aqi"], 200);
        assert_eq!(json["diagnostics"]["air_quality"]["state"], "live");
        assert_eq!(json["diagnostics"]["precaution_origin"]["kind"], "rule");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn chat_accepts_identifier_and_question_aliases() {
        let app = app(Arc::new(MockProvider::new("ok")));
        app.clone().oneshot(post_json("/profile", ALICE)).await.unwrap();

        let body = r#"{"identifier":"alice","question":"Is it safe?","city":"Chennai"}"#;
        let response = app.oneshot(post_json("/chat", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["response"], "ok");
    }

    #[tokio::test]
    async fn chat_without_profile_skips_model() {
        let provider = Arc::new(MockProvider::new("unused"));
        let app = app(provider.clone());

        let body = r#"{"name":"bob","query":"Is it safe?","city":"Chennai"}"#;
        let response = app.oneshot(post_json("/chat/", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["diagnostics"]["outcome"], "no_profile");
        assert!(json["response"].as_str().unwrap().contains("/profile/"));
        assert!(json["diagnostics"].get("scaled_aqi").is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn chat_for_unknown_city_still_answers() {
        let app = app(Arc::new(MockProvider::new("General advice.")));
        app.clone().oneshot(post_json("/profile/", ALICE)).await.unwrap();

        let body = r#"{"name":"alice","query":"Is it safe?","city":"Nowhereville"}"#;
        let response = app.oneshot(post_json("/chat/", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["response"], "General advice.");
        assert_eq!(json["diagnostics"]["air_quality"]["state"], "unavailable");
        assert_eq!(json["diagnostics"]["precaution"], "General guidance.");
    }

    #[tokio::test]
    async fn chat_model_failure_is_200_with_error_text() {
        let app = app(Arc::new(MockProvider::failing()));
        app.clone().oneshot(post_json("/profile/", ALICE)).await.unwrap();

        let body = r#"{"name":"alice","query":"Is it safe?","city":"Chennai"}"#;
        let response = app.oneshot(post_json("/chat/", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["diagnostics"]["outcome"], "model_error");
        assert!(json["response"].as_str().unwrap().starts_with("Language model error:"));
    }

    #[tokio::test]
    async fn chat_with_empty_query_is_422() {
        let provider = Arc::new(MockProvider::new("x"));
        let app = app(provider.clone());
        let body = r#"{"name":"alice","query":"","city":"Chennai"}"#;
        let response = app.oneshot(post_json("/chat/", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn chat_with_malformed_json_is_422() {
        let app = app(Arc::new(MockProvider::new("x")));
        let response = app.oneshot(post_json("/chat/", "{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn storage_failure_is_500() {
        let app = app_with(Arc::new(BrokenStore), Arc::new(MockProvider::new("x")));

        let response = app.clone().oneshot(post_json("/profile/", ALICE)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = r#"{"name":"alice","query":"q","city":"Chennai"}"#;
        let response = app.oneshot(post_json("/chat/", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
