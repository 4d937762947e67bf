//! The advisory pipeline: one request in, one reply out.
//!
//! ```text
//! Received → ProfileLookup ─(absent)──────────────────→ NoProfile
//!                          └(present)→ AirQualityLookup → PrecautionSelection
//!                                    → PromptComposition → ModelInvocation
//!                                    ─(ok)→ Reply | (err)→ ModelError
//! ```
//!
//! Only validation and storage failures are returned as errors. Air quality,
//! rules, and model failures degrade into the reply.

use crate::prompt;
use crate::rules::RuleSource;
use crate::selector::select_precaution;
use airadvisor_core::advisory::{AdvisoryDiagnostics, AdvisoryOutcome, AdvisoryRequest};
use airadvisor_core::air_quality::AirQualityLookup;
use airadvisor_core::error::{ProviderError, StoreError, ValidationError};
use airadvisor_core::profile::{HealthProfile, ProfileStore};
use airadvisor_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Errors that abort a request instead of degrading its reply.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reply for an identifier with no stored profile.
pub fn no_profile_message(name: &str) -> String {
    format!(
        "Hi {name}, I don't have your health profile yet. Please set it via the /profile/ endpoint \
         with your condition (e.g. asthma, heart) and age group."
    )
}

/// Reply for a failed model call.
pub fn model_error_message(error: &ProviderError) -> String {
    format!("Language model error: {error}")
}

pub struct AdvisoryPipeline {
    store: Arc<dyn ProfileStore>,
    air_quality: Arc<dyn AirQualityLookup>,
    rules: Arc<dyn RuleSource>,
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    model_timeout: Duration,
}

impl AdvisoryPipeline {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        air_quality: Arc<dyn AirQualityLookup>,
        rules: Arc<dyn RuleSource>,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            air_quality,
            rules,
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: Some(1024),
            model_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn rules(&self) -> &Arc<dyn RuleSource> {
        &self.rules
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Create or replace the profile stored under `profile.name`.
    pub async fn save_profile(&self, profile: HealthProfile) -> Result<HealthProfile, PipelineError> {
        if profile.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name").into());
        }
        if !profile.condition.is_recognized() {
            warn!(name = %profile.name, condition = %profile.condition, "Storing unrecognized condition");
        }
        self.store.save(profile.clone()).await?;
        info!(name = %profile.name, condition = %profile.condition, age_group = %profile.age_group, "Profile saved");
        Ok(profile)
    }

    pub async fn find_profile(&self, name: &str) -> Result<Option<HealthProfile>, PipelineError> {
        Ok(self.store.find(name).await?)
    }

    /// Run one request through the pipeline.
    pub async fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryOutcome, PipelineError> {
        request.validate()?;
        debug!(name = %request.name, city = %request.city, "Advisory request received");

        let Some(profile) = self.store.find(&request.name).await? else {
            info!(name = %request.name, "No profile stored; skipping model call");
            return Ok(AdvisoryOutcome::NoProfile {
                message: no_profile_message(&request.name),
            });
        };

        let air_quality = self.air_quality.resolve(&request.city).await;
        let scaled_aqi = air_quality.scaled_aqi();

        let rules = self.rules.load().await;
        if let Err(e) = &rules {
            warn!(source = %self.rules.describe(), error = %e, "Rule table unavailable");
        }
        let precaution = select_precaution(&profile.condition, scaled_aqi, rules.as_deref());
        debug!(origin = ?precaution.origin, scaled_aqi = ?scaled_aqi, "Precaution selected");

        let diagnostics = AdvisoryDiagnostics {
            air_quality: air_quality.status(),
            scaled_aqi,
            precaution_origin: precaution.origin.clone(),
            precaution: precaution.text.clone(),
        };

        let prompt = prompt::compose(
            &profile,
            &request.city,
            &air_quality,
            &precaution.text,
            &request.question,
        );

        match self.invoke_model(prompt).await {
            Ok(reply) => {
                info!(name = %request.name, provider = self.provider.name(), "Advisory reply produced");
                Ok(AdvisoryOutcome::Reply { reply, diagnostics })
            }
            Err(error) => {
                warn!(name = %request.name, provider = self.provider.name(), error = %error, "Model call failed");
                Ok(AdvisoryOutcome::ModelError {
                    reply: model_error_message(&error),
                    error,
                    diagnostics,
                })
            }
        }
    }

    async fn invoke_model(&self, prompt: String) -> Result<String, ProviderError> {
        let mut request = ProviderRequest::new(&self.model, prompt);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        match tokio::time::timeout(self.model_timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => Ok(response.text),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProviderError::Timeout(format!(
                "no reply within {}s",
                self.model_timeout.as_secs()
            ))),
        }
    }
}
