//! Advisory assembly for AirAdvisor.
//!
//! Ties a profile store, an air-quality lookup, a rule source, and a
//! language model into the [`AdvisoryPipeline`].

pub mod pipeline;
pub mod prompt;
pub mod rules;
pub mod selector;

pub use pipeline::{AdvisoryPipeline, PipelineError, model_error_message, no_profile_message};
pub use rules::{FileRuleSource, RuleSource, StaticRuleSource, default_rules_json, load_rules_file};
pub use selector::{DEFAULT_PRECAUTION, Precaution, select_precaution};

use airadvisor_config::AppConfig;
use airadvisor_core::error::StoreError;
use airadvisor_core::profile::ProfileStore;
use airadvisor_core::provider::Provider;
use airadvisor_store::SqliteProfileStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Open the configured profile database.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn ProfileStore>, StoreError> {
    let path = if config.storage.path.contains(":memory:") {
        config.storage.path.clone()
    } else {
        let path = config.storage_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Storage(format!("Cannot create {}: {e}", parent.display())))?;
        }
        path.to_string_lossy().into_owned()
    };
    Ok(Arc::new(SqliteProfileStore::new(&path).await?))
}

/// The rule source selected by `config.rules.cache`.
pub fn rule_source(config: &AppConfig) -> Arc<dyn RuleSource> {
    let path = config.rules_path();
    if config.rules.cache {
        Arc::new(StaticRuleSource::from_file(&path))
    } else {
        Arc::new(FileRuleSource::new(path))
    }
}

/// Build the full pipeline from configuration.
pub async fn build_from_config(config: &AppConfig) -> Result<AdvisoryPipeline, StoreError> {
    let store = open_store(config).await?;
    Ok(build_with_store(config, store))
}

/// Build the pipeline around an already-open store.
pub fn build_with_store(config: &AppConfig, store: Arc<dyn ProfileStore>) -> AdvisoryPipeline {
    let router = airadvisor_providers::build_from_config(config);
    let provider = router.default().unwrap_or_else(|| {
        // build_from_config always registers the default provider
        Arc::new(airadvisor_providers::GeminiProvider::new(
            config.api_key.clone().unwrap_or_default(),
        )) as Arc<dyn Provider>
    });

    let model = config
        .providers
        .get(&config.default_provider)
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone());

    let rules = rule_source(config);
    let air_quality = Arc::new(airadvisor_airquality::build_from_config(config));

    info!(
        provider = %config.default_provider,
        model = %model,
        rules = %rules.describe(),
        "Advisory pipeline ready"
    );

    AdvisoryPipeline::new(store, air_quality, rules, provider, model)
        .with_temperature(config.default_temperature)
        .with_max_tokens(Some(config.default_max_tokens))
        .with_model_timeout(Duration::from_secs(config.model_timeout_secs))
}
