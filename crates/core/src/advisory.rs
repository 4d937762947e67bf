//! Advisory request/outcome types shared by the pipeline and its callers.

use serde::{Deserialize, Serialize};

use crate::air_quality::AirQualityStatus;
use crate::error::{ProviderError, ValidationError};

/// One advisory question from one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    /// Profile key
    #[serde(alias = "identifier")]
    pub name: String,

    pub city: String,

    /// Free-text question, passed to the model verbatim
    #[serde(rename = "query", alias = "question")]
    pub question: String,
}

impl AdvisoryRequest {
    pub fn new(
        name: impl Into<String>,
        city: impl Into<String>,
        question: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            question: question.into(),
        }
    }

    /// Reject requests the pipeline cannot meaningfully answer.
    ///
    /// The city is deliberately not checked: an empty or unknown city is
    /// the geocoder's call.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if self.question.trim().is_empty() {
            return Err(ValidationError::EmptyField("query"));
        }
        Ok(())
    }
}

/// Where the selected precaution text came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrecautionOrigin {
    /// Matched the rule at this position in the table.
    Rule { index: usize },
    /// No rule matched, or no AQI was available.
    Default,
    /// The rule resource could not be loaded.
    RuleError { detail: String },
}

/// How each stage of the pipeline fared, for clients and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryDiagnostics {
    pub air_quality: AirQualityStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaled_aqi: Option<i64>,

    pub precaution_origin: PrecautionOrigin,

    pub precaution: String,
}

/// The terminal state of one pipeline run.
#[derive(Debug, Clone)]
pub enum AdvisoryOutcome {
    /// No profile is stored under the requested name. The model was not called.
    NoProfile { message: String },

    /// The model answered; `reply` is its text verbatim.
    Reply {
        reply: String,
        diagnostics: AdvisoryDiagnostics,
    },

    /// The model call failed; `reply` embeds the error.
    ModelError {
        reply: String,
        error: ProviderError,
        diagnostics: AdvisoryDiagnostics,
    },
}

impl AdvisoryOutcome {
    /// The text to show the user, whichever terminal state was reached.
    pub fn reply(&self) -> &str {
        match self {
            AdvisoryOutcome::NoProfile { message } => message,
            AdvisoryOutcome::Reply { reply, .. } | AdvisoryOutcome::ModelError { reply, .. } => reply,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AdvisoryOutcome::NoProfile { .. } => "no_profile",
            AdvisoryOutcome::Reply { .. } => "reply",
            AdvisoryOutcome::ModelError { .. } => "model_error",
        }
    }

    pub fn diagnostics(&self) -> Option<&AdvisoryDiagnostics> {
        match self {
            AdvisoryOutcome::NoProfile { .. } => None,
            AdvisoryOutcome::Reply { diagnostics, .. }
            | AdvisoryOutcome::ModelError { diagnostics, .. } => Some(diagnostics),
        }
    }
}
