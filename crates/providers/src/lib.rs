//! Language-model provider implementations for AirAdvisor.
//!
//! All providers implement the `airadvisor_core::Provider` trait.
//! The router selects the correct provider based on configuration.

pub mod gemini;
pub mod openai_compat;
pub mod router;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};

use airadvisor_core::error::ProviderError;

/// Map a transport failure to a provider error.
///
/// The request URL is dropped from the message: it can carry credentials
/// and the text ends up in replies and logs.
pub(crate) fn transport_error(err: reqwest::Error) -> ProviderError {
    let err = err.without_url();
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else {
        ProviderError::Network(err.to_string())
    }
}
