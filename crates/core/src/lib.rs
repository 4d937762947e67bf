//! # AirAdvisor Core
//!
//! Domain types, collaborator traits, and error definitions for the
//! AirAdvisor service. This crate has **no framework dependencies**: it
//! defines the model that the store, air-quality, provider, and advisory
//! crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (profile storage, geocoding, pollution data,
//! the language model) is a trait here. Implementations live in their own
//! crates. This keeps the advisory pipeline testable with stub
//! collaborators and keeps the dependency graph pointing inward.

pub mod error;
pub mod profile;
pub mod air_quality;
pub mod rule;
pub mod provider;
pub mod advisory;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use profile::{AgeGroup, Condition, HealthProfile, ProfileStore};
pub use air_quality::{
    AirQualityLookup, AirQualityOutcome, AirQualityReading, AirQualityStatus, Coordinates,
    Geocoder, PollutionSource, scale_aqi,
};
pub use rule::{PrecautionRule, RuleTable};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use advisory::{AdvisoryDiagnostics, AdvisoryOutcome, AdvisoryRequest, PrecautionOrigin};
