//! Air-quality readings and the collaborators that produce them.
//!
//! Resolution is two hops: a [`Geocoder`] turns a city name into
//! coordinates, then a [`PollutionSource`] returns the current reading for
//! those coordinates. An [`AirQualityLookup`] combines both and never fails
//! outright; every failure becomes a tagged [`AirQualityOutcome`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::AirQualityError;

/// Multiplier from the data source's 1–5 ordinal to the rule table's scale.
pub const AQI_SCALE: i64 = 50;

/// Scale an ordinal AQI to the rule table's numeric domain.
///
/// No clamping: an out-of-range ordinal (0, 6, ...) scales linearly and
/// simply fails to match rules written for 50–250. Saturates at the `i64`
/// bounds.
pub fn scale_aqi(ordinal: i64) -> i64 {
    ordinal.saturating_mul(AQI_SCALE)
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Current pollutant concentrations plus the coarse ordinal index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    /// Pollutant name → concentration (μg/m³), sorted by name
    pub pollutants: BTreeMap<String, f64>,

    /// Ordinal index as reported (nominally 1–5)
    pub aqi_index: i64,
}

impl AirQualityReading {
    pub fn scaled_aqi(&self) -> i64 {
        scale_aqi(self.aqi_index)
    }
}

/// The result of resolving a city to a reading.
#[derive(Debug, Clone, PartialEq)]
pub enum AirQualityOutcome {
    /// Geocoded normally and the pollution source answered.
    Live {
        coordinates: Coordinates,
        reading: AirQualityReading,
    },

    /// The city could not be located, so configured default coordinates
    /// were used instead. The reading does not describe the named city.
    FallbackCoordinates {
        coordinates: Coordinates,
        reading: AirQualityReading,
        reason: String,
    },

    /// No reading could be produced.
    Unavailable(AirQualityError),
}

impl AirQualityOutcome {
    pub fn reading(&self) -> Option<&AirQualityReading> {
        match self {
            AirQualityOutcome::Live { reading, .. }
            | AirQualityOutcome::FallbackCoordinates { reading, .. } => Some(reading),
            AirQualityOutcome::Unavailable(_) => None,
        }
    }

    pub fn scaled_aqi(&self) -> Option<i64> {
        self.reading().map(AirQualityReading::scaled_aqi)
    }

    pub fn status(&self) -> AirQualityStatus {
        match self {
            AirQualityOutcome::Live { .. } => AirQualityStatus::Live,
            AirQualityOutcome::FallbackCoordinates { reason, .. } => {
                AirQualityStatus::FallbackCoordinates {
                    detail: reason.clone(),
                }
            }
            AirQualityOutcome::Unavailable(err) => AirQualityStatus::Unavailable {
                detail: err.to_string(),
            },
        }
    }
}

/// Serializable summary of an [`AirQualityOutcome`], returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AirQualityStatus {
    Live,
    FallbackCoordinates { detail: String },
    Unavailable { detail: String },
}

/// City name → candidate coordinates. An empty list means "not found".
#[async_trait]
pub trait Geocoder: Send + Sync {
    fn name(&self) -> &str;

    async fn geocode(&self, city: &str) -> Result<Vec<Coordinates>, AirQualityError>;
}

/// Coordinates → current pollutant reading.
#[async_trait]
pub trait PollutionSource: Send + Sync {
    fn name(&self) -> &str;

    async fn current(&self, coordinates: Coordinates) -> Result<AirQualityReading, AirQualityError>;
}

/// City name → tagged air-quality outcome. Implementations must not fail.
#[async_trait]
pub trait AirQualityLookup: Send + Sync {
    async fn resolve(&self, city: &str) -> AirQualityOutcome;
}
