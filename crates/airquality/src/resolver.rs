//! The air-quality resolver: city → coordinates → reading, bounded by a
//! timeout, with an explicitly flagged fallback-coordinates path.

use async_trait::async_trait;
use airadvisor_core::air_quality::{
    AirQualityLookup, AirQualityOutcome, Coordinates, Geocoder, PollutionSource,
};
use airadvisor_core::error::AirQualityError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct AirQualityResolver {
    /// `None` skips geocoding entirely.
    geocoder: Option<Arc<dyn Geocoder>>,
    pollution: Arc<dyn PollutionSource>,
    fallback: Option<Coordinates>,
    timeout: Duration,
}

impl AirQualityResolver {
    pub fn new(
        geocoder: Option<Arc<dyn Geocoder>>,
        pollution: Arc<dyn PollutionSource>,
        timeout: Duration,
    ) -> Self {
        Self {
            geocoder,
            pollution,
            fallback: None,
            timeout,
        }
    }

    /// Use `coordinates` when the city cannot be located or geocoding is
    /// skipped. Readings taken this way are reported as
    /// [`AirQualityOutcome::FallbackCoordinates`].
    pub fn with_fallback(mut self, coordinates: Coordinates) -> Self {
        self.fallback = Some(coordinates);
        self
    }

    /// Coordinates to query, plus the reason if they are fallback ones.
    async fn locate(&self, city: &str) -> Result<(Coordinates, Option<String>), AirQualityError> {
        let Some(geocoder) = &self.geocoder else {
            return self
                .fallback
                .map(|c| (c, Some("geocoding is disabled".to_string())))
                .ok_or_else(|| {
                    AirQualityError::GeoService(
                        "geocoding is disabled and no fallback coordinates are configured".into(),
                    )
                });
        };

        let candidates = geocoder.geocode(city).await?;
        if let Some(first) = candidates.first() {
            return Ok((*first, None));
        }

        match self.fallback {
            Some(c) => {
                let reason = format!("city '{city}' not found by {} geocoder", geocoder.name());
                Ok((c, Some(reason)))
            }
            None => Err(AirQualityError::CityNotFound(city.to_string())),
        }
    }

    async fn resolve_untimed(&self, city: &str) -> AirQualityOutcome {
        let (coordinates, fallback_reason) = match self.locate(city).await {
            Ok(located) => located,
            Err(e) => {
                warn!(city = %city, error = %e, "Could not locate city");
                return AirQualityOutcome::Unavailable(e);
            }
        };

        let reading = match self.pollution.current(coordinates).await {
            Ok(r) => r,
            Err(e) => {
                warn!(city = %city, error = %e, "Pollution lookup failed");
                return AirQualityOutcome::Unavailable(e);
            }
        };

        debug!(city = %city, aqi = reading.aqi_index, scaled = reading.scaled_aqi(), "Resolved air quality");

        match fallback_reason {
            None => AirQualityOutcome::Live { coordinates, reading },
            Some(reason) => {
                warn!(city = %city, reason = %reason, "Using fallback coordinates");
                AirQualityOutcome::FallbackCoordinates {
                    coordinates,
                    reading,
                    reason,
                }
            }
        }
    }
}

#[async_trait]
impl AirQualityLookup for AirQualityResolver {
    async fn resolve(&self, city: &str) -> AirQualityOutcome {
        match tokio::time::timeout(self.timeout, self.resolve_untimed(city)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(city = %city, timeout_secs = self.timeout.as_secs(), "Air quality lookup timed out");
                AirQualityOutcome::Unavailable(AirQualityError::Timeout(self.timeout.as_secs()))
            }
        }
    }
}
