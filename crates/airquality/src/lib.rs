//! Air-quality resolution for AirAdvisor.
//!
//! Geocoders and pollution sources implement the core traits; the
//! [`AirQualityResolver`] combines them into an `AirQualityLookup` that
//! never fails outright.

pub mod local;
pub mod openweather;
pub mod resolver;

pub use local::LocalGeocoder;
pub use openweather::OpenWeatherClient;
pub use resolver::AirQualityResolver;

use airadvisor_config::{AppConfig, GeocoderKind};
use airadvisor_core::air_quality::{Coordinates, Geocoder};
use std::sync::Arc;
use std::time::Duration;

/// Build the resolver described by `config.air_quality`.
pub fn build_from_config(config: &AppConfig) -> AirQualityResolver {
    let aq = &config.air_quality;
    let timeout = Duration::from_secs(aq.timeout_secs);
    let openweather = Arc::new(OpenWeatherClient::new(&aq.base_url, aq.api_key.clone(), timeout));

    let geocoder: Option<Arc<dyn Geocoder>> = match aq.geocoder {
        GeocoderKind::Openweather => Some(openweather.clone() as Arc<dyn Geocoder>),
        GeocoderKind::Local => {
            let table = aq
                .cities
                .iter()
                .map(|(name, c)| (name, Coordinates::new(c.lat, c.lon)));
            Some(Arc::new(LocalGeocoder::new(table)) as Arc<dyn Geocoder>)
        }
        GeocoderKind::None => None,
    };

    let mut resolver = AirQualityResolver::new(geocoder, openweather, timeout);
    if let Some(c) = aq.fallback_coordinates {
        resolver = resolver.with_fallback(Coordinates::new(c.lat, c.lon));
    }
    resolver
}
