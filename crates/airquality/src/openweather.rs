//! OpenWeather client: direct geocoding and current air pollution.
//!
//! - `GET /geo/1.0/direct?q={city}&limit=1&appid={key}` → `[{lat, lon, ...}]`
//! - `GET /data/2.5/air_pollution?lat=..&lon=..&appid={key}`
//!   → `{"list": [{"main": {"aqi": N}, "components": {...}}]}`

use async_trait::async_trait;
use airadvisor_core::air_quality::{AirQualityReading, Coordinates, Geocoder, PollutionSource};
use airadvisor_core::error::AirQualityError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

pub struct OpenWeatherClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenWeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    fn key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// GET `url` with `query` and return the body, or a message describing
    /// the transport or status failure. The key rides in the query string,
    /// so transport messages are stripped of the URL.
    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| e.without_url().to_string())?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.without_url().to_string())?;
        if !status.is_success() {
            return Err(format!("HTTP {}: {}", status.as_u16(), body));
        }
        Ok(body)
    }
}

#[async_trait]
impl Geocoder for OpenWeatherClient {
    fn name(&self) -> &str {
        "openweather"
    }

    async fn geocode(&self, city: &str) -> Result<Vec<Coordinates>, AirQualityError> {
        let key = self
            .key()
            .ok_or_else(|| AirQualityError::GeoService("OpenWeather API key is not set".into()))?;

        let url = format!("{}/geo/1.0/direct", self.base_url);
        debug!(city = %city, "Geocoding city");

        let body = self
            .get_text(
                &url,
                &[
                    ("q", city.to_string()),
                    ("limit", "1".to_string()),
                    ("appid", key.to_string()),
                ],
            )
            .await
            .map_err(AirQualityError::GeoService)?;

        parse_geocode(&body)
    }
}

#[async_trait]
impl PollutionSource for OpenWeatherClient {
    fn name(&self) -> &str {
        "openweather"
    }

    async fn current(&self, coordinates: Coordinates) -> Result<AirQualityReading, AirQualityError> {
        let key = self.key().ok_or_else(|| {
            AirQualityError::PollutionService("OpenWeather API key is not set".into())
        })?;

        let url = format!("{}/data/2.5/air_pollution", self.base_url);
        debug!(lat = coordinates.lat, lon = coordinates.lon, "Fetching air pollution");

        let body = self
            .get_text(
                &url,
                &[
                    ("lat", coordinates.lat.to_string()),
                    ("lon", coordinates.lon.to_string()),
                    ("appid", key.to_string()),
                ],
            )
            .await
            .map_err(AirQualityError::PollutionService)?;

        parse_pollution(&body)
    }
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct PollutionResponse {
    #[serde(default)]
    list: Vec<PollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct PollutionEntry {
    main: PollutionMain,
    #[serde(default)]
    components: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct PollutionMain {
    aqi: i64,
}

fn parse_geocode(body: &str) -> Result<Vec<Coordinates>, AirQualityError> {
    let results: Vec<GeoResult> = serde_json::from_str(body)
        .map_err(|e| AirQualityError::GeoService(format!("Failed to parse geocoding response: {e}")))?;
    Ok(results
        .into_iter()
        .map(|r| Coordinates::new(r.lat, r.lon))
        .collect())
}

fn parse_pollution(body: &str) -> Result<AirQualityReading, AirQualityError> {
    let response: PollutionResponse = serde_json::from_str(body).map_err(|e| {
        AirQualityError::PollutionService(format!("Failed to parse pollution response: {e}"))
    })?;

    let entry = response
        .list
        .into_iter()
        .next()
        .ok_or_else(|| AirQualityError::PollutionService("Pollution response has no entries".into()))?;

    Ok(AirQualityReading {
        pollutants: entry.components,
        aqi_index: entry.main.aqi,
    })
}
