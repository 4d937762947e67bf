//! Geocoder backed by a fixed city table from configuration.

use async_trait::async_trait;
use airadvisor_core::air_quality::{Coordinates, Geocoder};
use airadvisor_core::error::AirQualityError;
use std::collections::HashMap;

/// Looks cities up case-insensitively in a static table. Unknown cities
/// yield an empty result, same as a remote geocoder would.
pub struct LocalGeocoder {
    cities: HashMap<String, Coordinates>,
}

impl LocalGeocoder {
    pub fn new<I, S>(cities: I) -> Self
    where
        I: IntoIterator<Item = (S, Coordinates)>,
        S: AsRef<str>,
    {
        Self {
            cities: cities
                .into_iter()
                .map(|(name, c)| (normalize(name.as_ref()), c))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

fn normalize(city: &str) -> String {
    city.trim().to_lowercase()
}

#[async_trait]
impl Geocoder for LocalGeocoder {
    fn name(&self) -> &str {
        "local"
    }

    async fn geocode(&self, city: &str) -> Result<Vec<Coordinates>, AirQualityError> {
        Ok(self.cities.get(&normalize(city)).copied().into_iter().collect())
    }
}
