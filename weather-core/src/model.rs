use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, QueryError> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);

        if !(lat_ok && lon_ok) {
            return Err(QueryError::OutOfRange { lat: latitude, lon: longitude });
        }

        Ok(Self { latitude, longitude })
    }
}

/// What to look up: a city by name or a point on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    Coordinates(Coordinates),
}

impl Query {
    /// Build a name query. The stored term is the trimmed input.
    pub fn city(input: &str) -> Result<Self, QueryError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyCity);
        }
        Ok(Query::City(trimmed.to_string()))
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Result<Self, QueryError> {
        Coordinates::new(latitude, longitude).map(Query::Coordinates)
    }

    /// Re-run the constructor checks, for queries built from the variants directly.
    pub fn validated(&self) -> Result<Self, QueryError> {
        match self {
            Query::City(name) => Query::city(name),
            Query::Coordinates(c) => Query::coordinates(c.latitude, c.longitude),
        }
    }
}

/// Current conditions, as decoded from the provider (metric units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub location_name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed_mps: f64,
    pub clouds_pct: u8,
    pub visibility_m: u32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherResult {
    pub fn visibility_km(&self) -> f64 {
        f64::from(self.visibility_m) / 1000.0
    }
}
