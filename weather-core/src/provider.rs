use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::FetchError,
    model::{Query, WeatherResult},
};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// The weather fetch client: one request in, one normalized result out.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, query: &Query) -> Result<WeatherResult, FetchError>;

    /// Look up by city name. Blank names never reach the network.
    async fn fetch_by_name(&self, city: &str) -> Result<WeatherResult, FetchError> {
        let query = Query::city(city)?;
        self.fetch(&query).await
    }

    async fn fetch_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherResult, FetchError> {
        let query = Query::coordinates(latitude, longitude)?;
        self.fetch(&query).await
    }
}
