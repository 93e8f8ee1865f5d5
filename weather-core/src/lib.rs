//! Core library for the `weather` lookup tool.
//!
//! This crate defines:
//! - Configuration (API key, provider base URL)
//! - The weather fetch client and its HTTP seam
//! - Location acquisition behind a consent step
//! - The controller that owns the lookup's `RequestState`
//!
//! It is used by `weather-lookup-cli`, but any front end can drive the controller.

pub mod config;
pub mod controller;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod transport;

pub use config::{ClientConfig, Config};
pub use controller::{Controller, RequestState, Ticket};
pub use error::{FetchError, LocationError, LookupError, QueryError};
pub use location::{FixedLocation, IpLocation, LocationSource, Permission};
pub use model::{Coordinates, Query, WeatherResult};
pub use provider::{OpenWeatherProvider, WeatherProvider};
