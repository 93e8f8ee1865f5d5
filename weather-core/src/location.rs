//! Where "current location" comes from.
//!
//! The controller only sees a [`LocationSource`]: ask for permission, then take
//! one reading. A terminal has no GPS, so the default source approximates the
//! position from the caller's public IP address.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    error::LocationError,
    model::Coordinates,
    transport::{HttpTransport, ReqwestTransport},
};

pub const IP_LOOKUP_URL: &str = "http://ip-api.com/json/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn request_permission(&self) -> Permission;

    /// One-shot position reading. Only called after permission was granted.
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// A known position that needs no consent.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Approximate position from an IP geolocation service.
///
/// Carries no consent of its own: wrap it in something that asks.
#[derive(Debug, Clone)]
pub struct IpLocation<T = ReqwestTransport> {
    url: String,
    transport: T,
}

impl IpLocation<ReqwestTransport> {
    pub fn new() -> Self {
        Self::with_transport(IP_LOOKUP_URL, ReqwestTransport::new())
    }
}

impl Default for IpLocation<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HttpTransport> IpLocation<T> {
    pub fn with_transport(url: impl Into<String>, transport: T) -> Self {
        Self { url: url.into(), transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[async_trait]
impl<T: HttpTransport> LocationSource for IpLocation<T> {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let params = [("fields", "status,message,lat,lon".to_string())];
        let res = self
            .transport
            .get(&self.url, &params)
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if !res.is_success() {
            return Err(LocationError::Unavailable(format!(
                "location service returned status {}",
                res.status
            )));
        }

        let parsed: IpApiResponse = serde_json::from_str(&res.body)
            .map_err(|e| LocationError::Unavailable(format!("unreadable location response: {e}")))?;

        if parsed.status != "success" {
            let reason = parsed.message.unwrap_or_else(|| parsed.status.clone());
            return Err(LocationError::Unavailable(reason));
        }

        match (parsed.lat, parsed.lon) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon)
                .map_err(|e| LocationError::Unavailable(e.to_string())),
            _ => Err(LocationError::Unavailable("location response had no coordinates".into())),
        }
    }
}
