use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    config::ClientConfig,
    error::FetchError,
    model::{Query, WeatherResult},
    transport::{HttpTransport, RawResponse, ReqwestTransport, truncate_body},
};

use super::WeatherProvider;

/// Client for the OpenWeather "current weather" endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl OpenWeatherProvider<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: HttpTransport> OpenWeatherProvider<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn endpoint(&self) -> String {
        format!("{}/weather", self.config.base_url)
    }

    fn params(&self, query: &Query) -> Vec<(&'static str, String)> {
        let mut params = match query {
            Query::City(name) => vec![("q", name.clone())],
            Query::Coordinates(c) => {
                vec![("lat", c.latitude.to_string()), ("lon", c.longitude.to_string())]
            }
        };
        params.push(("appid", self.config.api_key.clone()));
        params.push(("units", "metric".to_string()));
        params
    }
}

#[async_trait]
impl<T: HttpTransport> WeatherProvider for OpenWeatherProvider<T> {
    async fn fetch(&self, query: &Query) -> Result<WeatherResult, FetchError> {
        let query = query.validated()?;
        tracing::debug!(?query, "requesting current weather");

        let params = self.params(&query);
        let res = self.transport.get(&self.endpoint(), &params).await?;

        let result = decode_current(&res);
        match &result {
            Ok(weather) => tracing::debug!(location = %weather.location_name, "weather decoded"),
            Err(err) => tracing::warn!(status = res.status, %err, "weather lookup failed"),
        }
        result
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCode {
    Number(i64),
    Text(String),
}

impl OwCode {
    fn as_string(&self) -> String {
        match self {
            OwCode::Number(n) => n.to_string(),
            OwCode::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwEnvelope {
    cod: Option<OwCode>,
    message: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    clouds: OwClouds,
    visibility: u32,
}

/// Turn a raw provider response into a result.
///
/// The body's `cod` decides success; it is a number on success and usually a
/// string on failure. HTTP status is the fallback when the body has none.
fn decode_current(res: &RawResponse) -> Result<WeatherResult, FetchError> {
    let value: Value = match serde_json::from_str(&res.body) {
        Ok(v) => v,
        Err(_) if !res.is_success() => {
            return Err(FetchError::NotFound {
                code: res.status.to_string(),
                message: truncate_body(&res.body),
            });
        }
        Err(e) => return Err(FetchError::Decode(e.to_string())),
    };

    let envelope = OwEnvelope::deserialize(&value).unwrap_or(OwEnvelope { cod: None, message: None });
    let code = envelope
        .cod
        .map(|c| c.as_string())
        .or_else(|| (!res.is_success()).then(|| res.status.to_string()));

    if let Some(code) = code.filter(|c| c != "200") {
        let message = match envelope.message {
            Some(Value::String(s)) if !s.is_empty() => s,
            _ => "location not found".to_string(),
        };
        return Err(FetchError::NotFound { code, message });
    }

    let parsed =
        OwCurrentResponse::deserialize(&value).map_err(|e| FetchError::Decode(e.to_string()))?;

    let description = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or_else(|| FetchError::Decode("missing weather[0].description".to_string()))?;

    Ok(WeatherResult {
        location_name: parsed.name,
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        pressure_hpa: parsed.main.pressure,
        wind_speed_mps: parsed.wind.speed,
        clouds_pct: parsed.clouds.all,
        visibility_m: parsed.visibility,
        description,
        observed_at: parsed.dt.and_then(unix_to_utc),
    })
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}
