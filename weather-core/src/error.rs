use thiserror::Error;

/// Input rejected before any request is issued.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("City name must not be empty")]
    EmptyCity,

    #[error("Coordinates out of range: lat={lat}, lon={lon}")]
    OutOfRange { lat: f64, lon: f64 },
}

/// Failure of a single weather fetch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    #[error("Failed to fetch weather: {0}")]
    Network(String),

    /// The provider answered with a non-success `cod` (or HTTP status).
    #[error("Weather provider returned {code}: {message}")]
    NotFound { code: String, message: String },

    #[error("Failed to decode weather response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("Could not fetch location: {0}")]
    Unavailable(String),
}

/// Everything a lookup can end with. The `Display` text is what the user sees.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Location permission is required.")]
    PermissionDenied,

    #[error("Could not fetch location: {0}")]
    LocationUnavailable(String),

    #[error("No API key configured.\nHint: set {var} or run `weather configure`.")]
    ConfigMissing { var: &'static str },
}

impl From<LocationError> for LookupError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::Unavailable(reason) => LookupError::LocationUnavailable(reason),
        }
    }
}

impl From<QueryError> for LookupError {
    fn from(err: QueryError) -> Self {
        LookupError::Fetch(FetchError::InvalidQuery(err))
    }
}

impl LookupError {
    /// Short heading for the notice shown to the user.
    pub fn title(&self) -> &'static str {
        match self {
            LookupError::PermissionDenied => "Permission Denied",
            LookupError::ConfigMissing { .. } => "Configuration",
            LookupError::Fetch(FetchError::NotFound { .. }) => "Not Found",
            _ => "Error",
        }
    }
}
