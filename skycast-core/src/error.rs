use thiserror::Error;

/// Everything the geocode → fetch → map → cache pipeline can fail with.
///
/// The core never catches or translates these; the outermost caller decides
/// what to show the user (see [`WeatherError::user_message`]).
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Blank query or malformed location handed to the core. Programmer error.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No location found for query '{query}'")]
    LocationNotFound { query: String },

    /// The weather endpoint refused coordinates that geocoding produced (HTTP 400).
    #[error("Provider rejected coordinates lat={latitude} lon={longitude}")]
    BadLocation { latitude: f64, longitude: f64 },

    #[error("Provider request failed with status {status}")]
    ProviderRequest { status: u16 },

    /// The request never produced a status. The URL is stripped before this is built.
    #[error("Failed to reach provider: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl WeatherError {
    /// Message safe to show an end user. Only "not found" gets its own wording.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::LocationNotFound { .. } => {
                "Location not found. Please try a different city name."
            }
            _ => "Something went wrong. Please try again later.",
        }
    }

    /// Whether an external retry policy may reasonably try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderRequest { .. } | Self::Transport(_))
    }

    /// Status code carried by a failed provider request, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ProviderRequest { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the credential as a query parameter.
        Self::Transport(err.without_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_has_its_own_user_message() {
        let err = WeatherError::LocationNotFound { query: "Atlantis".into() };
        assert!(err.user_message().contains("different city name"));
    }

    #[test]
    fn everything_else_gets_generic_user_message() {
        let errors = [
            WeatherError::InvalidArgument("query is empty".into()),
            WeatherError::BadLocation { latitude: 1.0, longitude: 2.0 },
            WeatherError::ProviderRequest { status: 500 },
            WeatherError::Decode("bad json".into()),
            WeatherError::Cache("disk full".into()),
        ];

        for err in errors {
            assert_eq!(err.user_message(), "Something went wrong. Please try again later.");
        }
    }

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(WeatherError::ProviderRequest { status: 503 }.is_retryable());
        assert!(!WeatherError::BadLocation { latitude: 0.0, longitude: 0.0 }.is_retryable());
        assert!(!WeatherError::LocationNotFound { query: "x".into() }.is_retryable());
        assert!(!WeatherError::InvalidArgument("x".into()).is_retryable());
    }

    #[test]
    fn provider_request_carries_status() {
        let err = WeatherError::ProviderRequest { status: 500 };
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("500"));
        assert_eq!(WeatherError::Decode("x".into()).status(), None);
    }
}
