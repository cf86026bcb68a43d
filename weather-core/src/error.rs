use thiserror::Error;

/// Message shown when the search box is empty.
pub const EMPTY_CITY_MESSAGE: &str = "Please enter a city name";
/// Message shown when the current-weather request fails.
pub const WEATHER_FAILED_MESSAGE: &str = "Failed to fetch data for the entered city";
/// Message shown when the forecast request fails.
pub const FORECAST_FAILED_MESSAGE: &str = "Failed to fetch forecast data for the entered city";

/// Failure of a single request against the weather proxy.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} responded with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid forecast timestamp '{0}'")]
    Timestamp(String),
}

impl FetchError {
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            Self::Request { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => Some(*endpoint),
            Self::Timestamp(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_endpoint_and_code() {
        let err = FetchError::Status {
            endpoint: "weather",
            status: reqwest::StatusCode::NOT_FOUND,
            body: "city not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("weather"));
        assert!(msg.contains("404"));
        assert!(msg.contains("city not found"));
        assert_eq!(err.endpoint(), Some("weather"));
    }

    #[test]
    fn timestamp_error_has_no_endpoint() {
        let err = FetchError::Timestamp("yesterday".into());
        assert!(err.to_string().contains("yesterday"));
        assert_eq!(err.endpoint(), None);
    }
}
