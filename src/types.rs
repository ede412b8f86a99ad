use serde::{Deserialize, Serialize};
use std::fmt;

/// One Astronomy Picture of the Day entry, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApodRecord {
    pub title: String,
    pub date: String,
    #[serde(rename = "url")]
    pub media_url: String,
    pub explanation: String,
}

/// Failure classes surfaced to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    Network,
    ApiError,
    ServiceOutage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Network => "network",
            ErrorKind::ApiError => "api_error",
            ErrorKind::ServiceOutage => "service_outage",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error object carried alongside a load result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
}

impl LoadError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout() -> Self {
        Self::new(
            ErrorKind::Timeout,
            "Request timed out. The NASA API may be experiencing high load or connectivity issues.",
        )
    }

    pub fn network() -> Self {
        Self::new(
            ErrorKind::Network,
            "Network error. Please check your internet connection.",
        )
    }

    pub fn api_error() -> Self {
        Self::new(
            ErrorKind::ApiError,
            "Unable to fetch data from NASA API. Please try again later.",
        )
    }

    pub fn service_outage() -> Self {
        Self::new(
            ErrorKind::ServiceOutage,
            "NASA API is currently experiencing a service outage. Please try again later.",
        )
    }
}

/// Result of a single per-date fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Ok(ApodRecord),
    /// The upstream answered, but without the fields needed to show a card.
    Absent,
    Failed(LoadError),
}

impl FetchOutcome {
    pub fn error(&self) -> Option<&LoadError> {
        match self {
            FetchOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Ok(_) => "ok",
            FetchOutcome::Absent => "absent",
            FetchOutcome::Failed(err) => err.kind.as_str(),
        }
    }
}

/// Payload returned by the loader and by `GET /apod-loader`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResult {
    pub apods: Vec<ApodRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<LoadError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_result_serializes_wire_names() {
        let result = LoadResult {
            apods: vec![ApodRecord {
                title: "M31".to_string(),
                date: "2024-01-03".to_string(),
                media_url: "https://apod.nasa.gov/m31.jpg".to_string(),
                explanation: "Andromeda".to_string(),
            }],
            error: Some(LoadError::network()),
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["apods"][0]["url"], "https://apod.nasa.gov/m31.jpg");
        assert_eq!(value["error"]["type"], "network");
    }

    #[test]
    fn missing_error_is_omitted() {
        let result = LoadResult {
            apods: vec![],
            error: None,
        };
        let text = serde_json::to_string(&result).unwrap();
        assert_eq!(text, r#"{"apods":[]}"#);
    }
}
