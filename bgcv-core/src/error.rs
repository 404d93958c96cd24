//! Error handling for the track viewer engine

use thiserror::Error;

/// Main error type for viewer operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewerError {
    #[error("Container element not found")]
    ContainerNotFound { selector: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Duplicate track id: {id}")]
    DuplicateTrack { id: String },

    #[error("Duplicate element id: {id}")]
    DuplicateElement { id: String },

    #[error("Invalid domain: [{min}, {max}] (min must be less than max)")]
    InvalidDomain { min: f64, max: f64 },

    #[error("Record error: {message}")]
    Record { message: String },
}

impl ViewerError {
    pub fn container_not_found<S: Into<String>>(selector: S) -> Self {
        Self::ContainerNotFound { selector: selector.into() }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn duplicate_track<S: Into<String>>(id: S) -> Self {
        Self::DuplicateTrack { id: id.into() }
    }

    pub fn duplicate_element<S: Into<String>>(id: S) -> Self {
        Self::DuplicateElement { id: id.into() }
    }

    pub fn invalid_domain(min: f64, max: f64) -> Self {
        Self::InvalidDomain { min, max }
    }

    pub fn record<S: Into<String>>(message: S) -> Self {
        Self::Record { message: message.into() }
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        Self::record(format!("JSON parsing error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_message() {
        let err = ViewerError::container_not_found("#missing");
        assert_eq!(err.to_string(), "Container element not found");
    }

    #[test]
    fn test_error_creation() {
        let err = ViewerError::config("bad extent");
        assert!(matches!(err, ViewerError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: bad extent");

        let err = ViewerError::invalid_domain(10.0, 5.0);
        assert!(err.to_string().contains("[10, 5]"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: ViewerError = json_err.into();
        assert!(matches!(err, ViewerError::Record { .. }));
    }
}
