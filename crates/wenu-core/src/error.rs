//! Error types for the W -> e nu selection

use thiserror::Error;

/// Selection / aggregation error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Invalid job configuration (fatal at construction time)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed input record
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_message() {
        let err = Error::Config("endcap_min_eta must exceed barrel_max_eta".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: endcap_min_eta must exceed barrel_max_eta"
        );
    }

    #[test]
    fn json_error_converts() {
        let parse: std::result::Result<f64, _> = serde_json::from_str("not-a-number");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }
}
