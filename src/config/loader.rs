//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

pub(crate) fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_listed_in_display() {
        let err = parse_config(
            r#"
            [timeouts]
            request_secs = 0

            [security]
            frame_options = "ALLOWALL"
            "#,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Validation failed: timeouts.request_secs must be greater than 0, \
             security.frame_options `ALLOWALL` must be DENY or SAMEORIGIN"
        );
    }

    #[test]
    fn type_mismatch_is_a_parse_error() {
        let err = parse_config("[security]\nhsts_seconds = \"forever\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
