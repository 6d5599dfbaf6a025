// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::CallvaultConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every problem instead of failing fast.
pub fn validate_config(config: &CallvaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if let Some(account_id) = &config.backup.local_account_id {
        if account_id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "backup.local_account_id must not be empty when set".to_string(),
            });
        }
    }

    if config.backup.max_collapsed_ids == 0 {
        errors.push(ConfigError::Validation {
            message: "backup.max_collapsed_ids must be at least 1".to_string(),
        });
    }

    let level = config.log.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&CallvaultConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = CallvaultConfig::default();
        config.storage.database_path = "  ".to_string();
        config.backup.max_collapsed_ids = 0;
        config.log.level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn blank_local_account_id_is_rejected() {
        let mut config = CallvaultConfig::default();
        config.backup.local_account_id = Some(String::new());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("local_account_id"));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = CallvaultConfig::default();
        config.log.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
