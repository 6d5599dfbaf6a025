// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for callvault.
//!
//! TOML files layered with Figment, strict key checking
//! (`deny_unknown_fields`), `CALLVAULT_` environment overrides, semantic
//! validation, and miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use callvault_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("database: {}", config.storage.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str, to_toml_string};
pub use model::CallvaultConfig;

/// Load configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<CallvaultConfig, Vec<ConfigError>> {
    finish(loader::load_config())
}

/// Load configuration from an explicit file and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<CallvaultConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path))
}

/// Load configuration from an inline TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<CallvaultConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content))
}

fn finish(
    loaded: Result<CallvaultConfig, figment::Error>,
) -> Result<CallvaultConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(
                database_path = %config.storage.database_path,
                "configuration loaded"
            );
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}
