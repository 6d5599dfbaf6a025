// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./callvault.toml` > `~/.config/callvault/callvault.toml` >
//! `/etc/callvault/callvault.toml`, with `CALLVAULT_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CallvaultConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/callvault/callvault.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "callvault.toml";

/// The per-user configuration file, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("callvault").join(LOCAL_CONFIG_FILE))
}

/// Build the full layered Figment without extracting it.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. System config
/// 3. User config
/// 4. `./callvault.toml`
/// 5. `CALLVAULT_*` environment variables
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CallvaultConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<CallvaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<CallvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CallvaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CallvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CallvaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment provider mapping the first `_` after a section name to a dot.
///
/// `Env::split("_")` would turn `CALLVAULT_STORAGE_DATABASE_PATH` into
/// `storage.database.path`; the explicit map yields `storage.database_path`.
fn env_provider() -> Env {
    Env::prefixed("CALLVAULT_").map(|key| {
        let key_str = key.as_str();
        let mapped = ["storage_", "backup_", "log_"]
            .iter()
            .find(|section| key_str.starts_with(*section))
            .map(|section| {
                format!(
                    "{}.{}",
                    section.trim_end_matches('_'),
                    &key_str[section.len()..]
                )
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}

/// Render a configuration as TOML, in the shape the loader accepts.
pub fn to_toml_string(config: &CallvaultConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}
