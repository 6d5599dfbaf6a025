// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for callvault.

use thiserror::Error;

/// Batch-level error shared by every callvault crate.
///
/// Anything returned as `Err(CallvaultError)` from an archive or restore
/// session aborts the whole pass. Malformed individual items never surface
/// here; they are reported through the per-item frame errors instead.
#[derive(Debug, Error)]
pub enum CallvaultError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, migration, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The frame stream could not be encoded or decoded.
    #[error("frame stream error: {message}")]
    FrameStream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backup was produced by an incompatible format version.
    #[error("unsupported backup version {found} (supported: {supported})")]
    UnsupportedVersion { found: String, supported: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CallvaultError {
    /// Wrap any storage-layer error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        CallvaultError::Storage {
            source: Box::new(err),
        }
    }
}
