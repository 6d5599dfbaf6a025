// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Newline-delimited JSON encoding of the frame stream.
//!
//! The first line is a [`BackupHeader`]; every following non-blank line is
//! one [`Frame`]. Readers refuse streams whose format version has a
//! different major version than [`FORMAT_VERSION`].

use std::io::{BufRead, Lines, Write};

use callvault_core::CallvaultError;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::frame::Frame;

/// Version written into every new backup.
pub const FORMAT_VERSION: &str = "1.0.0";

/// Versions this build can read.
pub const SUPPORTED_VERSIONS: &str = "^1";

/// First line of every frame stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupHeader {
    pub version: String,
    pub backup_time_ms: u64,
}

impl BackupHeader {
    /// A header for a backup written now by this build.
    pub fn current(backup_time_ms: u64) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            backup_time_ms,
        }
    }

    /// Check the header's version against [`SUPPORTED_VERSIONS`].
    pub fn check_version(&self) -> Result<Version, CallvaultError> {
        let version = Version::parse(&self.version).map_err(|e| CallvaultError::FrameStream {
            message: format!("malformed backup version `{}`", self.version),
            source: Some(Box::new(e)),
        })?;
        let supported = VersionReq::parse(SUPPORTED_VERSIONS)
            .map_err(|e| CallvaultError::Internal(format!("bad supported range: {e}")))?;
        if !supported.matches(&version) {
            return Err(CallvaultError::UnsupportedVersion {
                found: self.version.clone(),
                supported: SUPPORTED_VERSIONS.to_string(),
            });
        }
        Ok(version)
    }
}

/// Where archived frames go.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), CallvaultError>;
}

impl FrameSink for Vec<Frame> {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), CallvaultError> {
        self.push(frame.clone());
        Ok(())
    }
}

fn stream_error(message: &str, err: impl std::error::Error + Send + Sync + 'static) -> CallvaultError {
    CallvaultError::FrameStream {
        message: message.to_string(),
        source: Some(Box::new(err)),
    }
}

/// Writes a header and then one frame per line.
pub struct FrameWriter<W: Write> {
    inner: W,
    frames_written: u64,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(mut inner: W, header: &BackupHeader) -> Result<Self, CallvaultError> {
        serde_json::to_writer(&mut inner, header)
            .map_err(|e| stream_error("failed to write backup header", e))?;
        inner
            .write_all(b"\n")
            .map_err(|e| stream_error("failed to write backup header", e))?;
        Ok(Self {
            inner,
            frames_written: 0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, CallvaultError> {
        self.inner
            .flush()
            .map_err(|e| stream_error("failed to flush frame stream", e))?;
        Ok(self.inner)
    }
}

impl<W: Write> FrameSink for FrameWriter<W> {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), CallvaultError> {
        serde_json::to_writer(&mut self.inner, frame)
            .map_err(|e| stream_error("failed to encode frame", e))?;
        self.inner
            .write_all(b"\n")
            .map_err(|e| stream_error("failed to write frame", e))?;
        self.frames_written += 1;
        Ok(())
    }
}

/// Reads a frame stream, validating the header up front.
///
/// Iterating yields frames in stream order. A line that fails to decode is
/// an error for the whole stream, not for one item.
pub struct FrameReader<R: BufRead> {
    lines: Lines<R>,
    header: BackupHeader,
    line_number: usize,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(reader: R) -> Result<Self, CallvaultError> {
        let mut lines = reader.lines();
        let first = match lines.next() {
            Some(line) => line.map_err(|e| stream_error("failed to read backup header", e))?,
            None => {
                return Err(CallvaultError::FrameStream {
                    message: "frame stream is empty".to_string(),
                    source: None,
                });
            }
        };
        let header: BackupHeader = serde_json::from_str(&first)
            .map_err(|e| stream_error("malformed backup header", e))?;
        let version = header.check_version()?;
        tracing::debug!(%version, backup_time_ms = header.backup_time_ms, "reading frame stream");

        Ok(Self {
            lines,
            header,
            line_number: 1,
        })
    }

    pub fn header(&self) -> &BackupHeader {
        &self.header
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<Frame, CallvaultError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(stream_error("failed to read frame", e))),
            };
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(serde_json::from_str(&line).map_err(|e| {
                stream_error(&format!("malformed frame on line {}", self.line_number), e)
            }));
        }
    }
}
