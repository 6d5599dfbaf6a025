// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive and restore engine for call chat items.
//!
//! Converts call interactions and their optional call records into a
//! portable, versioned frame stream, and rebuilds equivalent local state
//! from such a stream.
//!
//! # Components
//!
//! - [`recipient`] - session-scoped identity/recipient-id registry
//! - [`bridge`] - the archivers' access to the local store
//! - [`individual_call`] / [`group_call`] - per-kind codecs behind [`CallItemArchiver`]
//! - [`timestamp`] / [`error`] - validation, per-item outcomes, log collapsing
//! - [`session`] - full archive and restore passes
//! - [`stream`] - newline-delimited JSON frame encoding

pub mod archiver;
pub mod bridge;
pub mod context;
pub mod error;
pub mod frame;
pub mod group_call;
pub mod individual_call;
pub mod recipient;
pub mod session;
pub mod stream;
pub mod timestamp;

pub use archiver::{ArchiveItemResult, CallItemArchiver, RestoreItemResult, archiver_for};
pub use context::{ArchivingContext, RestoringContext};
pub use error::{
    ArchiveFrameError, ArchiveFrameErrorKind, DEFAULT_MAX_COLLAPSED_IDS, FrameOutcome,
    InvalidProtoData, LoggableError, RestoreFrameError, RestoreFrameErrorKind, RestoreFrameId,
    log_errors,
};
pub use frame::{
    CallFrame, CallType, ChatItemFrame, Direction, Frame, GroupCallFrame, GroupCallState,
    IndividualCallFrame, IndividualCallState, RecipientFrame,
};
pub use session::{ArchiveSummary, RestoreSummary, archive_session, restore_session};
pub use stream::{BackupHeader, FrameReader, FrameSink, FrameWriter};
