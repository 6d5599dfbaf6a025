// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Item-scoped frame errors, per-item outcomes, and error log collapsing.
//!
//! A frame error never aborts a session. Each one remembers where it was
//! raised (`#[track_caller]`) so that collapsed log lines can point at an
//! example callsite.

use std::collections::HashMap;
use std::fmt;
use std::panic::Location;

use callvault_core::{CallStatus, Identity, InteractionId, InteractionKindTag, RecipientId};
use thiserror::Error;

use crate::recipient::{DuplicateRecipientId, UnknownRecipientId};
use crate::timestamp::InvalidTimestamp;

/// How many example ids a collapsed log line lists by default.
pub const DEFAULT_MAX_COLLAPSED_IDS: usize = 10;

/// Result of archiving or restoring one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome<T, E> {
    Success(T),
    /// The value is usable but some enrichment was dropped.
    PartialSuccess(T, Vec<E>),
    /// The item is dropped entirely.
    Failure(Vec<E>),
}

impl<T, E> FrameOutcome<T, E> {
    pub fn value(&self) -> Option<&T> {
        match self {
            FrameOutcome::Success(value) | FrameOutcome::PartialSuccess(value, _) => Some(value),
            FrameOutcome::Failure(_) => None,
        }
    }

    pub fn errors(&self) -> &[E] {
        match self {
            FrameOutcome::Success(_) => &[],
            FrameOutcome::PartialSuccess(_, errors) | FrameOutcome::Failure(errors) => errors,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FrameOutcome::Failure(_))
    }

    /// Transform the value, keeping the tier and errors.
    pub fn map_value<U>(self, f: impl FnOnce(T) -> U) -> FrameOutcome<U, E> {
        match self {
            FrameOutcome::Success(value) => FrameOutcome::Success(f(value)),
            FrameOutcome::PartialSuccess(value, errors) => {
                FrameOutcome::PartialSuccess(f(value), errors)
            }
            FrameOutcome::Failure(errors) => FrameOutcome::Failure(errors),
        }
    }

    pub fn into_parts(self) -> (Option<T>, Vec<E>) {
        match self {
            FrameOutcome::Success(value) => (Some(value), Vec::new()),
            FrameOutcome::PartialSuccess(value, errors) => (Some(value), errors),
            FrameOutcome::Failure(errors) => (None, errors),
        }
    }
}

/// Accumulates non-fatal errors while one item is processed.
#[derive(Debug)]
pub struct ItemErrors<E> {
    errors: Vec<E>,
}

impl<E> Default for ItemErrors<E> {
    fn default() -> Self {
        Self { errors: Vec::new() }
    }
}

impl<E> ItemErrors<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: E) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Success` when nothing was collected, `PartialSuccess` otherwise.
    pub fn finish<T>(self, value: T) -> FrameOutcome<T, E> {
        if self.errors.is_empty() {
            FrameOutcome::Success(value)
        } else {
            FrameOutcome::PartialSuccess(value, self.errors)
        }
    }

    /// Drop the item, keeping what was collected so far.
    pub fn fail<T>(mut self, error: E) -> FrameOutcome<T, E> {
        self.errors.push(error);
        FrameOutcome::Failure(self.errors)
    }
}

// --- archive side ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchiveFrameErrorKind {
    /// A referenced identity was never assigned a recipient id.
    #[error("referenced recipient {0} has no recipient id")]
    ReferencedRecipientIdMissing(Identity),

    /// The call record's status belongs to the other call kind.
    #[error("{kind} interaction has call record status {status:?}")]
    InvalidCallStatus {
        kind: InteractionKindTag,
        status: CallStatus,
    },

    #[error("invalid timestamp {0}")]
    TimestampInvalid(u64),

    /// A contact thread with no account id cannot be a chat recipient.
    #[error("contact thread {0} has no address")]
    ContactThreadMissingAddress(i64),

    #[error("thread {0} does not exist")]
    InteractionThreadMissing(i64),
}

impl From<InvalidTimestamp> for ArchiveFrameErrorKind {
    fn from(err: InvalidTimestamp) -> Self {
        ArchiveFrameErrorKind::TimestampInvalid(err.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFrameError {
    pub id: InteractionId,
    pub kind: ArchiveFrameErrorKind,
    callsite: &'static Location<'static>,
}

impl ArchiveFrameError {
    #[track_caller]
    pub fn new(id: InteractionId, kind: impl Into<ArchiveFrameErrorKind>) -> Self {
        Self {
            id,
            kind: kind.into(),
            callsite: Location::caller(),
        }
    }
}

impl LoggableError for ArchiveFrameError {
    fn type_log(&self) -> String {
        format!("ArchiveFrameError: {}", self.kind)
    }

    fn id_log(&self) -> String {
        format!("Interaction.{}", self.id)
    }

    fn callsite(&self) -> &'static Location<'static> {
        self.callsite
    }

    fn collapse_key(&self) -> Option<String> {
        match &self.kind {
            // The referenced identity is part of the type string.
            ArchiveFrameErrorKind::ReferencedRecipientIdMissing(_) => Some(self.type_log()),
            ArchiveFrameErrorKind::InteractionThreadMissing(_) => None,
            ArchiveFrameErrorKind::InvalidCallStatus { .. }
            | ArchiveFrameErrorKind::TimestampInvalid(_)
            | ArchiveFrameErrorKind::ContactThreadMissingAddress(_) => Some(self.id_log()),
        }
    }
}

impl fmt::Display for ArchiveFrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.type_log(), self.id_log(), self.callsite_log())
    }
}

impl std::error::Error for ArchiveFrameError {}

// --- restore side ---

/// Which frame a restore error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestoreFrameId {
    Recipient(RecipientId),
    ChatItem {
        chat_recipient_id: RecipientId,
        date_sent: u64,
    },
}

impl fmt::Display for RestoreFrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreFrameId::Recipient(id) => write!(f, "Recipient.{id}"),
            RestoreFrameId::ChatItem {
                chat_recipient_id,
                date_sent,
            } => write!(f, "ChatItem.{chat_recipient_id}.{date_sent}"),
        }
    }
}

/// The frame is well-formed on the wire but its content cannot be restored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidProtoData {
    #[error("recipient id {0} not found")]
    RecipientIdNotFound(RecipientId),
    #[error(transparent)]
    DuplicateRecipientId(#[from] DuplicateRecipientId),
    #[error("chat recipient {0} is not a contact or group")]
    ChatRecipientNotAThread(RecipientId),
    #[error("call payload does not match the archiver it was routed to")]
    UnexpectedCallKind,
    #[error("individual call is not in a contact thread")]
    IndividualCallNotInContactThread,
    #[error("individual call has an unrecognized type")]
    IndividualCallUnrecognizedType,
    #[error("individual call has an unrecognized direction")]
    IndividualCallUnrecognizedDirection,
    #[error("individual call has an unrecognized state")]
    IndividualCallUnrecognizedState,
    #[error("group call is not in a group thread")]
    GroupCallNotInGroupThread,
    #[error("group call has an unrecognized state")]
    GroupCallUnrecognizedState,
    #[error("group call recipient {0} is not an account")]
    GroupCallRecipientIdNotAnAci(RecipientId),
    #[error("invalid timestamp {0}")]
    InvalidTimestamp(u64),
}

impl From<UnknownRecipientId> for InvalidProtoData {
    fn from(err: UnknownRecipientId) -> Self {
        InvalidProtoData::RecipientIdNotFound(err.0)
    }
}

impl From<InvalidTimestamp> for InvalidProtoData {
    fn from(err: InvalidTimestamp) -> Self {
        InvalidProtoData::InvalidTimestamp(err.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestoreFrameErrorKind {
    #[error("invalid proto data: {0}")]
    InvalidProtoData(#[from] InvalidProtoData),
    /// Carries the rendered storage error.
    #[error("database insertion failed: {0}")]
    DatabaseInsertionFailed(String),
}

impl From<callvault_core::CallvaultError> for RestoreFrameErrorKind {
    fn from(err: callvault_core::CallvaultError) -> Self {
        RestoreFrameErrorKind::DatabaseInsertionFailed(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreFrameError {
    pub id: RestoreFrameId,
    pub kind: RestoreFrameErrorKind,
    callsite: &'static Location<'static>,
}

impl RestoreFrameError {
    #[track_caller]
    pub fn new(id: RestoreFrameId, kind: impl Into<RestoreFrameErrorKind>) -> Self {
        Self {
            id,
            kind: kind.into(),
            callsite: Location::caller(),
        }
    }

    /// The invalid-data reason, if that is what this error is.
    pub fn invalid_proto_data(&self) -> Option<&InvalidProtoData> {
        match &self.kind {
            RestoreFrameErrorKind::InvalidProtoData(reason) => Some(reason),
            RestoreFrameErrorKind::DatabaseInsertionFailed(_) => None,
        }
    }
}

impl LoggableError for RestoreFrameError {
    fn type_log(&self) -> String {
        format!("RestoreFrameError: {}", self.kind)
    }

    fn id_log(&self) -> String {
        self.id.to_string()
    }

    fn callsite(&self) -> &'static Location<'static> {
        self.callsite
    }

    fn collapse_key(&self) -> Option<String> {
        match &self.kind {
            RestoreFrameErrorKind::InvalidProtoData(InvalidProtoData::RecipientIdNotFound(_)) => {
                Some(self.type_log())
            }
            RestoreFrameErrorKind::InvalidProtoData(_) => Some(self.id_log()),
            // Repeats of the same storage failure are collapsed together.
            RestoreFrameErrorKind::DatabaseInsertionFailed(raw) => Some(raw.clone()),
        }
    }
}

impl fmt::Display for RestoreFrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.type_log(), self.id_log(), self.callsite_log())
    }
}

impl std::error::Error for RestoreFrameError {}

// --- log collapsing ---

/// An error that can be logged individually or collapsed with its peers.
pub trait LoggableError {
    fn type_log(&self) -> String;
    fn id_log(&self) -> String;
    fn callsite(&self) -> &'static Location<'static>;

    fn callsite_log(&self) -> String {
        let callsite = self.callsite();
        format!("{}:{}", callsite.file(), callsite.line())
    }

    /// Errors sharing a key are logged as one line. `None` logs as-is.
    fn collapse_key(&self) -> Option<String>;
}

struct CollapsedErrorLog {
    type_log: String,
    example_callsite: String,
    count: usize,
    ids: Vec<String>,
}

/// Log `errors` at error level, collapsing repeats. Returns the emitted lines.
pub fn log_errors<E: LoggableError>(errors: &[E], max_collapsed_ids: usize) -> Vec<String> {
    let mut as_is = Vec::new();
    let mut collapsed: Vec<CollapsedErrorLog> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for error in errors {
        let Some(key) = error.collapse_key() else {
            as_is.push(format!(
                "{} {} {}",
                error.type_log(),
                error.id_log(),
                error.callsite_log()
            ));
            continue;
        };

        let slot = *index.entry(key).or_insert_with(|| {
            collapsed.push(CollapsedErrorLog {
                type_log: error.type_log(),
                example_callsite: error.callsite_log(),
                count: 0,
                ids: Vec::new(),
            });
            collapsed.len() - 1
        });
        let log = &mut collapsed[slot];
        log.count += 1;
        if log.ids.len() < max_collapsed_ids {
            log.ids.push(error.id_log());
        }
    }

    let lines: Vec<String> = as_is
        .into_iter()
        .chain(collapsed.into_iter().map(|log| {
            format!(
                "{} Repeated {} times. from: [{}] example callsite: {}",
                log.type_log,
                log.count,
                log.ids.join(", "),
                log.example_callsite
            )
        }))
        .collect();

    for line in &lines {
        tracing::error!("{line}");
    }
    lines
}
