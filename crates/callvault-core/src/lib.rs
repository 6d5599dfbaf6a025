// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for callvault.
//!
//! This crate provides the error type, the identity model addressed by
//! backup frames, and the local model of call interactions and call
//! records shared by the storage and archive crates.

pub mod error;
pub mod model;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CallvaultError;
pub use model::{
    CallDirection, CallRecord, CallRecordType, CallStatus, ChatThread, GroupCallStatus,
    IndividualCallStatus, IndividualCallType, Interaction, InteractionKind, InteractionKindTag,
    OfferType, ThreadKind,
};
pub use types::{
    AccountId, CallLinkId, DistributionListId, GroupId, Identity, InteractionId,
    LocalIdentifiers, RecipientId,
};
