// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local (live) model: chat threads, call interactions, and call records.
//!
//! Enum variants that are persisted as text use `strum` for their storage
//! representation. [`IndividualCallType`] is the exception: it must tolerate
//! values written by a newer schema, so it keeps a hand-written mapping with
//! an [`IndividualCallType::Unrecognized`] escape hatch.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::types::{AccountId, GroupId, InteractionId};

/// Discriminant stored in the `threads.kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum ThreadKind {
    Contact,
    Group,
}

/// A conversation owning interactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatThread {
    /// One-to-one thread. Threads created before account ids existed may
    /// have none.
    Contact {
        row_id: i64,
        account_id: Option<AccountId>,
    },
    Group { row_id: i64, group_id: GroupId },
}

impl ChatThread {
    pub fn row_id(&self) -> i64 {
        match self {
            ChatThread::Contact { row_id, .. } | ChatThread::Group { row_id, .. } => *row_id,
        }
    }

    pub fn kind(&self) -> ThreadKind {
        match self {
            ChatThread::Contact { .. } => ThreadKind::Contact,
            ChatThread::Group { .. } => ThreadKind::Group,
        }
    }
}

/// Media offered by a one-to-one call.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum OfferType {
    Audio,
    Video,
}

/// The local classification of a one-to-one call interaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndividualCallType {
    Incoming,
    Outgoing,
    IncomingMissed,
    OutgoingIncomplete,
    IncomingIncomplete,
    IncomingMissedBecauseOfChangedIdentity,
    IncomingDeclined,
    OutgoingMissed,
    IncomingAnsweredElsewhere,
    IncomingDeclinedElsewhere,
    IncomingBusyElsewhere,
    IncomingMissedBecauseOfDoNotDisturb,
    IncomingMissedBecauseBlockedSystemContact,
    /// A stored value this build does not know.
    Unrecognized(String),
}

impl IndividualCallType {
    /// Every known variant, in storage order.
    pub const KNOWN: [IndividualCallType; 13] = [
        IndividualCallType::Incoming,
        IndividualCallType::Outgoing,
        IndividualCallType::IncomingMissed,
        IndividualCallType::OutgoingIncomplete,
        IndividualCallType::IncomingIncomplete,
        IndividualCallType::IncomingMissedBecauseOfChangedIdentity,
        IndividualCallType::IncomingDeclined,
        IndividualCallType::OutgoingMissed,
        IndividualCallType::IncomingAnsweredElsewhere,
        IndividualCallType::IncomingDeclinedElsewhere,
        IndividualCallType::IncomingBusyElsewhere,
        IndividualCallType::IncomingMissedBecauseOfDoNotDisturb,
        IndividualCallType::IncomingMissedBecauseBlockedSystemContact,
    ];

    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &str {
        match self {
            IndividualCallType::Incoming => "incoming",
            IndividualCallType::Outgoing => "outgoing",
            IndividualCallType::IncomingMissed => "incoming_missed",
            IndividualCallType::OutgoingIncomplete => "outgoing_incomplete",
            IndividualCallType::IncomingIncomplete => "incoming_incomplete",
            IndividualCallType::IncomingMissedBecauseOfChangedIdentity => {
                "incoming_missed_because_of_changed_identity"
            }
            IndividualCallType::IncomingDeclined => "incoming_declined",
            IndividualCallType::OutgoingMissed => "outgoing_missed",
            IndividualCallType::IncomingAnsweredElsewhere => "incoming_answered_elsewhere",
            IndividualCallType::IncomingDeclinedElsewhere => "incoming_declined_elsewhere",
            IndividualCallType::IncomingBusyElsewhere => "incoming_busy_elsewhere",
            IndividualCallType::IncomingMissedBecauseOfDoNotDisturb => {
                "incoming_missed_because_of_do_not_disturb"
            }
            IndividualCallType::IncomingMissedBecauseBlockedSystemContact => {
                "incoming_missed_because_blocked_system_contact"
            }
            IndividualCallType::Unrecognized(raw) => raw,
        }
    }

    /// Parse from SQLite string. Never fails: unknown values are kept verbatim.
    pub fn from_str_value(s: &str) -> Self {
        IndividualCallType::KNOWN
            .iter()
            .find(|known| known.as_str() == s)
            .cloned()
            .unwrap_or_else(|| IndividualCallType::Unrecognized(s.to_string()))
    }
}

/// A chat-timeline entry for a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub row_id: InteractionId,
    pub thread_row_id: i64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub kind: InteractionKind,
}

/// Call-specific payload of an [`Interaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionKind {
    IndividualCall {
        call_type: IndividualCallType,
        offer_type: OfferType,
        /// Account of whoever placed the call, if known.
        caller: Option<AccountId>,
    },
    GroupCall {
        /// Account of whoever started the call, if known.
        creator: Option<AccountId>,
        has_ended: bool,
    },
}

impl InteractionKind {
    pub fn tag(&self) -> InteractionKindTag {
        match self {
            InteractionKind::IndividualCall { .. } => InteractionKindTag::IndividualCall,
            InteractionKind::GroupCall { .. } => InteractionKindTag::GroupCall,
        }
    }
}

/// Discriminant stored in the `interactions.kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum InteractionKindTag {
    IndividualCall,
    GroupCall,
}

/// Kind of call tracked by a [`CallRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum CallRecordType {
    AudioCall,
    VideoCall,
    GroupCall,
}

impl From<OfferType> for CallRecordType {
    fn from(offer: OfferType) -> Self {
        match offer {
            OfferType::Audio => CallRecordType::AudioCall,
            OfferType::Video => CallRecordType::VideoCall,
        }
    }
}

/// Local call direction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum CallDirection {
    Incoming,
    Outgoing,
}

/// Status of a one-to-one call record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum IndividualCallStatus {
    Accepted,
    NotAccepted,
    IncomingMissed,
    IncomingMissedNotificationProfile,
}

/// Status of a group call record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum GroupCallStatus {
    Generic,
    Joined,
    Ringing,
    RingingAccepted,
    RingingDeclined,
    RingingMissed,
    RingingMissedNotificationProfile,
}

/// Status of a call record, split by call kind.
///
/// Individual and group status names are disjoint, so a stored status
/// always parses back to the kind it was written as, even when it
/// contradicts the record's [`CallRecordType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallStatus {
    Individual(IndividualCallStatus),
    Group(GroupCallStatus),
    /// A stored status this build does not know, kept verbatim.
    Unrecognized(String),
}

impl CallStatus {
    pub fn as_string(&self) -> String {
        match self {
            CallStatus::Individual(status) => status.to_string(),
            CallStatus::Group(status) => status.to_string(),
            CallStatus::Unrecognized(raw) => raw.clone(),
        }
    }

    /// Parse a known status name.
    pub fn parse(s: &str) -> Option<Self> {
        if let Ok(status) = s.parse::<IndividualCallStatus>() {
            return Some(CallStatus::Individual(status));
        }
        s.parse::<GroupCallStatus>().ok().map(CallStatus::Group)
    }

    /// Parse from SQLite string. Never fails: unknown values are kept verbatim.
    pub fn from_str_value(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| CallStatus::Unrecognized(s.to_string()))
    }
}

/// Durable record of a call's lifecycle, linked to at most one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub call_id: u64,
    pub interaction_row_id: InteractionId,
    pub thread_row_id: i64,
    pub call_type: CallRecordType,
    pub direction: CallDirection,
    pub status: CallStatus,
    /// Who rang the group, for ring-initiated group calls.
    pub group_call_ringer: Option<AccountId>,
    /// Authoritative start time; overrides the interaction timestamp.
    pub call_began_timestamp: u64,
    /// `None` means "not tracked", which is distinct from `Some(0)`.
    pub call_ended_timestamp: Option<u64>,
    pub is_read: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn individual_call_type_storage_round_trip() {
        for call_type in IndividualCallType::KNOWN {
            let stored = call_type.as_str().to_string();
            assert_eq!(IndividualCallType::from_str_value(&stored), call_type);
        }
    }

    #[test]
    fn unknown_individual_call_type_is_kept_verbatim() {
        let parsed = IndividualCallType::from_str_value("incoming_screened");
        assert_eq!(
            parsed,
            IndividualCallType::Unrecognized("incoming_screened".to_string())
        );
        assert_eq!(parsed.as_str(), "incoming_screened");
    }

    #[test]
    fn call_status_names_are_disjoint() {
        for status in IndividualCallStatus::iter() {
            assert_eq!(
                CallStatus::parse(&status.to_string()),
                Some(CallStatus::Individual(status))
            );
        }
        for status in GroupCallStatus::iter() {
            assert_eq!(
                CallStatus::parse(&status.to_string()),
                Some(CallStatus::Group(status))
            );
        }
        assert_eq!(CallStatus::parse("ringing_exploded"), None);
    }

    #[test]
    fn unknown_call_status_is_kept_verbatim() {
        let status = CallStatus::from_str_value("individual:screened");
        assert_eq!(
            status,
            CallStatus::Unrecognized("individual:screened".to_string())
        );
        assert_eq!(status.as_string(), "individual:screened");
        assert_eq!(
            CallStatus::from_str_value("joined"),
            CallStatus::Group(GroupCallStatus::Joined)
        );
    }

    #[test]
    fn thread_row_id_and_kind() {
        let contact = ChatThread::Contact {
            row_id: 3,
            account_id: None,
        };
        let group = ChatThread::Group {
            row_id: 9,
            group_id: GroupId::from("g"),
        };
        assert_eq!(contact.row_id(), 3);
        assert_eq!(group.row_id(), 9);
        assert_eq!(contact.kind(), ThreadKind::Contact);
        assert_eq!(group.kind().to_string(), "group");
    }
}
