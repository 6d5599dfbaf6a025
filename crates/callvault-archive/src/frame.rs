// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logical frame schema of the portable backup format.
//!
//! Every enum that crosses the wire has an explicit `Unknown` variant, which
//! is also what an unrecognized value deserializes to. Unknown values are
//! never coerced to a concrete variant; the restore side decides what to do
//! with them.

use callvault_core::{Identity, RecipientId};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// One self-contained record in the frame stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frame {
    Recipient(RecipientFrame),
    ChatItem(ChatItemFrame),
}

/// Binds a session-scoped id to an identity. Precedes every frame that
/// references the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientFrame {
    pub id: RecipientId,
    pub identity: Identity,
}

/// A chat-timeline entry owned by the chat of `chat_recipient_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatItemFrame {
    pub chat_recipient_id: RecipientId,
    pub date_sent: u64,
    pub call: CallFrame,
}

/// Call payload of a chat item, tagged by call kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallFrame {
    Individual(IndividualCallFrame),
    Group(GroupCallFrame),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualCallFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<u64>,
    pub call_type: CallType,
    pub direction: Direction,
    pub state: IndividualCallState,
    pub started_call_timestamp: u64,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCallFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<u64>,
    pub state: GroupCallState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ringer_recipient_id: Option<RecipientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_call_recipient_id: Option<RecipientId>,
    pub started_call_timestamp: u64,
    /// Absent and zero are different values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_call_timestamp: Option<u64>,
    pub read: bool,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CallType {
    Audio,
    Video,
    /// Any value this build does not recognize.
    #[serde(other)]
    Unknown,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    Incoming,
    Outgoing,
    /// Any value this build does not recognize.
    #[serde(other)]
    Unknown,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IndividualCallState {
    Accepted,
    NotAccepted,
    Missed,
    MissedNotificationProfile,
    /// Any value this build does not recognize.
    #[serde(other)]
    Unknown,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GroupCallState {
    Generic,
    Joined,
    Ringing,
    Accepted,
    Declined,
    Missed,
    MissedNotificationProfile,
    OutgoingRing,
    /// Any value this build does not recognize.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_state_decodes_to_unknown() {
        let state: GroupCallState = serde_json::from_str("\"ringing_loudly\"").unwrap();
        assert_eq!(state, GroupCallState::Unknown);
        let direction: Direction = serde_json::from_str("\"sideways\"").unwrap();
        assert_eq!(direction, Direction::Unknown);
        let call_type: CallType = serde_json::from_str("\"hologram\"").unwrap();
        assert_eq!(call_type, CallType::Unknown);
        let state: IndividualCallState = serde_json::from_str("\"screened\"").unwrap();
        assert_eq!(state, IndividualCallState::Unknown);
    }

    #[test]
    fn chat_item_with_unrecognized_values_still_decodes() {
        let json = r#"{
            "chat_recipient_id": 2,
            "date_sent": 10,
            "call": {
                "kind": "individual",
                "call_id": 3,
                "call_type": "hologram",
                "direction": "incoming",
                "state": "screened",
                "started_call_timestamp": 10,
                "read": true
            }
        }"#;
        let item: ChatItemFrame = serde_json::from_str(json).unwrap();
        assert_eq!(item.chat_recipient_id, RecipientId(2));
        match item.call {
            CallFrame::Individual(call) => {
                assert_eq!(call.call_type, CallType::Unknown);
                assert_eq!(call.direction, Direction::Incoming);
                assert_eq!(call.state, IndividualCallState::Unknown);
                assert_eq!(call.call_id, Some(3));
            }
            other => panic!("expected an individual call, got {other:?}"),
        }

        let frame: Frame = serde_json::from_str(
            r#"{"chat_item":{"chat_recipient_id":4,"date_sent":5,"call":{"kind":"group","state":"ringing_loudly","started_call_timestamp":5,"read":false}}}"#,
        )
        .unwrap();
        let Frame::ChatItem(item) = frame else {
            panic!("expected a chat item");
        };
        assert!(matches!(
            item.call,
            CallFrame::Group(GroupCallFrame { state: GroupCallState::Unknown, .. })
        ));
    }

    #[test]
    fn absent_end_timestamp_is_omitted() {
        let frame = GroupCallFrame {
            call_id: None,
            state: GroupCallState::Generic,
            ringer_recipient_id: None,
            started_call_recipient_id: None,
            started_call_timestamp: 10,
            ended_call_timestamp: None,
            read: true,
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert!(!json.contains("ended_call_timestamp"));

        let zero = GroupCallFrame {
            ended_call_timestamp: Some(0),
            ..frame
        };
        let json = serde_json::to_string(&zero).unwrap();
        assert!(json.contains("\"ended_call_timestamp\":0"));
        let back: GroupCallFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ended_call_timestamp, Some(0));
    }

    #[test]
    fn call_frame_is_tagged_by_kind() {
        let call = CallFrame::Individual(IndividualCallFrame {
            call_id: Some(u64::MAX),
            call_type: CallType::Video,
            direction: Direction::Outgoing,
            state: IndividualCallState::Accepted,
            started_call_timestamp: 1,
            read: false,
        });
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value["kind"], "individual");
        assert_eq!(value["call_id"], u64::MAX);
        assert_eq!(serde_json::from_value::<CallFrame>(value).unwrap(), call);
    }
}
