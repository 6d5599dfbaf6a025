// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Codec for one-to-one call chat items.
//!
//! The local store classifies a call by a single call type; the frame
//! splits it into a direction and a state. Both tables below are exhaustive
//! matches so that adding a variant on either side fails to compile until
//! it is mapped.

use callvault_core::{
    CallDirection, CallRecord, CallStatus, CallvaultError, ChatThread, IndividualCallStatus,
    IndividualCallType, Interaction, InteractionKind, InteractionKindTag, OfferType,
};

use crate::archiver::{ArchiveItemResult, CallItemArchiver, RestoreItemResult};
use crate::context::{ArchivingContext, RestoringContext};
use crate::error::{
    ArchiveFrameError, ArchiveFrameErrorKind, InvalidProtoData, ItemErrors, RestoreFrameError,
};
use crate::frame::{
    CallFrame, CallType, ChatItemFrame, Direction, IndividualCallFrame, IndividualCallState,
};
use crate::timestamp::validate_timestamp;

/// Local call type written when the frame carries an unknown sentinel.
const UNKNOWN_CALL_TYPE: &str = "unknown";

pub struct IndividualCallArchiver;

impl CallItemArchiver for IndividualCallArchiver {
    fn kind(&self) -> InteractionKindTag {
        InteractionKindTag::IndividualCall
    }

    fn archive(
        &self,
        interaction: &Interaction,
        ctx: &ArchivingContext<'_>,
    ) -> Result<ArchiveItemResult, CallvaultError> {
        let InteractionKind::IndividualCall {
            call_type,
            offer_type,
            ..
        } = &interaction.kind
        else {
            return Err(CallvaultError::Internal(format!(
                "interaction {} routed to the individual call archiver",
                interaction.row_id
            )));
        };

        let errors = ItemErrors::new();
        let id = interaction.row_id;
        let record = ctx.bridge().fetch_call_record(id)?;

        let started = record
            .as_ref()
            .map_or(interaction.timestamp, |r| r.call_began_timestamp);
        let started = match validate_timestamp(started) {
            Ok(started) => started,
            Err(err) => return Ok(errors.fail(ArchiveFrameError::new(id, err))),
        };

        let (call_id, read) = match &record {
            Some(record) => {
                if !matches!(record.status, CallStatus::Individual(_)) {
                    return Ok(errors.fail(ArchiveFrameError::new(
                        id,
                        ArchiveFrameErrorKind::InvalidCallStatus {
                            kind: InteractionKindTag::IndividualCall,
                            status: record.status.clone(),
                        },
                    )));
                }
                (Some(record.call_id), record.is_read)
            }
            // Calls from before call records existed count as read.
            None => (None, true),
        };

        let frame = IndividualCallFrame {
            call_id,
            call_type: frame_call_type(*offer_type),
            direction: frame_direction(call_type),
            state: frame_state(call_type),
            started_call_timestamp: started,
            read,
        };
        tracing::debug!(
            interaction = %id,
            direction = %frame.direction,
            state = %frame.state,
            has_record = record.is_some(),
            "archived individual call"
        );
        Ok(errors.finish(CallFrame::Individual(frame)))
    }

    fn restore(
        &self,
        item: &ChatItemFrame,
        thread: &ChatThread,
        ctx: &RestoringContext<'_>,
    ) -> RestoreItemResult {
        let mut errors = ItemErrors::new();
        let id = item.frame_id();

        let CallFrame::Individual(call) = &item.call else {
            return errors.fail(RestoreFrameError::new(
                id,
                InvalidProtoData::UnexpectedCallKind,
            ));
        };
        let ChatThread::Contact { account_id, .. } = thread else {
            return errors.fail(RestoreFrameError::new(
                id,
                InvalidProtoData::IndividualCallNotInContactThread,
            ));
        };
        let offer_type = match call.call_type {
            CallType::Audio => OfferType::Audio,
            CallType::Video => OfferType::Video,
            CallType::Unknown => {
                return errors.fail(RestoreFrameError::new(
                    id,
                    InvalidProtoData::IndividualCallUnrecognizedType,
                ));
            }
        };
        let started = match validate_timestamp(call.started_call_timestamp) {
            Ok(started) => started,
            Err(err) => {
                return errors.fail(RestoreFrameError::new(id, InvalidProtoData::from(err)));
            }
        };

        let call_type = local_call_type(call.direction, call.state);
        let caller = match call.direction {
            Direction::Outgoing => ctx.local().account_id.as_ref(),
            Direction::Incoming => account_id.as_ref(),
            Direction::Unknown => None,
        };

        let interaction = match ctx.bridge().insert_individual_call(
            thread,
            item.date_sent,
            &call_type,
            offer_type,
            caller,
        ) {
            Ok(interaction) => interaction,
            Err(err) => return errors.fail(RestoreFrameError::new(id, err)),
        };

        let Some(call_id) = call.call_id else {
            return errors.finish(());
        };

        let (direction, status) = match record_direction_and_status(call.direction, call.state) {
            Ok(pair) => pair,
            Err(reason) => {
                tracing::warn!(frame = %id, %reason, "dropping call record");
                errors.push(RestoreFrameError::new(id, reason));
                return errors.finish(());
            }
        };

        let record = CallRecord {
            call_id,
            interaction_row_id: interaction.row_id,
            thread_row_id: thread.row_id(),
            call_type: offer_type.into(),
            direction,
            status: CallStatus::Individual(status),
            group_call_ringer: None,
            call_began_timestamp: started,
            call_ended_timestamp: None,
            is_read: false,
        };
        if let Err(err) = ctx.bridge().insert_call_record(&record) {
            return errors.fail(RestoreFrameError::new(id, err));
        }
        if call.read {
            if let Err(err) = ctx
                .bridge()
                .mark_call_record_read(record.thread_row_id, call_id)
            {
                return errors.fail(RestoreFrameError::new(id, err));
            }
        }

        tracing::debug!(frame = %id, interaction = %interaction.row_id, "restored individual call");
        errors.finish(())
    }
}

fn frame_call_type(offer_type: OfferType) -> CallType {
    match offer_type {
        OfferType::Audio => CallType::Audio,
        OfferType::Video => CallType::Video,
    }
}

fn frame_direction(call_type: &IndividualCallType) -> Direction {
    match call_type {
        IndividualCallType::Incoming
        | IndividualCallType::IncomingMissed
        | IndividualCallType::IncomingIncomplete
        | IndividualCallType::IncomingMissedBecauseOfChangedIdentity
        | IndividualCallType::IncomingDeclined
        | IndividualCallType::IncomingAnsweredElsewhere
        | IndividualCallType::IncomingDeclinedElsewhere
        | IndividualCallType::IncomingBusyElsewhere
        | IndividualCallType::IncomingMissedBecauseOfDoNotDisturb
        | IndividualCallType::IncomingMissedBecauseBlockedSystemContact => Direction::Incoming,
        IndividualCallType::Outgoing
        | IndividualCallType::OutgoingIncomplete
        | IndividualCallType::OutgoingMissed => Direction::Outgoing,
        IndividualCallType::Unrecognized(_) => Direction::Unknown,
    }
}

fn frame_state(call_type: &IndividualCallType) -> IndividualCallState {
    match call_type {
        IndividualCallType::Incoming | IndividualCallType::IncomingAnsweredElsewhere => {
            IndividualCallState::Accepted
        }
        IndividualCallType::IncomingIncomplete
        | IndividualCallType::IncomingMissed
        | IndividualCallType::IncomingMissedBecauseOfChangedIdentity
        | IndividualCallType::IncomingBusyElsewhere
        | IndividualCallType::IncomingMissedBecauseBlockedSystemContact => {
            IndividualCallState::Missed
        }
        IndividualCallType::IncomingMissedBecauseOfDoNotDisturb => {
            IndividualCallState::MissedNotificationProfile
        }
        IndividualCallType::IncomingDeclined | IndividualCallType::IncomingDeclinedElsewhere => {
            IndividualCallState::NotAccepted
        }
        IndividualCallType::Outgoing => IndividualCallState::Accepted,
        IndividualCallType::OutgoingIncomplete | IndividualCallType::OutgoingMissed => {
            IndividualCallState::NotAccepted
        }
        IndividualCallType::Unrecognized(_) => IndividualCallState::Unknown,
    }
}

/// Every (direction, state) pair yields a local call type.
fn local_call_type(direction: Direction, state: IndividualCallState) -> IndividualCallType {
    match (direction, state) {
        (Direction::Incoming, IndividualCallState::Accepted) => IndividualCallType::Incoming,
        (Direction::Incoming, IndividualCallState::NotAccepted) => {
            IndividualCallType::IncomingDeclined
        }
        (Direction::Incoming, IndividualCallState::Missed) => IndividualCallType::IncomingMissed,
        (Direction::Incoming, IndividualCallState::MissedNotificationProfile) => {
            IndividualCallType::IncomingMissedBecauseOfDoNotDisturb
        }
        (Direction::Outgoing, IndividualCallState::Accepted) => IndividualCallType::Outgoing,
        (
            Direction::Outgoing,
            IndividualCallState::NotAccepted
            | IndividualCallState::Missed
            | IndividualCallState::MissedNotificationProfile,
        ) => IndividualCallType::OutgoingMissed,
        (Direction::Unknown, _) | (_, IndividualCallState::Unknown) => {
            IndividualCallType::Unrecognized(UNKNOWN_CALL_TYPE.to_string())
        }
    }
}

/// The call record direction and status for a frame, if both are concrete.
fn record_direction_and_status(
    direction: Direction,
    state: IndividualCallState,
) -> Result<(CallDirection, IndividualCallStatus), InvalidProtoData> {
    let direction = match direction {
        Direction::Incoming => CallDirection::Incoming,
        Direction::Outgoing => CallDirection::Outgoing,
        Direction::Unknown => return Err(InvalidProtoData::IndividualCallUnrecognizedDirection),
    };
    let status = match (direction, state) {
        (_, IndividualCallState::Unknown) => {
            return Err(InvalidProtoData::IndividualCallUnrecognizedState);
        }
        (_, IndividualCallState::Accepted) => IndividualCallStatus::Accepted,
        (_, IndividualCallState::NotAccepted) => IndividualCallStatus::NotAccepted,
        (CallDirection::Incoming, IndividualCallState::Missed) => {
            IndividualCallStatus::IncomingMissed
        }
        (CallDirection::Incoming, IndividualCallState::MissedNotificationProfile) => {
            IndividualCallStatus::IncomingMissedNotificationProfile
        }
        (
            CallDirection::Outgoing,
            IndividualCallState::Missed | IndividualCallState::MissedNotificationProfile,
        ) => IndividualCallStatus::NotAccepted,
    };
    Ok((direction, status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_known_call_type_has_a_concrete_direction_and_state() {
        for call_type in IndividualCallType::KNOWN {
            assert_ne!(frame_direction(&call_type), Direction::Unknown, "{call_type:?}");
            assert_ne!(frame_state(&call_type), IndividualCallState::Unknown, "{call_type:?}");
        }
    }

    #[test]
    fn unrecognized_call_type_archives_to_sentinels() {
        let call_type = IndividualCallType::Unrecognized("incoming_screened".into());
        assert_eq!(frame_direction(&call_type), Direction::Unknown);
        assert_eq!(frame_state(&call_type), IndividualCallState::Unknown);
    }

    #[test]
    fn every_pair_restores_to_a_call_type() {
        for direction in Direction::iter() {
            for state in IndividualCallState::iter() {
                let call_type = local_call_type(direction, state);
                let has_sentinel =
                    direction == Direction::Unknown || state == IndividualCallState::Unknown;
                assert_eq!(
                    matches!(call_type, IndividualCallType::Unrecognized(_)),
                    has_sentinel,
                    "({direction}, {state})"
                );
            }
        }
    }

    #[test]
    fn archived_pairs_restore_to_an_equivalent_call_type() {
        for call_type in IndividualCallType::KNOWN {
            let direction = frame_direction(&call_type);
            let state = frame_state(&call_type);
            let restored = local_call_type(direction, state);
            assert_eq!(frame_direction(&restored), direction);
            assert_eq!(frame_state(&restored), state);
        }
    }

    #[test]
    fn record_status_table() {
        use IndividualCallState as S;
        let cases = [
            (Direction::Incoming, S::Accepted, IndividualCallStatus::Accepted),
            (Direction::Incoming, S::NotAccepted, IndividualCallStatus::NotAccepted),
            (Direction::Incoming, S::Missed, IndividualCallStatus::IncomingMissed),
            (
                Direction::Incoming,
                S::MissedNotificationProfile,
                IndividualCallStatus::IncomingMissedNotificationProfile,
            ),
            (Direction::Outgoing, S::Accepted, IndividualCallStatus::Accepted),
            (Direction::Outgoing, S::NotAccepted, IndividualCallStatus::NotAccepted),
            (Direction::Outgoing, S::Missed, IndividualCallStatus::NotAccepted),
            (
                Direction::Outgoing,
                S::MissedNotificationProfile,
                IndividualCallStatus::NotAccepted,
            ),
        ];
        for (direction, state, status) in cases {
            let (_, got) = record_direction_and_status(direction, state).unwrap();
            assert_eq!(got, status, "({direction}, {state})");
        }
        assert_eq!(
            record_direction_and_status(Direction::Unknown, S::Accepted),
            Err(InvalidProtoData::IndividualCallUnrecognizedDirection)
        );
        assert_eq!(
            record_direction_and_status(Direction::Outgoing, S::Unknown),
            Err(InvalidProtoData::IndividualCallUnrecognizedState)
        );
    }
}
