// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Codec for group call chat items.
//!
//! The frame has no direction of its own: an accepted ring is `Accepted`
//! when we were rung and `OutgoingRing` when we rang, so restore derives the
//! record direction from the state.

use callvault_core::{
    AccountId, CallDirection, CallRecord, CallRecordType, CallStatus, CallvaultError, ChatThread,
    GroupCallStatus, Interaction, InteractionId, InteractionKind, InteractionKindTag, RecipientId,
};

use crate::archiver::{ArchiveItemResult, CallItemArchiver, RestoreItemResult};
use crate::context::{ArchivingContext, RestoringContext};
use crate::error::{
    ArchiveFrameError, ArchiveFrameErrorKind, InvalidProtoData, ItemErrors, RestoreFrameError,
};
use crate::frame::{CallFrame, ChatItemFrame, GroupCallFrame, GroupCallState};
use crate::timestamp::{validate_end_timestamp, validate_timestamp};

pub struct GroupCallArchiver;

impl CallItemArchiver for GroupCallArchiver {
    fn kind(&self) -> InteractionKindTag {
        InteractionKindTag::GroupCall
    }

    fn archive(
        &self,
        interaction: &Interaction,
        ctx: &ArchivingContext<'_>,
    ) -> Result<ArchiveItemResult, CallvaultError> {
        let InteractionKind::GroupCall { creator, .. } = &interaction.kind else {
            return Err(CallvaultError::Internal(format!(
                "interaction {} routed to the group call archiver",
                interaction.row_id
            )));
        };

        let mut errors = ItemErrors::new();
        let id = interaction.row_id;
        let record = ctx.bridge().fetch_call_record(id)?;

        let started = record
            .as_ref()
            .map_or(interaction.timestamp, |r| r.call_began_timestamp);
        let started = match validate_timestamp(started) {
            Ok(started) => started,
            Err(err) => return Ok(errors.fail(ArchiveFrameError::new(id, err))),
        };

        let frame = match &record {
            // Group calls from before call records existed.
            None => GroupCallFrame {
                call_id: None,
                state: GroupCallState::Generic,
                ringer_recipient_id: None,
                started_call_recipient_id: None,
                started_call_timestamp: started,
                ended_call_timestamp: None,
                read: true,
            },
            Some(record) => {
                let CallStatus::Group(status) = &record.status else {
                    return Ok(errors.fail(ArchiveFrameError::new(
                        id,
                        ArchiveFrameErrorKind::InvalidCallStatus {
                            kind: InteractionKindTag::GroupCall,
                            status: record.status.clone(),
                        },
                    )));
                };
                GroupCallFrame {
                    call_id: Some(record.call_id),
                    state: frame_state(*status, record.direction),
                    ringer_recipient_id: record
                        .group_call_ringer
                        .as_ref()
                        .and_then(|ringer| referenced_id(ringer, id, ctx, &mut errors)),
                    started_call_recipient_id: None,
                    started_call_timestamp: started,
                    ended_call_timestamp: record.call_ended_timestamp,
                    read: record.is_read,
                }
            }
        };
        let frame = GroupCallFrame {
            started_call_recipient_id: creator
                .as_ref()
                .and_then(|creator| referenced_id(creator, id, ctx, &mut errors)),
            ..frame
        };

        tracing::debug!(
            interaction = %id,
            state = %frame.state,
            has_record = record.is_some(),
            "archived group call"
        );
        Ok(errors.finish(CallFrame::Group(frame)))
    }

    fn restore(
        &self,
        item: &ChatItemFrame,
        thread: &ChatThread,
        ctx: &RestoringContext<'_>,
    ) -> RestoreItemResult {
        let mut errors = ItemErrors::new();
        let id = item.frame_id();

        let CallFrame::Group(call) = &item.call else {
            return errors.fail(RestoreFrameError::new(
                id,
                InvalidProtoData::UnexpectedCallKind,
            ));
        };
        if !matches!(thread, ChatThread::Group { .. }) {
            return errors.fail(RestoreFrameError::new(
                id,
                InvalidProtoData::GroupCallNotInGroupThread,
            ));
        }

        let started = validate_timestamp(call.started_call_timestamp);
        let ended = validate_end_timestamp(call.ended_call_timestamp);
        let (started, ended) = match (started, ended) {
            (Ok(started), Ok(ended)) => (started, ended),
            (Err(err), _) | (_, Err(err)) => {
                return errors.fail(RestoreFrameError::new(id, InvalidProtoData::from(err)));
            }
        };

        let ringer = match resolve_account(call.ringer_recipient_id, ctx) {
            Ok(ringer) => ringer,
            Err(reason) => return errors.fail(RestoreFrameError::new(id, reason)),
        };
        let creator = match resolve_account(call.started_call_recipient_id, ctx) {
            Ok(creator) => creator,
            Err(reason) => return errors.fail(RestoreFrameError::new(id, reason)),
        };

        let interaction =
            match ctx
                .bridge()
                .insert_group_call(thread, item.date_sent, creator.as_ref(), true)
            {
                Ok(interaction) => interaction,
                Err(err) => return errors.fail(RestoreFrameError::new(id, err)),
            };

        let Some(call_id) = call.call_id else {
            return errors.finish(());
        };

        let Some((direction, status)) = record_direction_and_status(call.state) else {
            tracing::warn!(frame = %id, "dropping call record with unrecognized group call state");
            errors.push(RestoreFrameError::new(
                id,
                InvalidProtoData::GroupCallUnrecognizedState,
            ));
            return errors.finish(());
        };

        let record = CallRecord {
            call_id,
            interaction_row_id: interaction.row_id,
            thread_row_id: thread.row_id(),
            call_type: CallRecordType::GroupCall,
            direction,
            status: CallStatus::Group(status),
            group_call_ringer: ringer,
            call_began_timestamp: started,
            // Copied only when the frame carries one; zero is a real value.
            call_ended_timestamp: ended,
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

        tracing::debug!(frame = %id, interaction = %interaction.row_id, "restored group call");
        errors.finish(())
    }
}

/// Look up the recipient id of an account referenced from inside an item.
/// A miss drops the reference and is recorded as a partial error.
fn referenced_id(
    account_id: &AccountId,
    id: InteractionId,
    ctx: &ArchivingContext<'_>,
    errors: &mut ItemErrors<ArchiveFrameError>,
) -> Option<RecipientId> {
    match ctx.account_recipient_id(account_id) {
        Ok(recipient_id) => Some(recipient_id),
        Err(missing) => {
            tracing::warn!(interaction = %id, identity = %missing.0, "referenced recipient missing");
            errors.push(ArchiveFrameError::new(
                id,
                ArchiveFrameErrorKind::ReferencedRecipientIdMissing(missing.0),
            ));
            None
        }
    }
}

fn resolve_account(
    recipient_id: Option<RecipientId>,
    ctx: &RestoringContext<'_>,
) -> Result<Option<AccountId>, InvalidProtoData> {
    recipient_id.map(|id| ctx.account_for(id)).transpose()
}

fn frame_state(status: GroupCallStatus, direction: CallDirection) -> GroupCallState {
    match status {
        GroupCallStatus::Generic => GroupCallState::Generic,
        GroupCallStatus::Joined => GroupCallState::Joined,
        GroupCallStatus::Ringing => GroupCallState::Ringing,
        GroupCallStatus::RingingAccepted => match direction {
            CallDirection::Incoming => GroupCallState::Accepted,
            CallDirection::Outgoing => GroupCallState::OutgoingRing,
        },
        GroupCallStatus::RingingDeclined => GroupCallState::Declined,
        GroupCallStatus::RingingMissed => GroupCallState::Missed,
        GroupCallStatus::RingingMissedNotificationProfile => {
            GroupCallState::MissedNotificationProfile
        }
    }
}

/// `None` for the unknown sentinel, which has no record equivalent.
fn record_direction_and_status(state: GroupCallState) -> Option<(CallDirection, GroupCallStatus)> {
    let pair = match state {
        GroupCallState::Unknown => return None,
        GroupCallState::Generic => (CallDirection::Incoming, GroupCallStatus::Generic),
        GroupCallState::Joined => (CallDirection::Incoming, GroupCallStatus::Joined),
        GroupCallState::Ringing => (CallDirection::Incoming, GroupCallStatus::Ringing),
        GroupCallState::Accepted => (CallDirection::Incoming, GroupCallStatus::RingingAccepted),
        GroupCallState::Declined => (CallDirection::Incoming, GroupCallStatus::RingingDeclined),
        GroupCallState::Missed => (CallDirection::Incoming, GroupCallStatus::RingingMissed),
        GroupCallState::MissedNotificationProfile => (
            CallDirection::Incoming,
            GroupCallStatus::RingingMissedNotificationProfile,
        ),
        GroupCallState::OutgoingRing => {
            (CallDirection::Outgoing, GroupCallStatus::RingingAccepted)
        }
    };
    Some(pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn accepted_ring_splits_on_direction() {
        assert_eq!(
            frame_state(GroupCallStatus::RingingAccepted, CallDirection::Incoming),
            GroupCallState::Accepted
        );
        assert_eq!(
            frame_state(GroupCallStatus::RingingAccepted, CallDirection::Outgoing),
            GroupCallState::OutgoingRing
        );
    }

    #[test]
    fn every_concrete_state_restores_and_archives_back() {
        for state in GroupCallState::iter() {
            match record_direction_and_status(state) {
                Some((direction, status)) => {
                    assert_ne!(state, GroupCallState::Unknown);
                    assert_eq!(frame_state(status, direction), state);
                }
                None => assert_eq!(state, GroupCallState::Unknown),
            }
        }
    }

    #[test]
    fn non_ring_states_ignore_direction() {
        for direction in CallDirection::iter() {
            assert_eq!(
                frame_state(GroupCallStatus::Joined, direction),
                GroupCallState::Joined
            );
        }
    }
}
