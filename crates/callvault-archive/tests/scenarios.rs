// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end archive and restore of single call items.

use callvault_archive::{
    ArchivingContext, CallFrame, CallItemArchiver, CallType, ChatItemFrame, Direction,
    FrameOutcome, Frame, GroupCallFrame, GroupCallState, IndividualCallFrame, IndividualCallState,
    InvalidProtoData, RecipientFrame, archive_session, restore_session,
};
use callvault_archive::group_call::GroupCallArchiver;
use callvault_archive::individual_call::IndividualCallArchiver;
use callvault_core::{
    AccountId, CallDirection, CallStatus, GroupCallStatus, GroupId, Identity, IndividualCallStatus,
    IndividualCallType, InteractionKind, OfferType, RecipientId,
};
use callvault_test_utils::{RecordSeed, TestStore};

fn recipient(id: u64, identity: Identity) -> Frame {
    Frame::Recipient(RecipientFrame {
        id: RecipientId(id),
        identity,
    })
}

fn contact(aci: &str) -> Identity {
    Identity::Contact(AccountId::from(aci))
}

fn scenario_a_frame() -> IndividualCallFrame {
    IndividualCallFrame {
        call_id: Some(42),
        call_type: CallType::Audio,
        direction: Direction::Incoming,
        state: IndividualCallState::Accepted,
        started_call_timestamp: 1_700_000_000_000,
        read: true,
    }
}

#[test]
fn scenario_a_incoming_accepted_audio_call_archives() {
    let store = TestStore::new().unwrap();
    let thread = store.contact_thread("aci-alice");
    let call = store.individual_call(
        &thread,
        1_700_000_000_000,
        IndividualCallType::Incoming,
        OfferType::Audio,
    );
    store.call_record(
        &call,
        RecordSeed::new(
            42,
            CallDirection::Incoming,
            CallStatus::Individual(IndividualCallStatus::Accepted),
        )
        .read(),
    );

    let ctx = ArchivingContext::new(store.connection(), store.local().clone());
    let outcome = IndividualCallArchiver.archive(&call, &ctx).unwrap();
    assert_eq!(
        outcome,
        FrameOutcome::Success(CallFrame::Individual(scenario_a_frame()))
    );

    let mut frames = Vec::new();
    let summary = archive_session(store.connection(), store.local(), &mut frames).unwrap();
    assert_eq!(summary.chat_items, 1);
    assert!(summary.errors.is_empty());
    assert_eq!(
        frames,
        vec![
            recipient(1, Identity::LocalUser),
            recipient(2, contact("aci-alice")),
            Frame::ChatItem(ChatItemFrame {
                chat_recipient_id: RecipientId(2),
                date_sent: 1_700_000_000_000,
                call: CallFrame::Individual(scenario_a_frame()),
            }),
        ]
    );
}

#[test]
fn scenario_b_restoring_the_frame_creates_interaction_and_record() {
    let mut store = TestStore::new().unwrap();
    let local = store.local().clone();
    let frames = vec![
        recipient(1, Identity::LocalUser),
        recipient(2, contact("aci-alice")),
        Frame::ChatItem(ChatItemFrame {
            chat_recipient_id: RecipientId(2),
            date_sent: 1_700_000_000_000,
            call: CallFrame::Individual(scenario_a_frame()),
        }),
    ];

    let tx = store.connection_mut().transaction().unwrap();
    let summary = restore_session(&tx, frames.into_iter().map(Ok), &local).unwrap();
    tx.commit().unwrap();

    assert_eq!(summary.chat_items, 1);
    assert!(summary.errors.is_empty(), "{:?}", summary.errors);

    let interactions = store.all_interactions();
    assert_eq!(interactions.len(), 1);
    match &interactions[0].kind {
        InteractionKind::IndividualCall {
            call_type,
            offer_type,
            caller,
        } => {
            assert_eq!(*call_type, IndividualCallType::Incoming);
            assert_eq!(*offer_type, OfferType::Audio);
            assert_eq!(caller.as_ref(), Some(&AccountId::from("aci-alice")));
        }
        other => panic!("expected an individual call, got {other:?}"),
    }

    let record = store.record_for(&interactions[0]).unwrap();
    assert_eq!(record.call_id, 42);
    assert_eq!(
        record.status,
        CallStatus::Individual(IndividualCallStatus::Accepted)
    );
    assert_eq!(record.direction, CallDirection::Incoming);
    assert!(record.is_read);
    assert_eq!(store.count("call_records"), 1);
}

#[test]
fn scenario_c_legacy_group_call_archives_as_generic() {
    let store = TestStore::new().unwrap();
    let thread = store.group_thread("group-1");
    let call = store.group_call(&thread, 1_600_000_000_000, None);

    let ctx = ArchivingContext::new(store.connection(), store.local().clone());
    let outcome = GroupCallArchiver.archive(&call, &ctx).unwrap();
    assert_eq!(
        outcome,
        FrameOutcome::Success(CallFrame::Group(GroupCallFrame {
            call_id: None,
            state: GroupCallState::Generic,
            ringer_recipient_id: None,
            started_call_recipient_id: None,
            started_call_timestamp: 1_600_000_000_000,
            ended_call_timestamp: None,
            read: true,
        }))
    );
}

#[test]
fn scenario_d_unknown_ringer_fails_only_its_frame() {
    let store = TestStore::new().unwrap();
    let group_call = |call_id: u64, ringer: Option<u64>| {
        Frame::ChatItem(ChatItemFrame {
            chat_recipient_id: RecipientId(2),
            date_sent: 1_000 + call_id,
            call: CallFrame::Group(GroupCallFrame {
                call_id: Some(call_id),
                state: GroupCallState::Missed,
                ringer_recipient_id: ringer.map(RecipientId),
                started_call_recipient_id: None,
                started_call_timestamp: 1_000 + call_id,
                ended_call_timestamp: None,
                read: false,
            }),
        })
    };
    let frames = vec![
        recipient(1, Identity::LocalUser),
        recipient(2, Identity::Group(GroupId::from("group-1"))),
        group_call(5, Some(99)),
        group_call(6, None),
    ];

    let summary =
        restore_session(store.connection(), frames.into_iter().map(Ok), store.local()).unwrap();

    assert_eq!(summary.failed_items, 1);
    assert_eq!(summary.chat_items, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(
        summary.errors[0].invalid_proto_data(),
        Some(&InvalidProtoData::RecipientIdNotFound(RecipientId(99)))
    );

    let interactions = store.all_interactions();
    assert_eq!(interactions.len(), 1);
    let record = store.record_for(&interactions[0]).unwrap();
    assert_eq!(record.call_id, 6);
    assert_eq!(record.status, CallStatus::Group(GroupCallStatus::RingingMissed));
}
