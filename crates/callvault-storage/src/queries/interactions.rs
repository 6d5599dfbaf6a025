// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call interaction CRUD operations.

use callvault_core::{
    AccountId, CallvaultError, IndividualCallType, Interaction, InteractionId, InteractionKind,
    InteractionKindTag, OfferType,
};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{parse_text, timestamp_from_sql, timestamp_to_sql};

const INTERACTION_COLUMNS: &str = "row_id, thread_row_id, timestamp, kind, call_type, \
     offer_type, caller_account_id, creator_account_id, has_ended";

fn interaction_from_row(row: &Row<'_>) -> rusqlite::Result<Interaction> {
    let kind: String = row.get(3)?;
    let kind = match parse_text::<InteractionKindTag>(3, &kind)? {
        InteractionKindTag::IndividualCall => {
            let call_type: String = row.get(4)?;
            let offer_type: String = row.get(5)?;
            InteractionKind::IndividualCall {
                call_type: IndividualCallType::from_str_value(&call_type),
                offer_type: parse_text::<OfferType>(5, &offer_type)?,
                caller: row.get::<_, Option<String>>(6)?.map(AccountId),
            }
        }
        InteractionKindTag::GroupCall => InteractionKind::GroupCall {
            creator: row.get::<_, Option<String>>(7)?.map(AccountId),
            has_ended: row.get(8)?,
        },
    };

    Ok(Interaction {
        row_id: InteractionId(row.get(0)?),
        thread_row_id: row.get(1)?,
        timestamp: timestamp_from_sql(2, row.get(2)?)?,
        kind,
    })
}

/// Insert a one-to-one call interaction into `thread_row_id`.
pub fn insert_individual_call(
    conn: &Connection,
    thread_row_id: i64,
    timestamp: u64,
    call_type: &IndividualCallType,
    offer_type: OfferType,
    caller: Option<&AccountId>,
) -> Result<Interaction, CallvaultError> {
    let stored_timestamp = timestamp_to_sql(timestamp).map_err(CallvaultError::storage)?;
    conn.execute(
        "INSERT INTO interactions (thread_row_id, timestamp, kind, call_type, offer_type, caller_account_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            thread_row_id,
            stored_timestamp,
            InteractionKindTag::IndividualCall.to_string(),
            call_type.as_str(),
            offer_type.to_string(),
            caller.map(|a| a.0.as_str()),
        ],
    )
    .map_err(CallvaultError::storage)?;

    Ok(Interaction {
        row_id: InteractionId(conn.last_insert_rowid()),
        thread_row_id,
        timestamp,
        kind: InteractionKind::IndividualCall {
            call_type: call_type.clone(),
            offer_type,
            caller: caller.cloned(),
        },
    })
}

/// Insert a group call interaction into `thread_row_id`.
pub fn insert_group_call(
    conn: &Connection,
    thread_row_id: i64,
    timestamp: u64,
    creator: Option<&AccountId>,
    has_ended: bool,
) -> Result<Interaction, CallvaultError> {
    let stored_timestamp = timestamp_to_sql(timestamp).map_err(CallvaultError::storage)?;
    conn.execute(
        "INSERT INTO interactions (thread_row_id, timestamp, kind, creator_account_id, has_ended)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            thread_row_id,
            stored_timestamp,
            InteractionKindTag::GroupCall.to_string(),
            creator.map(|a| a.0.as_str()),
            has_ended,
        ],
    )
    .map_err(CallvaultError::storage)?;

    Ok(Interaction {
        row_id: InteractionId(conn.last_insert_rowid()),
        thread_row_id,
        timestamp,
        kind: InteractionKind::GroupCall {
            creator: creator.cloned(),
            has_ended,
        },
    })
}

/// Get an interaction by row id.
pub fn get_interaction(
    conn: &Connection,
    row_id: InteractionId,
) -> Result<Option<Interaction>, CallvaultError> {
    conn.query_row(
        &format!("SELECT {INTERACTION_COLUMNS} FROM interactions WHERE row_id = ?1"),
        [row_id.0],
        interaction_from_row,
    )
    .optional()
    .map_err(CallvaultError::storage)
}

/// Visit every call interaction in row order.
///
/// Rows are streamed; the visitor's error stops the scan and is returned.
pub fn for_each_call_interaction<F>(conn: &Connection, mut visit: F) -> Result<(), CallvaultError>
where
    F: FnMut(Interaction) -> Result<(), CallvaultError>,
{
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {INTERACTION_COLUMNS} FROM interactions ORDER BY row_id ASC"
        ))
        .map_err(CallvaultError::storage)?;
    let rows = stmt
        .query_map([], interaction_from_row)
        .map_err(CallvaultError::storage)?;
    for row in rows {
        visit(row.map_err(CallvaultError::storage)?)?;
    }
    Ok(())
}

/// Number of interactions in a thread.
pub fn count_for_thread(conn: &Connection, thread_row_id: i64) -> Result<i64, CallvaultError> {
    conn.query_row(
        "SELECT COUNT(*) FROM interactions WHERE thread_row_id = ?1",
        [thread_row_id],
        |row| row.get(0),
    )
    .map_err(CallvaultError::storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::queries::threads;
    use callvault_core::GroupId;

    #[test]
    fn individual_call_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let aci = AccountId::from("aci-alice");
        let thread = threads::insert_contact_thread(conn, Some(&aci)).unwrap();

        let inserted = insert_individual_call(
            conn,
            thread.row_id(),
            1_700_000_000_000,
            &IndividualCallType::IncomingMissedBecauseOfDoNotDisturb,
            OfferType::Video,
            Some(&aci),
        )
        .unwrap();

        let fetched = get_interaction(conn, inserted.row_id).unwrap().unwrap();
        assert_eq!(fetched, inserted);
    }

    #[test]
    fn unrecognized_call_type_is_read_back_verbatim() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let thread = threads::insert_contact_thread(conn, None).unwrap();
        let inserted = insert_individual_call(
            conn,
            thread.row_id(),
            5,
            &IndividualCallType::Unrecognized("incoming_screened".into()),
            OfferType::Audio,
            None,
        )
        .unwrap();

        match get_interaction(conn, inserted.row_id).unwrap().unwrap().kind {
            InteractionKind::IndividualCall { call_type, .. } => assert_eq!(
                call_type,
                IndividualCallType::Unrecognized("incoming_screened".into())
            ),
            other => panic!("expected individual call, got {other:?}"),
        }
    }

    #[test]
    fn group_calls_are_visited_in_row_order() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let thread = threads::insert_group_thread(conn, &GroupId::from("g")).unwrap();
        let first = insert_group_call(conn, thread.row_id(), 30, None, false).unwrap();
        let second =
            insert_group_call(conn, thread.row_id(), 10, Some(&AccountId::from("aci")), true)
                .unwrap();

        let mut seen = Vec::new();
        for_each_call_interaction(conn, |interaction| {
            seen.push(interaction);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![first, second]);
        assert_eq!(count_for_thread(conn, thread.row_id()).unwrap(), 2);
    }

    #[test]
    fn timestamp_out_of_signed_range_is_a_storage_error() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let thread = threads::insert_group_thread(conn, &GroupId::from("g")).unwrap();
        let err = insert_group_call(conn, thread.row_id(), u64::MAX, None, true).unwrap_err();
        assert!(matches!(err, CallvaultError::Storage { .. }));
    }
}
