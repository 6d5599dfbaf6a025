// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call record CRUD operations.
//!
//! A call record is keyed by `(thread_row_id, call_id)` and linked to at most
//! one interaction.

use callvault_core::{
    AccountId, CallDirection, CallRecord, CallRecordType, CallStatus, CallvaultError,
    InteractionId,
};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{call_id_from_sql, call_id_to_sql, parse_text, timestamp_from_sql, timestamp_to_sql};

const RECORD_COLUMNS: &str = "call_id, interaction_row_id, thread_row_id, call_type, direction, \
     status, group_call_ringer, call_began_timestamp, call_ended_timestamp, is_read";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<CallRecord> {
    let call_type: String = row.get(3)?;
    let direction: String = row.get(4)?;
    // Unknown statuses fail the item in the archiver, not the query.
    let status = CallStatus::from_str_value(&row.get::<_, String>(5)?);
    let ended: Option<i64> = row.get(8)?;

    Ok(CallRecord {
        call_id: call_id_from_sql(row.get(0)?),
        interaction_row_id: InteractionId(row.get(1)?),
        thread_row_id: row.get(2)?,
        call_type: parse_text::<CallRecordType>(3, &call_type)?,
        direction: parse_text::<CallDirection>(4, &direction)?,
        status,
        group_call_ringer: row.get::<_, Option<String>>(6)?.map(AccountId),
        call_began_timestamp: timestamp_from_sql(7, row.get(7)?)?,
        call_ended_timestamp: ended.map(|t| timestamp_from_sql(8, t)).transpose()?,
        is_read: row.get(9)?,
    })
}

/// Insert a call record. The end timestamp is stored as `NULL` when absent.
pub fn insert_call_record(conn: &Connection, record: &CallRecord) -> Result<(), CallvaultError> {
    let began = timestamp_to_sql(record.call_began_timestamp).map_err(CallvaultError::storage)?;
    let ended = record
        .call_ended_timestamp
        .map(timestamp_to_sql)
        .transpose()
        .map_err(CallvaultError::storage)?;

    conn.execute(
        "INSERT INTO call_records (call_id, interaction_row_id, thread_row_id, call_type, direction,
                                   status, group_call_ringer, call_began_timestamp,
                                   call_ended_timestamp, is_read)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            call_id_to_sql(record.call_id),
            record.interaction_row_id.0,
            record.thread_row_id,
            record.call_type.to_string(),
            record.direction.to_string(),
            record.status.as_string(),
            record.group_call_ringer.as_ref().map(|a| a.0.as_str()),
            began,
            ended,
            record.is_read,
        ],
    )
    .map_err(CallvaultError::storage)?;
    Ok(())
}

/// The record linked to an interaction, if any.
pub fn fetch_for_interaction(
    conn: &Connection,
    interaction_row_id: InteractionId,
) -> Result<Option<CallRecord>, CallvaultError> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS} FROM call_records WHERE interaction_row_id = ?1"),
        [interaction_row_id.0],
        record_from_row,
    )
    .optional()
    .map_err(CallvaultError::storage)
}

/// Mark a record read. Returns whether a record matched.
pub fn mark_read(
    conn: &Connection,
    thread_row_id: i64,
    call_id: u64,
) -> Result<bool, CallvaultError> {
    let updated = conn
        .execute(
            "UPDATE call_records SET is_read = 1 WHERE thread_row_id = ?1 AND call_id = ?2",
            params![thread_row_id, call_id_to_sql(call_id)],
        )
        .map_err(CallvaultError::storage)?;
    Ok(updated > 0)
}

/// All records in a thread, ordered by start time.
pub fn list_for_thread(
    conn: &Connection,
    thread_row_id: i64,
) -> Result<Vec<CallRecord>, CallvaultError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM call_records WHERE thread_row_id = ?1
             ORDER BY call_began_timestamp ASC"
        ))
        .map_err(CallvaultError::storage)?;
    let rows = stmt
        .query_map([thread_row_id], record_from_row)
        .map_err(CallvaultError::storage)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(CallvaultError::storage)
}
