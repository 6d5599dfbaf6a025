// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat thread lookup and creation.

use callvault_core::{AccountId, CallvaultError, ChatThread, GroupId, ThreadKind};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::parse_text;

const THREAD_COLUMNS: &str = "row_id, kind, contact_account_id, group_id";

fn thread_from_row(row: &Row<'_>) -> rusqlite::Result<ChatThread> {
    let row_id: i64 = row.get(0)?;
    let kind: String = row.get(1)?;
    match parse_text::<ThreadKind>(1, &kind)? {
        ThreadKind::Contact => Ok(ChatThread::Contact {
            row_id,
            account_id: row.get::<_, Option<String>>(2)?.map(AccountId),
        }),
        ThreadKind::Group => Ok(ChatThread::Group {
            row_id,
            group_id: GroupId(row.get(3)?),
        }),
    }
}

/// Insert a contact thread. `account_id` may be absent for legacy threads.
pub fn insert_contact_thread(
    conn: &Connection,
    account_id: Option<&AccountId>,
) -> Result<ChatThread, CallvaultError> {
    conn.execute(
        "INSERT INTO threads (kind, contact_account_id) VALUES (?1, ?2)",
        params![
            ThreadKind::Contact.to_string(),
            account_id.map(|a| a.0.as_str())
        ],
    )
    .map_err(CallvaultError::storage)?;
    Ok(ChatThread::Contact {
        row_id: conn.last_insert_rowid(),
        account_id: account_id.cloned(),
    })
}

/// Insert a group thread.
pub fn insert_group_thread(
    conn: &Connection,
    group_id: &GroupId,
) -> Result<ChatThread, CallvaultError> {
    conn.execute(
        "INSERT INTO threads (kind, group_id) VALUES (?1, ?2)",
        params![ThreadKind::Group.to_string(), group_id.0],
    )
    .map_err(CallvaultError::storage)?;
    Ok(ChatThread::Group {
        row_id: conn.last_insert_rowid(),
        group_id: group_id.clone(),
    })
}

/// Get a thread by row id.
pub fn get_thread(conn: &Connection, row_id: i64) -> Result<Option<ChatThread>, CallvaultError> {
    conn.query_row(
        &format!("SELECT {THREAD_COLUMNS} FROM threads WHERE row_id = ?1"),
        [row_id],
        thread_from_row,
    )
    .optional()
    .map_err(CallvaultError::storage)
}

pub fn find_contact_thread(
    conn: &Connection,
    account_id: &AccountId,
) -> Result<Option<ChatThread>, CallvaultError> {
    conn.query_row(
        &format!("SELECT {THREAD_COLUMNS} FROM threads WHERE contact_account_id = ?1"),
        [&account_id.0],
        thread_from_row,
    )
    .optional()
    .map_err(CallvaultError::storage)
}

pub fn find_group_thread(
    conn: &Connection,
    group_id: &GroupId,
) -> Result<Option<ChatThread>, CallvaultError> {
    conn.query_row(
        &format!("SELECT {THREAD_COLUMNS} FROM threads WHERE group_id = ?1"),
        [&group_id.0],
        thread_from_row,
    )
    .optional()
    .map_err(CallvaultError::storage)
}

/// Return the contact thread for `account_id`, creating it if needed.
pub fn get_or_create_contact_thread(
    conn: &Connection,
    account_id: &AccountId,
) -> Result<ChatThread, CallvaultError> {
    match find_contact_thread(conn, account_id)? {
        Some(thread) => Ok(thread),
        None => insert_contact_thread(conn, Some(account_id)),
    }
}

/// Return the group thread for `group_id`, creating it if needed.
pub fn get_or_create_group_thread(
    conn: &Connection,
    group_id: &GroupId,
) -> Result<ChatThread, CallvaultError> {
    match find_group_thread(conn, group_id)? {
        Some(thread) => Ok(thread),
        None => insert_group_thread(conn, group_id),
    }
}

/// All threads in row order.
pub fn list_threads(conn: &Connection) -> Result<Vec<ChatThread>, CallvaultError> {
    let mut stmt = conn
        .prepare(&format!("SELECT {THREAD_COLUMNS} FROM threads ORDER BY row_id ASC"))
        .map_err(CallvaultError::storage)?;
    let rows = stmt
        .query_map([], thread_from_row)
        .map_err(CallvaultError::storage)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(CallvaultError::storage)
}
