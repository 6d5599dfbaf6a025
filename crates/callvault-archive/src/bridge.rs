// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The archivers' only path to the local store.
//!
//! `CallRecordBridge` borrows the caller's connection (usually a
//! transaction) for the whole session; it never opens or commits a
//! transaction itself. Item-scoped savepoints nest inside whatever the
//! caller opened.

use callvault_core::{
    AccountId, CallRecord, CallvaultError, ChatThread, GroupId, IndividualCallType, Interaction,
    InteractionId, OfferType,
};
use callvault_storage::queries::{call_records, interactions, threads};
use rusqlite::Connection;

const ITEM_SAVEPOINT: &str = "restore_item";

pub struct CallRecordBridge<'conn> {
    conn: &'conn Connection,
}

impl<'conn> CallRecordBridge<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    /// The 0-or-1 call record linked to an interaction.
    pub fn fetch_call_record(
        &self,
        interaction_row_id: InteractionId,
    ) -> Result<Option<CallRecord>, CallvaultError> {
        call_records::fetch_for_interaction(self.conn, interaction_row_id)
    }

    pub fn list_threads(&self) -> Result<Vec<ChatThread>, CallvaultError> {
        threads::list_threads(self.conn)
    }

    pub fn contact_thread(&self, account_id: &AccountId) -> Result<ChatThread, CallvaultError> {
        threads::get_or_create_contact_thread(self.conn, account_id)
    }

    pub fn group_thread(&self, group_id: &GroupId) -> Result<ChatThread, CallvaultError> {
        threads::get_or_create_group_thread(self.conn, group_id)
    }

    pub fn insert_individual_call(
        &self,
        thread: &ChatThread,
        timestamp: u64,
        call_type: &IndividualCallType,
        offer_type: OfferType,
        caller: Option<&AccountId>,
    ) -> Result<Interaction, CallvaultError> {
        interactions::insert_individual_call(
            self.conn,
            thread.row_id(),
            timestamp,
            call_type,
            offer_type,
            caller,
        )
    }

    pub fn insert_group_call(
        &self,
        thread: &ChatThread,
        timestamp: u64,
        creator: Option<&AccountId>,
        has_ended: bool,
    ) -> Result<Interaction, CallvaultError> {
        interactions::insert_group_call(self.conn, thread.row_id(), timestamp, creator, has_ended)
    }

    pub fn insert_call_record(&self, record: &CallRecord) -> Result<(), CallvaultError> {
        call_records::insert_call_record(self.conn, record)
    }

    pub fn mark_call_record_read(
        &self,
        thread_row_id: i64,
        call_id: u64,
    ) -> Result<(), CallvaultError> {
        if !call_records::mark_read(self.conn, thread_row_id, call_id)? {
            return Err(CallvaultError::Internal(format!(
                "no call record {call_id} in thread {thread_row_id} to mark read"
            )));
        }
        Ok(())
    }

    /// Open the savepoint that scopes one restored item.
    pub fn begin_item(&self) -> Result<(), CallvaultError> {
        self.conn
            .execute_batch(&format!("SAVEPOINT {ITEM_SAVEPOINT}"))
            .map_err(CallvaultError::storage)
    }

    /// Keep the item's writes.
    pub fn commit_item(&self) -> Result<(), CallvaultError> {
        self.conn
            .execute_batch(&format!("RELEASE {ITEM_SAVEPOINT}"))
            .map_err(CallvaultError::storage)
    }

    /// Discard the item's writes.
    pub fn rollback_item(&self) -> Result<(), CallvaultError> {
        self.conn
            .execute_batch(&format!(
                "ROLLBACK TO {ITEM_SAVEPOINT}; RELEASE {ITEM_SAVEPOINT}"
            ))
            .map_err(CallvaultError::storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callvault_storage::Database;

    #[test]
    fn rolled_back_item_leaves_no_rows() {
        let db = Database::open_in_memory().unwrap();
        let bridge = CallRecordBridge::new(db.connection());
        let thread = bridge.group_thread(&GroupId::from("g")).unwrap();

        bridge.begin_item().unwrap();
        bridge.insert_group_call(&thread, 10, None, true).unwrap();
        bridge.rollback_item().unwrap();

        bridge.begin_item().unwrap();
        let kept = bridge.insert_group_call(&thread, 20, None, true).unwrap();
        bridge.commit_item().unwrap();

        let count: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM interactions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(bridge.fetch_call_record(kept.row_id).unwrap(), None);
    }

    #[test]
    fn marking_a_missing_record_read_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let bridge = CallRecordBridge::new(db.connection());
        assert!(bridge.mark_call_record_read(1, 42).is_err());
    }
}
