// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-database fixture for archive and restore tests.
//!
//! `TestStore` owns a migrated SQLite database in a temp directory that is
//! removed on drop. Seeding helpers panic on failure; they are test-only.

use callvault_config::model::StorageConfig;
use callvault_core::{
    AccountId, CallDirection, CallRecord, CallRecordType, CallStatus, CallvaultError, ChatThread,
    GroupId, IndividualCallType, Interaction, LocalIdentifiers, OfferType,
};
use callvault_storage::Database;
use callvault_storage::queries::{call_records, interactions, threads};
use rusqlite::Connection;
use tempfile::TempDir;

/// Builder for creating test stores with configurable options.
pub struct TestStoreBuilder {
    wal_mode: bool,
    local_account_id: Option<AccountId>,
}

impl TestStoreBuilder {
    fn new() -> Self {
        Self {
            wal_mode: true,
            local_account_id: Some(AccountId::from("aci-local")),
        }
    }

    pub fn with_wal(mut self, enabled: bool) -> Self {
        self.wal_mode = enabled;
        self
    }

    /// Set the local account. `None` simulates a store without one.
    pub fn with_local_account(mut self, account_id: Option<&str>) -> Self {
        self.local_account_id = account_id.map(AccountId::from);
        self
    }

    /// Create the temp directory and open a migrated database inside it.
    pub fn build(self) -> Result<TestStore, CallvaultError> {
        let temp_dir = TempDir::new().map_err(CallvaultError::storage)?;
        let config = StorageConfig {
            database_path: temp_dir.path().join("test.db").display().to_string(),
            wal_mode: self.wal_mode,
        };
        let db = Database::open(&config)?;
        tracing::debug!(path = %config.database_path, "test store ready");
        Ok(TestStore {
            db,
            config,
            local: LocalIdentifiers::new(self.local_account_id),
            _temp_dir: temp_dir,
        })
    }
}

/// A migrated temp database with seeding helpers.
pub struct TestStore {
    db: Database,
    config: StorageConfig,
    local: LocalIdentifiers,
    // Dropped last: removes the database file.
    _temp_dir: TempDir,
}

/// Call record fields a test usually wants to vary; the rest are derived
/// from the interaction being seeded.
#[derive(Debug, Clone)]
pub struct RecordSeed {
    pub call_id: u64,
    pub direction: CallDirection,
    pub status: CallStatus,
    pub group_call_ringer: Option<AccountId>,
    pub call_began_timestamp: Option<u64>,
    pub call_ended_timestamp: Option<u64>,
    pub is_read: bool,
}

impl RecordSeed {
    pub fn new(call_id: u64, direction: CallDirection, status: CallStatus) -> Self {
        Self {
            call_id,
            direction,
            status,
            group_call_ringer: None,
            call_began_timestamp: None,
            call_ended_timestamp: None,
            is_read: false,
        }
    }

    pub fn read(mut self) -> Self {
        self.is_read = true;
        self
    }

    pub fn ringer(mut self, account_id: &str) -> Self {
        self.group_call_ringer = Some(AccountId::from(account_id));
        self
    }

    pub fn began(mut self, timestamp: u64) -> Self {
        self.call_began_timestamp = Some(timestamp);
        self
    }

    pub fn ended(mut self, timestamp: u64) -> Self {
        self.call_ended_timestamp = Some(timestamp);
        self
    }
}

impl TestStore {
    pub fn builder() -> TestStoreBuilder {
        TestStoreBuilder::new()
    }

    /// A store with default options.
    pub fn new() -> Result<Self, CallvaultError> {
        Self::builder().build()
    }

    pub fn connection(&self) -> &Connection {
        self.db.connection()
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        self.db.connection_mut()
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn local(&self) -> &LocalIdentifiers {
        &self.local
    }

    pub fn contact_thread(&self, account_id: &str) -> ChatThread {
        threads::get_or_create_contact_thread(self.connection(), &AccountId::from(account_id))
            .expect("seed contact thread")
    }

    /// A contact thread from before account ids existed.
    pub fn legacy_contact_thread(&self) -> ChatThread {
        threads::insert_contact_thread(self.connection(), None).expect("seed legacy thread")
    }

    pub fn group_thread(&self, group_id: &str) -> ChatThread {
        threads::get_or_create_group_thread(self.connection(), &GroupId::from(group_id))
            .expect("seed group thread")
    }

    pub fn individual_call(
        &self,
        thread: &ChatThread,
        timestamp: u64,
        call_type: IndividualCallType,
        offer_type: OfferType,
    ) -> Interaction {
        let caller = match (&call_type, thread) {
            (IndividualCallType::Outgoing, _)
            | (IndividualCallType::OutgoingIncomplete, _)
            | (IndividualCallType::OutgoingMissed, _) => self.local.account_id.clone(),
            (_, ChatThread::Contact { account_id, .. }) => account_id.clone(),
            (_, ChatThread::Group { .. }) => None,
        };
        interactions::insert_individual_call(
            self.connection(),
            thread.row_id(),
            timestamp,
            &call_type,
            offer_type,
            caller.as_ref(),
        )
        .expect("seed individual call")
    }

    pub fn group_call(
        &self,
        thread: &ChatThread,
        timestamp: u64,
        creator: Option<&str>,
    ) -> Interaction {
        interactions::insert_group_call(
            self.connection(),
            thread.row_id(),
            timestamp,
            creator.map(AccountId::from).as_ref(),
            true,
        )
        .expect("seed group call")
    }

    /// Attach a call record to `interaction`. The record type follows the
    /// interaction kind; the start time defaults to the interaction's.
    pub fn call_record(&self, interaction: &Interaction, seed: RecordSeed) -> CallRecord {
        let call_type = match &interaction.kind {
            callvault_core::InteractionKind::IndividualCall { offer_type, .. } => {
                CallRecordType::from(*offer_type)
            }
            callvault_core::InteractionKind::GroupCall { .. } => CallRecordType::GroupCall,
        };
        let record = CallRecord {
            call_id: seed.call_id,
            interaction_row_id: interaction.row_id,
            thread_row_id: interaction.thread_row_id,
            call_type,
            direction: seed.direction,
            status: seed.status,
            group_call_ringer: seed.group_call_ringer,
            call_began_timestamp: seed.call_began_timestamp.unwrap_or(interaction.timestamp),
            call_ended_timestamp: seed.call_ended_timestamp,
            is_read: seed.is_read,
        };
        call_records::insert_call_record(self.connection(), &record).expect("seed call record");
        record
    }

    pub fn record_for(&self, interaction: &Interaction) -> Option<CallRecord> {
        call_records::fetch_for_interaction(self.connection(), interaction.row_id)
            .expect("fetch call record")
    }

    /// Every call interaction in row order.
    pub fn all_interactions(&self) -> Vec<Interaction> {
        let mut all = Vec::new();
        interactions::for_each_call_interaction(self.connection(), |interaction| {
            all.push(interaction);
            Ok(())
        })
        .expect("list interactions");
        all
    }

    pub fn count(&self, table: &str) -> i64 {
        self.connection()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .expect("count rows")
    }
}
