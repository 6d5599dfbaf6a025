// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `callvault archive` and `callvault restore` command implementation.
//!
//! Both commands run their session inside one transaction on the configured
//! database. Item errors are logged collapsed and do not fail the command.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use callvault_archive::{
    ArchiveSummary, BackupHeader, FrameReader, FrameWriter, RestoreSummary, archive_session,
    restore_session,
};
use callvault_config::model::CallvaultConfig;
use callvault_core::{AccountId, CallvaultError, LocalIdentifiers};
use callvault_storage::Database;
use tempfile::NamedTempFile;

/// Archive every call item in the configured database to `out`.
pub fn run_archive(config: &CallvaultConfig, out: &Path) -> Result<ArchiveSummary, CallvaultError> {
    let mut db = Database::open(&config.storage)?;
    let local = local_identifiers(config);

    // Frames go to a temp file beside `out`; `out` appears only once the
    // pass has finished.
    let dir = out
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let staged = NamedTempFile::new_in(dir)
        .map_err(|e| stream_io_error("failed to create backup file", e))?;
    let mut writer = FrameWriter::new(BufWriter::new(staged), &BackupHeader::current(now_ms()))?;

    // One read transaction keeps the snapshot consistent across the pass.
    let tx = db
        .connection_mut()
        .transaction()
        .map_err(CallvaultError::storage)?;
    let summary = archive_session(&tx, &local, &mut writer)?;
    tx.commit().map_err(CallvaultError::storage)?;

    let frames_written = writer.frames_written();
    let staged = writer
        .finish()?
        .into_inner()
        .map_err(|e| stream_io_error("failed to flush backup file", e.into_error()))?;
    staged
        .persist(out)
        .map_err(|e| stream_io_error("failed to move backup file into place", e.error))?;
    db.close()?;

    summary.log_errors(config.backup.max_collapsed_ids);
    eprintln!(
        "Archive complete: {} chat items ({} partial, {} dropped), {frames_written} frames written to {}",
        summary.chat_items,
        summary.partial_items,
        summary.failed_items,
        out.display()
    );
    Ok(summary)
}

/// Restore call items from the frame stream at `from` into the configured database.
pub fn run_restore(
    config: &CallvaultConfig,
    from: &Path,
) -> Result<RestoreSummary, CallvaultError> {
    if !from.exists() {
        return Err(CallvaultError::FrameStream {
            message: format!("backup file not found: {}", from.display()),
            source: None,
        });
    }

    let file = File::open(from).map_err(|e| stream_io_error("failed to open backup file", e))?;
    let reader = FrameReader::new(BufReader::new(file))?;
    tracing::info!(
        version = %reader.header().version,
        backup_time_ms = reader.header().backup_time_ms,
        "restoring backup"
    );

    let mut db = Database::open(&config.storage)?;
    let local = local_identifiers(config);

    // A stream error aborts the pass; dropping the transaction rolls it back.
    let tx = db
        .connection_mut()
        .transaction()
        .map_err(CallvaultError::storage)?;
    let summary = restore_session(&tx, reader, &local)?;
    tx.commit().map_err(CallvaultError::storage)?;
    db.close()?;

    summary.log_errors(config.backup.max_collapsed_ids);
    eprintln!(
        "Restore complete: {} chat items ({} partial, {} dropped) restored from {}",
        summary.chat_items,
        summary.partial_items,
        summary.failed_items,
        from.display()
    );
    Ok(summary)
}

fn local_identifiers(config: &CallvaultConfig) -> LocalIdentifiers {
    LocalIdentifiers::new(
        config
            .backup
            .local_account_id
            .as_deref()
            .map(AccountId::from),
    )
}

fn stream_io_error(message: &str, err: std::io::Error) -> CallvaultError {
    CallvaultError::FrameStream {
        message: message.to_string(),
        source: Some(Box::new(err)),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use callvault_config::model::{BackupConfig, StorageConfig};
    use callvault_core::{
        CallDirection, CallStatus, GroupCallStatus, IndividualCallStatus, IndividualCallType,
        OfferType,
    };
    use callvault_test_utils::{RecordSeed, TestStore};

    fn config_for(storage: &StorageConfig) -> CallvaultConfig {
        CallvaultConfig {
            storage: storage.clone(),
            backup: BackupConfig {
                local_account_id: Some("aci-local".to_string()),
                max_collapsed_ids: 10,
            },
            ..CallvaultConfig::default()
        }
    }

    #[test]
    fn archive_then_restore_between_databases() {
        let source = TestStore::new().unwrap();
        let alice = source.contact_thread("aci-alice");
        let group = source.group_thread("group-1");
        let call = source.individual_call(&alice, 1_000, IndividualCallType::Outgoing, OfferType::Audio);
        source.call_record(
            &call,
            RecordSeed::new(
                1,
                CallDirection::Outgoing,
                CallStatus::Individual(IndividualCallStatus::Accepted),
            )
            .read(),
        );
        let group_call = source.group_call(&group, 2_000, Some("aci-alice"));
        source.call_record(
            &group_call,
            RecordSeed::new(
                2,
                CallDirection::Incoming,
                CallStatus::Group(GroupCallStatus::Joined),
            )
            .ended(2_500),
        );

        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("calls.jsonl");
        let archived = run_archive(&config_for(source.config()), &backup).unwrap();
        assert_eq!(archived.chat_items, 2);

        let target = TestStore::new().unwrap();
        let restored = run_restore(&config_for(target.config()), &backup).unwrap();
        assert_eq!(restored.chat_items, 2);
        assert!(restored.errors.is_empty());

        assert_eq!(target.count("interactions"), 2);
        assert_eq!(target.count("call_records"), 2);
        let interactions = target.all_interactions();
        let record = target.record_for(&interactions[1]).unwrap();
        assert_eq!(record.call_ended_timestamp, Some(2_500));
    }

    #[test]
    fn restore_nonexistent_source_fails() {
        let target = TestStore::new().unwrap();
        let result = run_restore(
            &config_for(target.config()),
            Path::new("/tmp/nonexistent-callvault-backup.jsonl"),
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("not found"));
    }

    #[test]
    fn restore_rejects_newer_major_version() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("future.jsonl");
        std::fs::write(&backup, "{\"version\":\"2.0.0\",\"backup_time_ms\":1}\n").unwrap();

        let target = TestStore::new().unwrap();
        let err = run_restore(&config_for(target.config()), &backup).unwrap_err();
        assert!(matches!(err, CallvaultError::UnsupportedVersion { .. }));
        assert_eq!(target.count("threads"), 0);
    }

    #[test]
    fn truncated_stream_rolls_back_the_whole_restore() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("broken.jsonl");
        std::fs::write(
            &backup,
            concat!(
                "{\"version\":\"1.0.0\",\"backup_time_ms\":1}\n",
                "{\"recipient\":{\"id\":2,\"identity\":{\"contact\":\"aci-alice\"}}}\n",
                "{\"chat_item\":",
            ),
        )
        .unwrap();

        let target = TestStore::new().unwrap();
        let err = run_restore(&config_for(target.config()), &backup).unwrap_err();
        assert!(matches!(err, CallvaultError::FrameStream { .. }));
        assert_eq!(target.count("threads"), 0);
    }

    #[test]
    fn failed_archive_leaves_no_backup_file() {
        let source = TestStore::new().unwrap();
        let alice = source.contact_thread("aci-alice");
        source.individual_call(&alice, 1_000, IndividualCallType::Outgoing, OfferType::Audio);
        source
            .connection()
            .execute_batch("DROP TABLE call_records")
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("calls.jsonl");
        let err = run_archive(&config_for(source.config()), &backup).unwrap_err();
        assert!(matches!(err, CallvaultError::Storage { .. }), "{err}");
        assert!(!backup.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn archive_of_empty_database_writes_header_and_local_user() {
        let source = TestStore::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("empty.jsonl");

        let summary = run_archive(&config_for(source.config()), &backup).unwrap();
        assert_eq!(summary.recipient_frames, 1);

        let contents = std::fs::read_to_string(&backup).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.starts_with("{\"version\":\"1.0.0\""));
    }
}
