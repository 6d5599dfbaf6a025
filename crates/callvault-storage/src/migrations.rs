// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema for threads, interactions, and call records, embedded with refinery.
//!
//! `Database::open` applies whatever is pending before handing out the
//! connection.

use callvault_core::CallvaultError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply pending migrations. Already-applied versions are skipped using
/// refinery's `refinery_schema_history` table.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), CallvaultError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(CallvaultError::storage)?;
    for migration in report.applied_migrations() {
        tracing::debug!(
            version = migration.version(),
            name = migration.name(),
            "applied migration"
        );
    }
    Ok(())
}
