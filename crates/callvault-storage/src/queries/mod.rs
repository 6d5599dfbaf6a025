// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod call_records;
pub mod interactions;
pub mod threads;

use std::str::FromStr;

use rusqlite::types::Type;

/// Timestamps are `u64` in the model but SQLite integers are signed.
pub(crate) fn timestamp_to_sql(value: u64) -> rusqlite::Result<i64> {
    i64::try_from(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub(crate) fn timestamp_from_sql(idx: usize, value: i64) -> rusqlite::Result<u64> {
    u64::try_from(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

/// Call ids use the full `u64` range; they are stored bit-for-bit.
pub(crate) fn call_id_to_sql(call_id: u64) -> i64 {
    call_id as i64
}

pub(crate) fn call_id_from_sql(value: i64) -> u64 {
    value as u64
}

/// Parse a text column through the type's `FromStr` (strum) implementation.
pub(crate) fn parse_text<T>(idx: usize, value: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
