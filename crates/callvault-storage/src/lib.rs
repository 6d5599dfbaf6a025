// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for callvault.
//!
//! Provides a synchronous SQLite store with embedded migrations and typed
//! queries for chat threads, call interactions, and call records. Query
//! functions take a borrowed `rusqlite::Connection` so they run equally
//! against a plain connection or an open transaction.

pub mod database;
pub mod migrations;
pub mod queries;

pub use database::Database;
