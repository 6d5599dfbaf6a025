// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for callvault integration tests.
//!
//! Provides a temp-file SQLite fixture with seeding helpers so archive and
//! restore tests can build local state in a few lines.
//!
//! # Components
//!
//! - [`TestStore`] - migrated temp database plus seeding helpers
//! - [`RecordSeed`] - call record defaults for seeding

pub mod store;

pub use store::{RecordSeed, TestStore, TestStoreBuilder};
