// SPDX-FileCopyrightText: 2026 Callvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamp validation shared by both call archivers.
//!
//! Timestamps are unsigned on the wire but the store keeps signed 64-bit
//! integers, so anything above `i64::MAX` cannot survive a round trip.

use thiserror::Error;

/// Largest timestamp the store can hold.
pub const MAX_TIMESTAMP: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timestamp {0} is outside the storable range")]
pub struct InvalidTimestamp(pub u64);

/// Validate a primary (start or sent) timestamp: `0 < t <= i64::MAX`.
pub fn validate_timestamp(timestamp: u64) -> Result<u64, InvalidTimestamp> {
    if timestamp == 0 || timestamp > MAX_TIMESTAMP {
        return Err(InvalidTimestamp(timestamp));
    }
    Ok(timestamp)
}

/// Validate an optional end timestamp. Zero is a legitimate end time, so
/// only the upper bound applies.
pub fn validate_end_timestamp(timestamp: Option<u64>) -> Result<Option<u64>, InvalidTimestamp> {
    match timestamp {
        Some(t) if t > MAX_TIMESTAMP => Err(InvalidTimestamp(t)),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_invalid() {
        assert_eq!(validate_timestamp(0), Err(InvalidTimestamp(0)));
    }

    #[test]
    fn bounds() {
        assert_eq!(validate_timestamp(1), Ok(1));
        assert_eq!(validate_timestamp(MAX_TIMESTAMP), Ok(MAX_TIMESTAMP));
        assert!(validate_timestamp(MAX_TIMESTAMP + 1).is_err());
        assert!(validate_timestamp(u64::MAX).is_err());
    }

    #[test]
    fn end_timestamp_keeps_zero() {
        assert_eq!(validate_end_timestamp(Some(0)), Ok(Some(0)));
        assert_eq!(validate_end_timestamp(None), Ok(None));
        assert!(validate_end_timestamp(Some(u64::MAX)).is_err());
    }
}
