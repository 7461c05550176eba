//! Shared types for the nearest-block search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Block ────────────────────────────────────────────────────────────────────

/// A minimal view of a block — enough to place it on the chain's timeline.
///
/// Immutable once fetched: for a given height, a node always reports the same
/// timestamp, which is what makes per-height memoization sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block height. Heights are a dense sequence starting at 1 (genesis).
    pub height: u64,
    /// Block timestamp. Non-decreasing as height increases (assumed, not
    /// verified).
    pub time: DateTime<Utc>,
}

impl Block {
    /// Create a block from a height and a Unix timestamp in milliseconds.
    pub fn from_timestamp_millis(height: u64, millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(|time| Self { height, time })
    }

    /// Milliseconds between this block's timestamp and `date`
    /// (positive when `date` is later).
    pub fn millis_until(&self, date: DateTime<Utc>) -> i64 {
        (date - self.time).num_milliseconds()
    }
}

// ─── Bound ────────────────────────────────────────────────────────────────────

/// Which side of the target date the returned block must sit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bound {
    /// The earliest block whose timestamp is `≥` the target date.
    AtOrAfter,
    /// The latest block whose timestamp is `<` the target date.
    Before,
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AtOrAfter => write!(f, "at-or-after"),
            Self::Before => write!(f, "before"),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
