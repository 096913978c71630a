//! Dispatch Sequence Model (Singleton)

use serde::{Deserialize, Serialize};

/// Dispatch sequence counter (one row, id = 1)
///
/// `last_no` is the highest sequence number already allocated; it is
/// monotonically non-decreasing and mutated exclusively by the allocator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DispatchSequence {
    pub id: i64,
    pub last_no: i64,
    pub updated_at: i64,
}

/// A reserved, contiguous block of dispatch numbers
///
/// `start_no ..= end_no` covers the dispatch plus one number per CC
/// recipient; `formatted` is the human-readable dispatch number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub start_no: i64,
    pub end_no: i64,
    pub formatted: String,
}
