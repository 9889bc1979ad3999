//! # Pagination Clamp

use serde::Serialize;

use super::input::RawInput;

/// Maximum number of rows a single fetch may return
pub const MAX_LIMIT: i64 = 1000;

/// Default limit if not specified
pub const DEFAULT_LIMIT: i64 = 20;

/// Bounded limit/offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Always within `1..=MAX_LIMIT`
    pub limit: i64,
    /// Always `>= 0`
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Clamp arbitrary values into bounds
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset: offset.max(0),
        }
    }

    /// Read caller `limit`/`start`. Absent or unparseable values take the
    /// defaults; parsed values are clamped.
    pub fn from_raw(limit: &RawInput, start: &RawInput) -> Self {
        Self::new(
            limit.as_integer().unwrap_or(DEFAULT_LIMIT),
            start.as_integer().unwrap_or(0),
        )
    }

    /// `LIMIT n`, with `OFFSET m` only when `m > 0`
    pub fn to_clause(&self) -> String {
        if self.offset > 0 {
            format!("LIMIT {} OFFSET {}", self.limit, self.offset)
        } else {
            format!("LIMIT {}", self.limit)
        }
    }
}
