//! Movie identifier.

use serde::{Deserialize, Serialize};

/// Identifier of a movie in the catalog.
///
/// Stable across requests; two [`crate::CartItem`]s with the same `MovieId`
/// are the same logical item even when fetched separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(i64);

impl MovieId {
    /// Create a new ID from an i64 value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for MovieId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MovieId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl From<i64> for MovieId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<MovieId> for i64 {
    fn from(id: MovieId) -> Self {
        id.0
    }
}
