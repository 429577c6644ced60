//! Per-movie cart membership status.

use serde::{Deserialize, Serialize};

/// Whether a movie is in the cart, as known to one surface.
///
/// Starts [`Unknown`](Self::Unknown) when a surface mounts, is resolved by a
/// status check, and flips to [`Present`](Self::Present) right after a
/// successful add without another round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Not yet checked.
    #[default]
    Unknown,
    /// Checked, not in the cart.
    Absent,
    /// In the cart.
    Present,
}

impl MembershipStatus {
    /// Map the backend's "is in cart" boolean to a resolved status.
    #[must_use]
    pub const fn from_present(present: bool) -> Self {
        if present { Self::Present } else { Self::Absent }
    }

    /// Whether the status has been resolved by a check or an add.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Whether the movie is known to be in the cart.
    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::Present)
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Absent => write!(f, "absent"),
            Self::Present => write!(f, "present"),
        }
    }
}
