//! Lifecycle of one (report date, metric) pair.

use salou_traits::{Result, SalouError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing stage of a (report date, metric) pair.
///
/// ```text
/// Scheduled -> Grouped -> Aggregated -> Summarized -> Persisted
///                 \
///                  -> Skipped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairState {
    /// Window derived, nothing computed yet.
    Scheduled,
    /// Grouping attempted.
    Grouped,
    /// Price lookups finished, possibly with exclusions.
    Aggregated,
    /// Group means computed.
    Summarized,
    /// Result table handed to the sink.
    Persisted,
    /// Too few securities to group.
    Skipped,
}

impl PairState {
    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Scheduled, Self::Grouped)
                | (Self::Grouped, Self::Aggregated)
                | (Self::Grouped, Self::Skipped)
                | (Self::Aggregated, Self::Summarized)
                | (Self::Summarized, Self::Persisted)
        )
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`SalouError::Other`] for an illegal transition.
    pub fn advance(self, next: Self) -> Result<Self> {
        if self.can_advance_to(next) {
            Ok(next)
        } else {
            Err(SalouError::Other(format!(
                "illegal pair transition {self} -> {next}"
            )))
        }
    }

    /// No further transitions possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Persisted | Self::Skipped)
    }
}

impl fmt::Display for PairState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Scheduled => "scheduled",
            Self::Grouped => "grouped",
            Self::Aggregated => "aggregated",
            Self::Summarized => "summarized",
            Self::Persisted => "persisted",
            Self::Skipped => "skipped",
        };
        f.write_str(s)
    }
}
