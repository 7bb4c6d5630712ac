use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::task::UNSET;

/// Minute-resolution timestamp in the fixed `YYYY-MM-DD-HH:MM` format.
///
/// The format is zero-padded and most-significant-first, so the derived
/// lexical ordering is chronological ordering.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Current local time (UTC when the local offset cannot be determined).
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(local_now())
    }

    /// Format an arbitrary instant.
    #[must_use]
    pub fn from_datetime(at: OffsetDateTime) -> Self {
        at.format(format_description!("[year]-[month]-[day]-[hour]:[minute]"))
            .map_or_else(|_| Self::unset(), Self)
    }

    /// Wrap a stored value verbatim.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The `-` placeholder used when a stored task has no timestamp.
    #[must_use]
    pub fn unset() -> Self {
        Self(UNSET.to_owned())
    }

    /// Borrow the formatted value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::unset()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Local wall-clock time, falling back to UTC.
#[must_use]
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Today's date as `YYYY-MM-DD`.
#[must_use]
pub fn today() -> String {
    local_now()
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| UNSET.to_owned())
}
