use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Workflow stage of a task. Each stage is one board column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not picked up yet.
    #[default]
    #[serde(alias = "未着手")]
    NotStarted,
    /// Actively being worked on.
    #[serde(alias = "進行中")]
    InProgress,
    /// Completed.
    #[serde(alias = "完了")]
    Done,
}

impl TaskStatus {
    /// Every stage in board column order.
    pub const ALL: [Self; 3] = [Self::NotStarted, Self::InProgress, Self::Done];

    /// Wire value, also used as the column identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }

    /// Human-readable column heading.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "not-started" | "未着手" => Ok(Self::NotStarted),
            "in-progress" | "進行中" => Ok(Self::InProgress),
            "done" | "完了" => Ok(Self::Done),
            other => Err(ParseError::Status(other.to_owned())),
        }
    }
}

/// Task priority with a fixed ordering weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    /// Weight 1.
    #[default]
    #[serde(alias = "低")]
    Low,
    /// Weight 2.
    #[serde(alias = "中")]
    Medium,
    /// Weight 3.
    #[serde(alias = "高")]
    High,
}

impl Priority {
    /// Every priority from lowest to highest.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Ordering weight: low=1, medium=2, high=3.
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "low" | "低" => Ok(Self::Low),
            "medium" | "中" => Ok(Self::Medium),
            "high" | "高" => Ok(Self::High),
            other => Err(ParseError::Priority(other.to_owned())),
        }
    }
}
