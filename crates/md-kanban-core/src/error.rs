use thiserror::Error;

/// Failure to interpret a wire string as one of the closed domain enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not one of the three workflow stages.
    #[error("unknown task status: {0}")]
    Status(String),

    /// Not one of `low`, `medium`, `high`.
    #[error("unknown priority: {0}")]
    Priority(String),

    /// Not one of the eight `<key>-<direction>` sort options.
    #[error("unknown sort option: {0}")]
    SortOption(String),
}
