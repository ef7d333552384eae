use std::fmt::Debug;

use serde::Serialize;

use crate::core::error::AppError;

/// A resource-specific, closed set of statuses
pub trait StatusLifecycle: Copy + Eq + Debug + Serialize + Send + Sync + Unpin + 'static {
    const ALL: &'static [Self];

    /// Status assigned on creation
    const INITIAL: Self;

    fn as_str(&self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }

    /// Parse a request-supplied status, reporting failures against the `status` field
    fn parse_field(value: &str) -> Result<Self, AppError> {
        Self::parse(value).ok_or_else(|| {
            let choices: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
            AppError::field(
                "status",
                format!(
                    "\"{}\" is not a valid choice. Choices are: {}.",
                    value,
                    choices.join(", ")
                ),
            )
        })
    }
}
