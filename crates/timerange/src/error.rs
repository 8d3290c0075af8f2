//! Error types for timerange parsing.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeRangeError {
    /// No grammar alternative consumed the whole input.
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// The input has the shape of an ISO 8601 datetime but names an impossible date or offset.
    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    /// An epoch value, delta or shifted instant falls outside the representable range.
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// A closed window whose start is later than its end.
    #[error("Invalid window: {0}")]
    InvalidWindow(String),
}

impl TimeRangeError {
    /// Whether the input could not be read at all, as opposed to read but not computed.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            TimeRangeError::InvalidExpression(_) | TimeRangeError::InvalidDatetime(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TimeRangeError>;
