//! Time ranges whose sides may be open.
//!
//! ```text
//! range := instant '..' instant     closed
//!        | '..' instant             left-open  (from -infinity)
//!        | instant '..'             right-open (to +infinity)
//! ```
//!
//! The alternatives are tried in that order. `A..` is a prefix of `A..B`, so
//! the closed form has to get the first chance at the whole input.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

use crate::clock::{Anchor, Clock, SystemClock};
use crate::error::{Result, TimeRangeError};
use crate::grammar::{at_end, instants, literal, InstantExpr};
use crate::instant::format_instant;

/// Separator between the two sides of a range or closed window.
pub(crate) const SEPARATOR: &str = "..";

/// A span of time with at least one bound.
///
/// A missing `start` means the range reaches back indefinitely; a missing
/// `end` means it runs on indefinitely. Both missing is not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeRange {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Both sides bound. The bounds are not reordered.
    pub fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        TimeRange {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Everything up to and including `end`.
    pub fn left_open(end: DateTime<Utc>) -> Self {
        TimeRange {
            start: None,
            end: Some(end),
        }
    }

    /// Everything from `start` onwards.
    pub fn right_open(start: DateTime<Utc>) -> Self {
        TimeRange {
            start: Some(start),
            end: None,
        }
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub fn is_closed(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Whether `instant` lies within the range. Bounds are inclusive.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| start <= instant)
            && self.end.is_none_or(|end| instant <= end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = &self.start {
            f.write_str(&format_instant(start))?;
        }
        f.write_str(SEPARATOR)?;
        if let Some(end) = &self.end {
            f.write_str(&format_instant(end))?;
        }
        Ok(())
    }
}

impl FromStr for TimeRange {
    type Err = TimeRangeError;

    fn from_str(s: &str) -> Result<Self> {
        parse_timerange(s)
    }
}

// ── Grammar ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeExpr<'a> {
    Closed(InstantExpr<'a>, InstantExpr<'a>),
    LeftOpen(InstantExpr<'a>),
    RightOpen(InstantExpr<'a>),
}

/// `A..B` consuming the whole input.
pub(crate) fn closed_pair(input: &str) -> Option<(InstantExpr<'_>, InstantExpr<'_>)> {
    instants(input).find_map(|(start, rest)| {
        let ((), rest) = literal(rest, SEPARATOR)?;
        instants(rest)
            .find(|(_, rest)| at_end(rest))
            .map(|(end, _)| (start, end))
    })
}

fn left_open(input: &str) -> Option<InstantExpr<'_>> {
    let ((), rest) = literal(input, SEPARATOR)?;
    instants(rest)
        .find(|(_, rest)| at_end(rest))
        .map(|(end, _)| end)
}

fn right_open(input: &str) -> Option<InstantExpr<'_>> {
    instants(input).find_map(|(start, rest)| {
        let ((), rest) = literal(rest, SEPARATOR)?;
        at_end(rest).then_some(start)
    })
}

fn range(input: &str) -> Option<RangeExpr<'_>> {
    closed_pair(input)
        .map(|(start, end)| RangeExpr::Closed(start, end))
        .or_else(|| left_open(input).map(RangeExpr::LeftOpen))
        .or_else(|| right_open(input).map(RangeExpr::RightOpen))
}

impl RangeExpr<'_> {
    fn resolve<C: Clock>(&self, anchor: &Anchor<C>) -> Result<TimeRange> {
        Ok(match self {
            RangeExpr::Closed(start, end) => {
                TimeRange::closed(start.resolve(anchor)?, end.resolve(anchor)?)
            }
            RangeExpr::LeftOpen(end) => TimeRange::left_open(end.resolve(anchor)?),
            RangeExpr::RightOpen(start) => TimeRange::right_open(start.resolve(anchor)?),
        })
    }
}

// ── Entry points ────────────────────────────────────────────────────────────

/// Parse a time range, reading the system clock for relative expressions.
///
/// Ranges may be specified as:
///
/// - `START..END` between START and END
/// - `START..` from START onwards
/// - `..END` up to END
///
/// where START and END are anything [`parse_datetime`](crate::parse_datetime)
/// accepts. Whitespace around `..` is allowed.
///
/// # Errors
///
/// - [`TimeRangeError::InvalidExpression`] if the input is not one of the three shapes
/// - [`TimeRangeError::InvalidDatetime`] / [`TimeRangeError::OutOfRange`] if a side
///   cannot be turned into an instant
///
/// # Examples
///
/// ```
/// use timerange::parse_timerange;
///
/// let range = parse_timerange("..2023-11-15T00:00:00Z").unwrap();
/// assert!(range.start().is_none());
/// assert_eq!(range.to_string(), "..2023-11-15T00:00:00Z");
/// ```
pub fn parse_timerange(text: &str) -> Result<TimeRange> {
    parse_timerange_with_clock(text, SystemClock)
}

/// Parse a time range, taking "now" from `clock`.
pub fn parse_timerange_with_clock<C: Clock>(text: &str, clock: C) -> Result<TimeRange> {
    let anchor = Anchor::new(clock);
    range(text)
        .ok_or_else(|| {
            TimeRangeError::InvalidExpression(format!(
                "cannot parse timerange expression: '{}'",
                text.trim()
            ))
        })
        .and_then(|expr| expr.resolve(&anchor))
        .inspect(|range| debug!("parsed timerange '{}' as {}", text, range))
        .inspect_err(|e| debug!("rejected timerange '{}': {}", text, e))
}
