//! Time windows: spans with both sides bound.
//!
//! ```text
//! window := instant '..' instant    both ends given
//!         | instant '+' delta       START plus a span
//!         | '+' delta               now plus a span
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::clock::{Anchor, Clock, SystemClock};
use crate::error::{Result, TimeRangeError};
use crate::grammar::{at_end, delta, instants, literal, Delta, Direction, InstantExpr};
use crate::instant::format_instant;
use crate::range::{closed_pair, TimeRange, SEPARATOR};

// ── Options ─────────────────────────────────────────────────────────────────

/// What to do with a `START..END` window whose START is later than END.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReversedWindow {
    /// Fail with [`TimeRangeError::InvalidWindow`].
    #[default]
    Reject,
    /// Swap the two ends.
    Reorder,
}

/// Options for [`parse_timewindow_with_options`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Handling of closed windows written back to front.
    pub reversed_window: ReversedWindow,
}

// ── TimeWindow ──────────────────────────────────────────────────────────────

/// A span of time with both ends bound and `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// # Errors
    ///
    /// Returns [`TimeRangeError::InvalidWindow`] if `start` is later than `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(TimeRangeError::InvalidWindow(format!(
                "start {} is later than end {}",
                format_instant(&start),
                format_instant(&end)
            )));
        }
        Ok(TimeWindow { start, end })
    }

    /// The window between `a` and `b`, whichever comes first.
    pub fn between(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        TimeWindow {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Whether `instant` lies within the window. Both ends are inclusive.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

impl From<TimeWindow> for TimeRange {
    fn from(window: TimeWindow) -> Self {
        TimeRange::closed(window.start, window.end)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            format_instant(&self.start),
            SEPARATOR,
            format_instant(&self.end)
        )
    }
}

impl FromStr for TimeWindow {
    type Err = TimeRangeError;

    fn from_str(s: &str) -> Result<Self> {
        parse_timewindow(s)
    }
}

// ── Grammar ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowExpr<'a> {
    Closed(InstantExpr<'a>, InstantExpr<'a>),
    StartPlus(InstantExpr<'a>, Delta),
    NowPlus(Delta),
}

/// `+<value> <unit>` consuming the whole input.
fn plus_delta(input: &str) -> Option<Delta> {
    let ((), rest) = literal(input, "+")?;
    let (delta, rest) = delta(rest)?;
    at_end(rest).then_some(delta)
}

fn window(input: &str) -> Option<WindowExpr<'_>> {
    closed_pair(input)
        .map(|(start, end)| WindowExpr::Closed(start, end))
        .or_else(|| {
            instants(input).find_map(|(start, rest)| {
                plus_delta(rest).map(|delta| WindowExpr::StartPlus(start, delta))
            })
        })
        .or_else(|| plus_delta(input).map(WindowExpr::NowPlus))
}

fn extend(start: DateTime<Utc>, delta: &Delta) -> Result<TimeWindow> {
    let end = Direction::Ahead.apply(start, delta.to_duration()?)?;
    TimeWindow::new(start, end)
}

impl WindowExpr<'_> {
    fn resolve<C: Clock>(&self, anchor: &Anchor<C>, options: &ParseOptions) -> Result<TimeWindow> {
        match self {
            WindowExpr::Closed(start, end) => {
                let start = start.resolve(anchor)?;
                let end = end.resolve(anchor)?;
                match options.reversed_window {
                    ReversedWindow::Reject => TimeWindow::new(start, end),
                    ReversedWindow::Reorder => Ok(TimeWindow::between(start, end)),
                }
            }
            WindowExpr::StartPlus(start, delta) => extend(start.resolve(anchor)?, delta),
            WindowExpr::NowPlus(delta) => extend(anchor.now(), delta),
        }
    }
}

// ── Entry points ────────────────────────────────────────────────────────────

/// Parse a time window, reading the system clock for relative expressions.
///
/// Windows may be specified as:
///
/// - `START..END` between START and END
/// - `START+DELTA` from START for DELTA
/// - `+DELTA` from now for DELTA
///
/// START and END are anything [`parse_datetime`](crate::parse_datetime)
/// accepts; DELTA is `<value> <unit>`, e.g. `1 hour` or `15 minutes`.
///
/// # Errors
///
/// - [`TimeRangeError::InvalidExpression`] if the input is not one of the three shapes
/// - [`TimeRangeError::InvalidWindow`] if START is later than END
/// - [`TimeRangeError::InvalidDatetime`] / [`TimeRangeError::OutOfRange`] if an end
///   cannot be turned into an instant
///
/// # Examples
///
/// ```
/// use timerange::parse_timewindow;
///
/// let window = parse_timewindow("2023-11-14T00:00:00Z+1 hour").unwrap();
/// assert_eq!(window.to_string(), "2023-11-14T00:00:00Z..2023-11-14T01:00:00Z");
/// ```
pub fn parse_timewindow(text: &str) -> Result<TimeWindow> {
    parse_timewindow_with_clock(text, SystemClock)
}

/// Parse a time window, taking "now" from `clock`.
pub fn parse_timewindow_with_clock<C: Clock>(text: &str, clock: C) -> Result<TimeWindow> {
    parse_timewindow_with_options(text, clock, &ParseOptions::default())
}

/// Parse a time window with explicit options.
pub fn parse_timewindow_with_options<C: Clock>(
    text: &str,
    clock: C,
    options: &ParseOptions,
) -> Result<TimeWindow> {
    let anchor = Anchor::new(clock);
    window(text)
        .ok_or_else(|| {
            TimeRangeError::InvalidExpression(format!(
                "cannot parse timewindow expression: '{}'",
                text.trim()
            ))
        })
        .and_then(|expr| expr.resolve(&anchor, options))
        .inspect(|window| debug!("parsed timewindow '{}' as {}", text, window))
        .inspect_err(|e| debug!("rejected timewindow '{}': {}", text, e))
}
