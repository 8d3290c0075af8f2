//! Recognizers for the instant grammar.
//!
//! Every recognizer is a pure function from the remaining input to
//! `Option<(value, rest)>`: `None` means the alternative does not apply here,
//! `Some` carries the matched value and whatever input is left. Recognizers
//! never read the clock and never fail; turning a matched [`InstantExpr`]
//! into an instant happens afterwards in [`InstantExpr::resolve`], which is
//! where range errors and impossible calendar dates surface.
//!
//! ```text
//! instant   := relative | epoch | iso-utc | iso-offset
//! relative  := value WS unit WS direction
//! delta     := value WS unit
//! epoch     := value
//! value     := [1-9][0-9]*
//! unit      := second(s) | minute(s) | hour(s) | day(s)     (any case)
//! direction := ago | ahead                                  (any case)
//! iso-utc   := YYYY-MM-DDTHH:MM:SSZ
//! iso-offset:= YYYY-MM-DDTHH:MM:SS(+|-)HH:MM
//! ```

use std::fmt;

use chrono::{DateTime, Datelike, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{Anchor, Clock};
use crate::error::{Result, TimeRangeError};

/// Outcome of a single recognizer: `None` is no match, `Some((value, rest))` a match.
pub(crate) type Parsed<'a, T> = Option<(T, &'a str)>;

// ── Units and directions ────────────────────────────────────────────────────

/// Unit of a delta. Each unit is a fixed number of seconds; a day is always 86400.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
}

impl TimeUnit {
    /// Length of one unit in seconds.
    pub const fn seconds(self) -> i64 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Minute => 60,
            TimeUnit::Hour => 3600,
            TimeUnit::Day => 86400,
        }
    }

    /// Match a unit word, singular or plural, ignoring case.
    pub fn from_word(word: &str) -> Option<TimeUnit> {
        match word.to_ascii_lowercase().as_str() {
            "second" | "seconds" => Some(TimeUnit::Second),
            "minute" | "minutes" => Some(TimeUnit::Minute),
            "hour" | "hours" => Some(TimeUnit::Hour),
            "day" | "days" => Some(TimeUnit::Day),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which way a relative expression moves away from now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ago,
    Ahead,
}

impl Direction {
    /// Match `ago` or `ahead`, ignoring case.
    pub fn from_word(word: &str) -> Option<Direction> {
        if word.eq_ignore_ascii_case("ago") {
            Some(Direction::Ago)
        } else if word.eq_ignore_ascii_case("ahead") {
            Some(Direction::Ahead)
        } else {
            None
        }
    }

    /// Shift `instant` by `delta`: backwards for `Ago`, forwards for `Ahead`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeRangeError::OutOfRange`] if the result falls outside the
    /// years 0001..=9999.
    pub fn apply(self, instant: DateTime<Utc>, delta: TimeDelta) -> Result<DateTime<Utc>> {
        let shifted = match self {
            Direction::Ago => instant.checked_sub_signed(delta),
            Direction::Ahead => instant.checked_add_signed(delta),
        };
        shifted.filter(has_four_digit_year).ok_or_else(|| {
            TimeRangeError::OutOfRange(format!(
                "shifting {} {} by {} seconds",
                instant.to_rfc3339(),
                self,
                delta.num_seconds()
            ))
        })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ago => f.write_str("ago"),
            Direction::Ahead => f.write_str("ahead"),
        }
    }
}

/// A non-negative span written as `<value> <unit>`, e.g. `5 minutes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Delta {
    pub value: u64,
    pub unit: TimeUnit,
}

impl Delta {
    pub fn new(value: u64, unit: TimeUnit) -> Self {
        Delta { value, unit }
    }

    /// Convert to a chrono duration.
    ///
    /// # Errors
    ///
    /// Returns [`TimeRangeError::OutOfRange`] if `value * unit` does not fit a duration.
    pub fn to_duration(&self) -> Result<TimeDelta> {
        i64::try_from(self.value)
            .ok()
            .and_then(|value| value.checked_mul(self.unit.seconds()))
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| TimeRangeError::OutOfRange(format!("delta '{self}' is too large")))
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.value == 1 { "" } else { "s" };
        write!(f, "{} {}{}", self.value, self.unit, plural)
    }
}

// ── Instant expressions ─────────────────────────────────────────────────────

/// Whether `instant` lies in 0001-01-01T00:00:00Z..=9999-12-31T23:59:59Z, the
/// span the ISO UTC form can write back.
pub(crate) fn has_four_digit_year(instant: &DateTime<Utc>) -> bool {
    (1..=9999).contains(&instant.year())
}

/// A matched instant, not yet resolved against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InstantExpr<'a> {
    /// Seconds since the Unix epoch.
    Epoch(u64),
    /// ISO 8601 text with `Z` or a numeric offset, shape already checked.
    Iso(&'a str),
    /// `<delta> ago` / `<delta> ahead`.
    Relative { delta: Delta, direction: Direction },
}

impl InstantExpr<'_> {
    /// Turn the expression into a UTC instant, reading the anchor only for relative terms.
    pub(crate) fn resolve<C: Clock>(&self, anchor: &Anchor<C>) -> Result<DateTime<Utc>> {
        match *self {
            InstantExpr::Epoch(seconds) => i64::try_from(seconds)
                .ok()
                .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
                .filter(has_four_digit_year)
                .ok_or_else(|| {
                    TimeRangeError::OutOfRange(format!("epoch value {seconds} is too large"))
                }),
            InstantExpr::Iso(text) => {
                let instant = DateTime::parse_from_rfc3339(text)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| TimeRangeError::InvalidDatetime(format!("'{text}': {e}")))?;
                // chrono reads a seconds field of 60 as a leap second at any minute.
                if instant.nanosecond() >= 1_000_000_000 {
                    return Err(TimeRangeError::InvalidDatetime(format!(
                        "'{text}': second out of range"
                    )));
                }
                if !has_four_digit_year(&instant) {
                    return Err(TimeRangeError::OutOfRange(format!(
                        "'{text}' falls outside the years 0001..=9999 in UTC"
                    )));
                }
                Ok(instant)
            }
            InstantExpr::Relative { delta, direction } => {
                direction.apply(anchor.now(), delta.to_duration()?)
            }
        }
    }
}

// ── Lexical helpers ─────────────────────────────────────────────────────────

fn skip_ws(input: &str) -> &str {
    input.trim_start_matches(|c: char| c.is_ascii_whitespace())
}

/// Whether only whitespace is left.
pub(crate) fn at_end(input: &str) -> bool {
    skip_ws(input).is_empty()
}

/// Match a fixed token after optional whitespace.
pub(crate) fn literal<'a>(input: &'a str, token: &str) -> Parsed<'a, ()> {
    skip_ws(input).strip_prefix(token).map(|rest| ((), rest))
}

/// Match `[1-9][0-9]*` after optional whitespace.
///
/// Values wider than `u64` saturate; anything that large is rejected as out
/// of range when resolved, so the input still reads as a number.
fn value(input: &str) -> Parsed<'_, u64> {
    let s = skip_ws(input);
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 || s.starts_with('0') {
        return None;
    }
    let (digits, rest) = s.split_at(len);
    Some((digits.parse().unwrap_or(u64::MAX), rest))
}

/// Match an alphabetic word that is separated from what precedes it by
/// whitespace and ends at a word boundary.
fn word(input: &str) -> Parsed<'_, &str> {
    let s = skip_ws(input);
    if s.len() == input.len() {
        return None;
    }
    let len = s.bytes().take_while(u8::is_ascii_alphabetic).count();
    if len == 0 {
        return None;
    }
    let (word, rest) = s.split_at(len);
    if rest.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some((word, rest))
}

/// Match `input` against a shape where `d` is any ASCII digit, `s` is `+` or
/// `-`, and every other byte must appear literally.
fn shaped<'a>(input: &'a str, shape: &str) -> Parsed<'a, &'a str> {
    let s = skip_ws(input);
    let candidate = s.as_bytes().get(..shape.len())?;
    let fits = candidate
        .iter()
        .zip(shape.bytes())
        .all(|(&c, expected)| match expected {
            b'd' => c.is_ascii_digit(),
            b's' => c == b'+' || c == b'-',
            other => c == other,
        });
    // The shape is pure ASCII, so a fitting prefix ends on a char boundary.
    fits.then(|| s.split_at(shape.len()))
}

// ── Recognizers ─────────────────────────────────────────────────────────────

fn unit(input: &str) -> Parsed<'_, TimeUnit> {
    let (word, rest) = word(input)?;
    TimeUnit::from_word(word).map(|unit| (unit, rest))
}

fn direction(input: &str) -> Parsed<'_, Direction> {
    let (word, rest) = word(input)?;
    Direction::from_word(word).map(|direction| (direction, rest))
}

/// `<value> <unit>`
pub(crate) fn delta(input: &str) -> Parsed<'_, Delta> {
    let (value, rest) = value(input)?;
    let (unit, rest) = unit(rest)?;
    Some((Delta::new(value, unit), rest))
}

/// `<value> <unit> <direction>`
fn relative(input: &str) -> Parsed<'_, InstantExpr<'_>> {
    let (delta, rest) = delta(input)?;
    let (direction, rest) = direction(rest)?;
    Some((InstantExpr::Relative { delta, direction }, rest))
}

fn epoch(input: &str) -> Parsed<'_, InstantExpr<'_>> {
    let (seconds, rest) = value(input)?;
    Some((InstantExpr::Epoch(seconds), rest))
}

fn iso_utc(input: &str) -> Parsed<'_, InstantExpr<'_>> {
    let (text, rest) = shaped(input, "dddd-dd-ddTdd:dd:ddZ")?;
    Some((InstantExpr::Iso(text), rest))
}

fn iso_offset(input: &str) -> Parsed<'_, InstantExpr<'_>> {
    let (text, rest) = shaped(input, "dddd-dd-ddTdd:dd:ddsdd:dd")?;
    Some((InstantExpr::Iso(text), rest))
}

type InstantRecognizer = for<'a> fn(&'a str) -> Parsed<'a, InstantExpr<'a>>;

/// Every way an instant can start at `input`, in precedence order.
///
/// Composite recognizers walk these candidates and keep the first one that
/// lets the rest of their grammar consume the input. The epoch recognizer
/// happily matches the `2023` of an ISO date, so taking only the first
/// candidate would not be enough.
pub(crate) fn instants(input: &str) -> impl Iterator<Item = (InstantExpr<'_>, &str)> {
    let recognizers: [InstantRecognizer; 4] = [relative, epoch, iso_utc, iso_offset];
    recognizers
        .into_iter()
        .filter_map(move |recognize| recognize(input))
}

/// An instant that consumes the whole of `input`.
pub(crate) fn complete_instant(input: &str) -> Option<InstantExpr<'_>> {
    instants(input)
        .find(|(_, rest)| at_end(rest))
        .map(|(expr, _)| expr)
}
