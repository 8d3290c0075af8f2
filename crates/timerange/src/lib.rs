//! # timerange
//!
//! Parse the human-written instants, ranges and windows a monitoring agent
//! uses to bound its queries ("load data from the last 24 hours", "events
//! between two ISO timestamps").
//!
//! | Form | Example | Result |
//! |---|---|---|
//! | epoch | `1700000000` | instant |
//! | ISO UTC | `2023-11-14T22:13:20Z` | instant |
//! | ISO offset | `2023-11-14T22:13:20+02:00` | instant |
//! | relative | `3 hours ago` | instant |
//! | closed range | `2023-11-14T00:00:00Z..2023-11-15T00:00:00Z` | [`TimeRange`] |
//! | left-open range | `..2023-11-15T00:00:00Z` | [`TimeRange`] |
//! | right-open range | `2023-11-14T00:00:00Z..` | [`TimeRange`] |
//! | start+delta window | `2023-11-14T00:00:00Z+1 hour` | [`TimeWindow`] |
//! | now+delta window | `+5 minutes` | [`TimeWindow`] |
//!
//! Every input must match one form completely. Instants are always returned
//! in UTC. Relative forms read "now" from a [`Clock`]; the `*_with_clock`
//! variants take one explicitly so callers and tests can freeze time.
//!
//! ## Modules
//!
//! - [`clock`] — source of the current instant
//! - [`instant`] — single instants
//! - [`range`] — ranges with optional bounds
//! - [`window`] — windows with both bounds
//! - [`error`] — error types

pub mod clock;
pub mod error;
mod grammar;
pub mod instant;
pub mod range;
pub mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::TimeRangeError;
pub use grammar::{Delta, Direction, TimeUnit};
pub use instant::{format_instant, parse_datetime, parse_datetime_with_clock};
pub use range::{parse_timerange, parse_timerange_with_clock, TimeRange};
pub use window::{
    parse_timewindow, parse_timewindow_with_clock, parse_timewindow_with_options, ParseOptions,
    ReversedWindow, TimeWindow,
};
