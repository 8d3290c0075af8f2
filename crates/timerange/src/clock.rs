//! Source of the current instant for relative expressions.
//!
//! Parsing `3 hours ago` or `+5 minutes` needs a "now" anchor. Rather than
//! reading the system time inside the grammar, every entry point takes a
//! [`Clock`]; the plain entry points use [`SystemClock`] and tests freeze
//! time with [`FixedClock`].

use std::cell::Cell;

use chrono::{DateTime, Utc};

/// Something that can report the current instant in UTC.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the OS clock via `chrono::Utc::now()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Reads a clock at most once and hands out the same instant afterwards.
///
/// One parse call shares a single anchor, so every relative term in an
/// expression resolves against the same "now". Inputs without relative terms
/// never touch the clock.
pub(crate) struct Anchor<C: Clock> {
    clock: C,
    now: Cell<Option<DateTime<Utc>>>,
}

impl<C: Clock> Anchor<C> {
    pub(crate) fn new(clock: C) -> Self {
        Anchor {
            clock,
            now: Cell::new(None),
        }
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        match self.now.get() {
            Some(now) => now,
            None => {
                let now = self.clock.now();
                self.now.set(Some(now));
                now
            }
        }
    }
}
