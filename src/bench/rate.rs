//! Rolling request-rate measurement.
//!
//! A [`RateWindow`] remembers when the current window opened. Rolling it
//! with a tick count closes the window, yields `1000 * ticks / elapsed_ms`
//! and opens the next one. Callers pass `now` in so the arithmetic can be
//! checked against synthetic clocks.

use std::time::{Duration, Instant};

/// Requests per second for `ticks` requests over `elapsed`.
///
/// `None` when no time has passed.
pub fn rate(ticks: u64, elapsed: Duration) -> Option<f64> {
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    if elapsed_ms > 0.0 {
        Some(1000.0 * ticks as f64 / elapsed_ms)
    } else {
        None
    }
}

/// Operator-facing rate line, e.g. `ADD rate:1234.57`.
pub fn format_rate(label: &str, rate: f64) -> String {
    format!("{label} rate:{rate:.2}")
}

/// Start of the current measurement window.
#[derive(Debug, Clone, Copy)]
pub struct RateWindow {
    opened: Instant,
}

impl RateWindow {
    pub fn new() -> Self {
        Self::opened_at(Instant::now())
    }

    pub fn opened_at(opened: Instant) -> Self {
        Self { opened }
    }

    /// Close the window at `now` and open a new one there.
    pub fn roll(&mut self, ticks: u64, now: Instant) -> Option<f64> {
        let elapsed = now.saturating_duration_since(self.opened);
        self.opened = now;
        rate(ticks, elapsed)
    }

    pub fn opened(&self) -> Instant {
        self.opened
    }
}

impl Default for RateWindow {
    fn default() -> Self {
        Self::new()
    }
}
