//! Bench module - the load generator.
//!
//! Provides:
//! - [`BenchConfig`] / [`Session`] - configure and run both phases
//! - [`run_write_phase`] / [`run_read_phase`] - the phase loops
//! - [`RateWindow`] - rolling rate measurement
//! - [`AddRequest`] - randomized write payloads
//!
//! The write phase issues a fixed number of `add` requests and then raises
//! the [`StopSignal`]; the read phase issues `top` requests until it sees
//! the signal. Each phase keeps at most one request in flight and the two
//! run interleaved on one thread.

mod payload;
mod phase;
mod rate;
mod session;

pub use payload::{
    random_city, random_city_pair, random_date, random_price, AddRequest, BASE_PRICE, CITIES,
    PRICE_SPREAD, YEAR,
};
pub use phase::{
    run_read_phase, run_write_phase, PhaseSummary, ReadPhaseState, Step, WritePhaseState,
};
pub use rate::{format_rate, rate, RateWindow};
pub use session::{
    BenchConfig, BenchConfigBuilder, Session, SessionSummary, StopSignal, DEFAULT_HOST,
    DEFAULT_PORT, DEFAULT_REPORT_INTERVAL, DEFAULT_REQUEST_TIMEOUT,
};
