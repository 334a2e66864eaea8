//! Write and read phases.
//!
//! Each phase is a small state machine ([`WritePhaseState`],
//! [`ReadPhaseState`]) that decides, one iteration at a time, whether to
//! issue another request and whether a rate line is due. The async loops
//! around them send exactly one request at a time and yield between
//! iterations so the two phases interleave on a single thread.

use std::time::Instant;

use super::payload::{random_city, AddRequest};
use super::rate::{format_rate, RateWindow};
use super::session::StopSignal;
use crate::decoder;
use crate::error::Result;
use crate::output;
use crate::protocol::Envelope;
use crate::transport::{DealsRequest, ServiceResponse, Transport};

/// What a phase does next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Issue one request, printing the rate first if present.
    Issue { report: Option<f64> },
    /// Leave the loop.
    Done,
}

/// Counts of one finished phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseSummary {
    /// Requests issued.
    pub requests: u64,
    /// Requests that failed in transport or returned a non-2xx status.
    pub failures: u64,
    /// Deal records decoded from responses (read phase only).
    pub records: u64,
}

/// Countdown of the write phase.
#[derive(Debug, Clone)]
pub struct WritePhaseState {
    remaining: u64,
    remaining_at_window: u64,
    report_interval: u64,
    window: RateWindow,
}

impl WritePhaseState {
    pub fn new(count: u64, report_interval: u64, now: Instant) -> Self {
        Self {
            remaining: count,
            remaining_at_window: count,
            report_interval: report_interval.max(1),
            window: RateWindow::opened_at(now),
        }
    }

    /// Decrement the countdown; a rate is due whenever the new count is a
    /// multiple of the report interval.
    pub fn step(&mut self, now: Instant) -> Step {
        if self.remaining == 0 {
            return Step::Done;
        }
        self.remaining -= 1;

        let report = if self.remaining % self.report_interval == 0 {
            let ticks = self.remaining_at_window - self.remaining;
            self.remaining_at_window = self.remaining;
            self.window.roll(ticks, now)
        } else {
            None
        };
        Step::Issue { report }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

/// Iteration counter of the read phase.
#[derive(Debug, Clone)]
pub struct ReadPhaseState {
    iterations: u64,
    report_interval: u64,
    window: RateWindow,
}

impl ReadPhaseState {
    pub fn new(report_interval: u64, now: Instant) -> Self {
        Self {
            iterations: 0,
            report_interval: report_interval.max(1),
            window: RateWindow::opened_at(now),
        }
    }

    /// Stop if `stop` is raised; otherwise issue, with a rate over a fixed
    /// `report_interval` ticks after every full interval of iterations.
    pub fn step(&mut self, stop: bool, now: Instant) -> Step {
        if stop {
            return Step::Done;
        }
        let report = if self.iterations > 0 && self.iterations % self.report_interval == 0 {
            self.window.roll(self.report_interval, now)
        } else {
            None
        };
        self.iterations += 1;
        Step::Issue { report }
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}

/// Issue `count` random `add` requests, then raise `stop`.
pub async fn run_write_phase<T: Transport + ?Sized>(
    transport: &T,
    count: u64,
    report_interval: u64,
    stop: &StopSignal,
) -> PhaseSummary {
    let mut state = WritePhaseState::new(count, report_interval, Instant::now());
    let mut summary = PhaseSummary::default();

    while let Step::Issue { report } = state.step(Instant::now()) {
        if let Some(rate) = report {
            output::emit(&format_rate("ADD", rate));
        }

        let fields = AddRequest::random(&mut rand::thread_rng());
        let request = match DealsRequest::add(&fields) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!("Failed to build add request: {}", e);
                summary.failures += 1;
                continue;
            }
        };

        summary.requests += 1;
        check(transport.send(&request).await, &request, &mut summary);

        tokio::task::yield_now().await;
    }

    output::emit("add done");
    stop.raise();
    summary
}

/// Issue random `top` requests until `stop` is raised.
///
/// Every body that arrives is decoded as a raw envelope and discarded,
/// whatever the status.
pub async fn run_read_phase<T: Transport + ?Sized>(
    transport: &T,
    report_interval: u64,
    stop: &StopSignal,
) -> PhaseSummary {
    let mut state = ReadPhaseState::new(report_interval, Instant::now());
    let mut summary = PhaseSummary::default();

    while let Step::Issue { report } = state.step(stop.is_raised(), Instant::now()) {
        if let Some(rate) = report {
            output::emit(&format_rate("TOP", rate));
        }

        let request = DealsRequest::top(random_city(&mut rand::thread_rng()));
        summary.requests += 1;

        if let Some(response) = check(transport.send(&request).await, &request, &mut summary) {
            match Envelope::parse(response.body) {
                Ok(envelope) => {
                    let records = decoder::filter_records(decoder::decode_raw(&envelope));
                    summary.records += records.len() as u64;
                }
                Err(e) => tracing::warn!("Undecodable top response: {}", e),
            }
        }

        tokio::task::yield_now().await;
    }

    output::emit("top done");
    summary
}

/// Count a transport error or a non-2xx status as a failure.
///
/// Any response that arrived is handed back, error statuses included.
fn check(
    result: Result<ServiceResponse>,
    request: &DealsRequest,
    summary: &mut PhaseSummary,
) -> Option<ServiceResponse> {
    match result {
        Ok(response) => {
            if !response.is_success() {
                tracing::debug!(
                    "{} got status {} ({} bytes)",
                    request.operation(),
                    response.status,
                    response.body.len()
                );
                summary.failures += 1;
            }
            Some(response)
        }
        Err(e) => {
            tracing::warn!("{} request failed: {}", request.operation(), e);
            summary.failures += 1;
            None
        }
    }
}
