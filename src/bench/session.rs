//! Benchmark configuration and the session that runs both phases.
//!
//! # Example
//!
//! ```no_run
//! use deals_bench::bench::{BenchConfig, Session};
//!
//! # async fn run() -> deals_bench::error::Result<()> {
//! let config = BenchConfig::builder()
//!     .test_count(10_000)
//!     .ports(vec![5000, 5001])
//!     .build()?;
//!
//! let session = Session::connect(config)?;
//! let summary = session.run().await;
//! println!("{:?}", summary.write);
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::phase::{run_read_phase, run_write_phase, PhaseSummary};
use crate::error::{DealsError, Result};
use crate::transport::{EndpointPool, HttpTransport, Transport};

/// Default host of the service under test.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port of the service under test.
pub const DEFAULT_PORT: u16 = 5000;

/// Iterations between rate lines.
pub const DEFAULT_REPORT_INTERVAL: u64 = 500;

/// Per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Flag shared by the phases: raised when the write phase finishes (or on
/// interrupt), checked by the read phase before each iteration.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    raised: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

/// Validated benchmark configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub test_count: u64,
    pub host: String,
    pub ports: Vec<u16>,
    pub report_interval: u64,
    pub request_timeout: Duration,
    /// Run the write phase (`noset` turns it off).
    pub write_phase: bool,
    /// Run the read phase (`noget` turns it off).
    pub read_phase: bool,
}

impl BenchConfig {
    pub fn builder() -> BenchConfigBuilder {
        BenchConfigBuilder::new()
    }

    /// Endpoint pool for this configuration.
    pub fn endpoint_pool(&self) -> Result<EndpointPool> {
        EndpointPool::with_ports(&self.host, &self.ports)
    }
}

/// Builder for [`BenchConfig`].
#[derive(Debug, Clone)]
pub struct BenchConfigBuilder {
    test_count: u64,
    host: String,
    ports: Vec<u16>,
    report_interval: u64,
    request_timeout: Duration,
    write_phase: bool,
    read_phase: bool,
}

impl BenchConfigBuilder {
    pub fn new() -> Self {
        Self {
            test_count: 0,
            host: DEFAULT_HOST.to_string(),
            ports: vec![DEFAULT_PORT],
            report_interval: DEFAULT_REPORT_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            write_phase: true,
            read_phase: true,
        }
    }

    /// Number of `add` requests in the write phase.
    pub fn test_count(mut self, count: u64) -> Self {
        self.test_count = count;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Ports of the instances to spread requests over.
    ///
    /// Default: `[5000]`
    pub fn ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }

    /// Default: 500
    pub fn report_interval(mut self, interval: u64) -> Self {
        self.report_interval = interval;
        self
    }

    /// Default: 10 seconds
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn skip_write(mut self, skip: bool) -> Self {
        self.write_phase = !skip;
        self
    }

    pub fn skip_read(mut self, skip: bool) -> Self {
        self.read_phase = !skip;
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for an empty host or port list, port 0, a zero report
    /// interval or a zero timeout.
    pub fn build(self) -> Result<BenchConfig> {
        if self.host.is_empty() {
            return Err(DealsError::InvalidConfig("host is empty".to_string()));
        }
        if self.ports.is_empty() {
            return Err(DealsError::InvalidConfig("no ports configured".to_string()));
        }
        if self.ports.contains(&0) {
            return Err(DealsError::InvalidConfig("port 0 is not allowed".to_string()));
        }
        if self.report_interval == 0 {
            return Err(DealsError::InvalidConfig(
                "report interval must be positive".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(DealsError::InvalidConfig(
                "request timeout must be positive".to_string(),
            ));
        }

        Ok(BenchConfig {
            test_count: self.test_count,
            host: self.host,
            ports: self.ports,
            report_interval: self.report_interval,
            request_timeout: self.request_timeout,
            write_phase: self.write_phase,
            read_phase: self.read_phase,
        })
    }
}

impl Default for BenchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-phase results; `None` for a skipped phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub write: Option<PhaseSummary>,
    pub read: Option<PhaseSummary>,
}

/// Both phases over one transport.
pub struct Session<T: Transport> {
    config: BenchConfig,
    transport: T,
    stop: StopSignal,
}

impl Session<HttpTransport> {
    /// Session over HTTP to the configured endpoints.
    pub fn connect(config: BenchConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.endpoint_pool()?, config.request_timeout)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> Session<T> {
    pub fn with_transport(config: BenchConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            stop: StopSignal::new(),
        }
    }

    /// Handle to the stop signal, e.g. for an interrupt handler.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Run the enabled phases concurrently until both finish.
    pub async fn run(&self) -> SessionSummary {
        let config = &self.config;
        tracing::info!(
            "Starting: {} adds, write phase {}, read phase {}, {} endpoint(s)",
            config.test_count,
            on_off(config.write_phase),
            on_off(config.read_phase),
            config.ports.len()
        );

        let write = async {
            if config.write_phase {
                Some(
                    run_write_phase(
                        &self.transport,
                        config.test_count,
                        config.report_interval,
                        &self.stop,
                    )
                    .await,
                )
            } else {
                None
            }
        };

        let read = async {
            if config.read_phase {
                Some(run_read_phase(&self.transport, config.report_interval, &self.stop).await)
            } else {
                None
            }
        };

        let (write, read) = tokio::join!(write, read);
        SessionSummary { write, read }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
