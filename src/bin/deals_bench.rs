//! Load generator for the deals service.
//!
//! ```bash
//! deals-bench 100000          # write 100000 deals, read until done
//! deals-bench 100000 noget    # write only
//! deals-bench 0 noset         # read only, until Ctrl-C
//! ```
//!
//! Rate lines go to stdout, logs to stderr (`RUST_LOG` selects the level).

use anyhow::Context;
use clap::Parser;

use deals_bench::bench::{BenchConfig, PhaseSummary, Session};
use deals_bench::output::write_stdout_line;

const USAGE: &str = "deals-bench <testcount> [noget|noset]";

#[derive(Parser, Debug)]
#[command(name = "deals-bench")]
#[command(about = "Drive add/top load against the deals service")]
struct Args {
    /// Number of add requests in the write phase
    test_count: u64,

    /// `noget` skips the read phase, `noset` the write phase; any other
    /// word runs both
    mode: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Noget,
    Noset,
}

impl Mode {
    fn from_arg(arg: Option<&str>) -> Option<Self> {
        match arg {
            Some("noget") => Some(Mode::Noget),
            Some("noset") => Some(Mode::Noset),
            _ => None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(_) => {
            write_stdout_line(USAGE)?;
            return Ok(());
        }
    };

    deals_bench::logging::init_tracing();

    let mode = Mode::from_arg(args.mode.as_deref());
    let config = BenchConfig::builder()
        .test_count(args.test_count)
        .skip_read(mode == Some(Mode::Noget))
        .skip_write(mode == Some(Mode::Noset))
        .build()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: BenchConfig) -> anyhow::Result<()> {
    let session = Session::connect(config).context("create HTTP session")?;

    // Without a write phase nothing else ends the read phase.
    if !session.config().write_phase {
        let stop = session.stop_signal();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, stopping read phase");
                stop.raise();
            }
        });
    }

    let summary = session.run().await;
    if let Some(write) = summary.write {
        log_summary("add", &write);
    }
    if let Some(read) = summary.read {
        log_summary("top", &read);
    }
    Ok(())
}

fn log_summary(phase: &str, summary: &PhaseSummary) {
    tracing::info!(
        "{} phase: {} requests, {} failures, {} records",
        phase,
        summary.requests,
        summary.failures,
        summary.records
    );
}
