//! Decode a compressed `top` response from stdin.
//!
//! ```bash
//! curl deals:8090/deals/top?origin=MOW | deals-decode
//! ```
//!
//! Prints one line per deal record. Logs go to stderr.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncReadExt;

use deals_bench::codec::SegmentCodec;
use deals_bench::decoder::decode_envelope;
use deals_bench::output::{write_stdout_line, write_stdout_lines};
use deals_bench::protocol::{EnvelopeBuffer, DEFAULT_MAX_ENVELOPE_SIZE};
use deals_bench::record::DealRecord;

const USAGE: &str = "USAGE   curl deals:8090/deals/top?origin=MOW | deals-decode";

/// How long to wait for the first bytes on stdin.
const INPUT_TIMEOUT: Duration = Duration::from_millis(2000);

const READ_CHUNK: usize = 64 * 1024;

#[derive(Parser, Debug)]
#[command(name = "deals-decode")]
#[command(about = "Decode a deals service response read from stdin")]
struct Args {
    /// Segments are plain JSON instead of zlib-compressed JSON
    #[arg(long)]
    raw: bool,

    /// Largest accepted body in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_ENVELOPE_SIZE)]
    max_size: usize,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    deals_bench::logging::init_tracing();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;

    let result = runtime.block_on(run(args));
    // A stdin read abandoned by the timeout would otherwise block shutdown.
    runtime.shutdown_background();
    result
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut stdin = tokio::io::stdin();
    let mut buffer = EnvelopeBuffer::with_max_size(args.max_size);
    let mut chunk = vec![0u8; READ_CHUNK];

    let first = match tokio::time::timeout(INPUT_TIMEOUT, stdin.read(&mut chunk)).await {
        Ok(read) => read.context("read stdin")?,
        Err(_) => {
            write_stdout_line(USAGE)?;
            return Ok(ExitCode::SUCCESS);
        }
    };
    buffer.push(&chunk[..first])?;

    if first > 0 {
        loop {
            let n = stdin.read(&mut chunk).await.context("read stdin")?;
            if n == 0 {
                break;
            }
            buffer.push(&chunk[..n])?;
        }
    }

    tracing::debug!("Read {} bytes in {} chunks", buffer.len(), buffer.chunks());

    let codec = if args.raw {
        SegmentCodec::Raw
    } else {
        SegmentCodec::Deflate
    };

    // decode_envelope logs the reason for a malformed body.
    let records = match decode_envelope(buffer.into_bytes(), codec).await {
        Ok(records) => records,
        Err(_) => return Ok(ExitCode::FAILURE),
    };

    write_stdout_lines(records.iter().map(DealRecord::render_line))?;
    Ok(ExitCode::SUCCESS)
}
