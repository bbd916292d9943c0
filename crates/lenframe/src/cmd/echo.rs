use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lenframe_frame::{FrameError, FrameReader, FrameWriter};
use lenframe_transport::TcpTransport;

use crate::cmd::EchoArgs;
use crate::exit::{transport_error, CliError, CliResult, SUCCESS};

const ACCEPT_BACKOFF_BASE: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Why a served connection ended.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// Peer hung up between frames.
    Closed,
    /// Peer declared a payload over the limit.
    TooLong,
    /// Transfer failed mid-frame or on a socket error.
    Failed,
}

pub fn run(args: EchoArgs) -> CliResult<i32> {
    let listener =
        TcpTransport::bind(&args.addr).map_err(|err| transport_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone(), listener.local_addr().to_string())?;

    let mut accept_failures = 0u32;
    while running.load(Ordering::SeqCst) {
        let stream = match listener.accept() {
            Ok(stream) => {
                accept_failures = 0;
                stream
            }
            Err(err) => {
                accept_failures = accept_failures.saturating_add(1);
                let delay = accept_backoff(accept_failures);
                tracing::warn!(
                    error = %err,
                    failures = accept_failures,
                    ?delay,
                    "accept failed"
                );
                std::thread::sleep(delay);
                continue;
            }
        };
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let peer = stream.peer_addr();
        std::thread::spawn(move || {
            let end = serve(stream);
            tracing::debug!(?peer, ?end, "connection finished");
        });
    }

    Ok(SUCCESS)
}

/// Delay before retrying after `failures` consecutive accept errors.
///
/// Doubles from 10ms and caps at one second.
fn accept_backoff(failures: u32) -> Duration {
    let shift = failures.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_BASE
        .saturating_mul(1u32 << shift)
        .min(ACCEPT_BACKOFF_MAX)
}

/// Echo frames back on one connection until it ends.
fn serve<S: Read + Write>(stream: S) -> SessionEnd {
    let mut reader = FrameReader::new(stream);
    loop {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(err) if err.is_clean_close() => return SessionEnd::Closed,
            Err(FrameError::OversizedPayload { size, max }) => {
                tracing::warn!(size, max, "too long");
                return SessionEnd::TooLong;
            }
            Err(err) => {
                tracing::warn!(error = %err, "read failed");
                return SessionEnd::Failed;
            }
        };

        tracing::info!(size = frame.payload.len(), text = %frame.text(), "client says");

        if let Err(err) = FrameWriter::new(reader.get_mut()).write_frame(&frame) {
            tracing::warn!(error = %err, "echo send failed");
            return SessionEnd::Failed;
        }
    }
}

// The handler also connects to the listener once so the blocked `accept`
// returns and the loop observes the flag.
fn install_ctrlc_handler(running: Arc<AtomicBool>, wake_addr: String) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
        let _ = TcpTransport::connect(&wake_addr);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
