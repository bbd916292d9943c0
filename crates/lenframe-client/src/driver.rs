//! Ordered request sequences over a single connection.

use std::io::{Read, Write};

use tracing::{info, warn};

use crate::client::{Client, ClientConfig};
use crate::connector::connect_with_config;
use crate::error::{ClientError, Result};

/// Default server address for the bundled driver.
pub const DEFAULT_ADDR: &str = "127.0.0.1:1234";

/// Default request sequence for the bundled driver.
pub const DEFAULT_REQUESTS: [&str; 3] = ["Hello 1", "Hello 2", "Hello 3"];

/// A completed request/response pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchanged {
    pub request: String,
    pub response: String,
}

/// The exchange that stopped a sequence.
#[derive(Debug)]
pub struct SequenceFailure {
    /// Zero-based position of the failed request.
    pub index: usize,
    pub request: String,
    pub error: ClientError,
}

/// Outcome of [`run_sequence`].
#[derive(Debug, Default)]
pub struct SequenceReport {
    /// Exchanges that completed, in issuance order.
    pub completed: Vec<Exchanged>,
    /// The first failure, if any.
    pub failure: Option<SequenceFailure>,
    /// Requests never attempted because of the failure.
    pub abandoned: usize,
}

impl SequenceReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Number of exchanges attempted, successful or not.
    pub fn attempted(&self) -> usize {
        self.completed.len() + usize::from(self.failure.is_some())
    }
}

/// Issue `requests` in order, one at a time, stopping at the first failure.
pub fn run_sequence<S, R>(client: &mut Client<S>, requests: &[R]) -> SequenceReport
where
    S: Read + Write,
    R: AsRef<str>,
{
    let mut report = SequenceReport::default();

    for (index, request) in requests.iter().enumerate() {
        let request = request.as_ref();
        match client.query(request) {
            Ok(response) => {
                info!(index, request, response = %response, "exchange succeeded");
                report.completed.push(Exchanged {
                    request: request.to_string(),
                    response,
                });
            }
            Err(error) => {
                report.abandoned = requests.len() - index - 1;
                warn!(
                    index,
                    request,
                    error = %error,
                    abandoned = report.abandoned,
                    "exchange failed, abandoning sequence"
                );
                report.failure = Some(SequenceFailure {
                    index,
                    request: request.to_string(),
                    error,
                });
                break;
            }
        }
    }

    report
}

/// Connect to `addr`, run `requests` in order, then close the connection.
///
/// Only connection setup failures are returned as `Err`; exchange failures
/// are recorded in the report. The connection is released on every path.
pub fn run<R: AsRef<str>>(
    addr: &str,
    requests: &[R],
    config: &ClientConfig,
) -> Result<SequenceReport> {
    let mut client = connect_with_config(addr, config)?;
    let report = run_sequence(&mut client, requests);
    drop(client);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use lenframe_frame::{FrameConfig, FrameReader, FrameWriter, MAX_MSG};
    use lenframe_transport::TcpTransport;

    use super::*;
    use crate::exchange::{ExchangeError, Stage};
    use crate::test_support::ScriptedStream;

    #[test]
    fn all_requests_succeed_in_order() {
        let stream = ScriptedStream::replying(&[b"one", b"two", b"three"]);
        let mut client = Client::from_stream(stream, FrameConfig::default());

        let report = run_sequence(&mut client, &DEFAULT_REQUESTS);

        assert!(report.is_success());
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.abandoned, 0);
        let responses: Vec<_> = report.completed.iter().map(|e| e.response.as_str()).collect();
        assert_eq!(responses, ["one", "two", "three"]);
        assert_eq!(report.completed[1].request, "Hello 2");
    }

    #[test]
    fn second_write_failure_abandons_rest() {
        let mut stream = ScriptedStream::replying(&[b"one", b"two", b"three"]);
        stream.fail_write_on = Some(2);
        let mut client = Client::from_stream(stream, FrameConfig::default());

        let report = run_sequence(&mut client, &DEFAULT_REQUESTS);

        assert_eq!(report.completed.len(), 1);
        assert_eq!(report.abandoned, 1);
        assert_eq!(report.attempted(), 2);
        let failure = report.failure.as_ref().expect("sequence should fail");
        assert_eq!(failure.index, 1);
        assert_eq!(failure.request, "Hello 2");
        assert!(matches!(
            failure.error,
            ClientError::Exchange(ExchangeError::Failed {
                stage: Stage::Write,
                ..
            })
        ));
        // No third write was attempted.
        assert_eq!(client.get_ref().write_calls, 2);
    }

    #[test]
    fn oversized_request_stops_sequence() {
        let stream = ScriptedStream::replying(&[b"one"]);
        let mut client = Client::from_stream(stream, FrameConfig::default());
        let long = "x".repeat(MAX_MSG + 1);
        let requests = vec!["first".to_string(), long, "third".to_string()];

        let report = run_sequence(&mut client, &requests);

        assert_eq!(report.completed.len(), 1);
        assert_eq!(report.failure.as_ref().map(|f| f.index), Some(1));
        assert_eq!(report.abandoned, 1);
    }

    #[test]
    fn empty_sequence() {
        let mut client =
            Client::from_stream(ScriptedStream::new(Vec::new()), FrameConfig::default());
        let report = run_sequence::<_, &str>(&mut client, &[]);
        assert!(report.is_success());
        assert_eq!(report.attempted(), 0);
    }

    #[test]
    fn run_against_loopback_server() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();

        let server = std::thread::spawn(move || {
            let stream = listener.accept().unwrap();
            let mut reader = FrameReader::new(stream);
            let mut seen = Vec::new();
            // Echo until the client hangs up.
            while let Ok(frame) = reader.read_frame() {
                seen.push(frame.text());
                FrameWriter::new(reader.get_mut())
                    .send(frame.payload.as_ref())
                    .unwrap();
            }
            seen
        });

        let report = run(&addr, &DEFAULT_REQUESTS, &ClientConfig::default()).unwrap();
        assert!(report.is_success());
        assert_eq!(report.completed[2].response, "Hello 3");

        // `run` closed the connection, so the server loop ends.
        assert_eq!(server.join().unwrap(), DEFAULT_REQUESTS);
    }

    #[test]
    fn run_reports_connect_failure() {
        let port = TcpTransport::bind("127.0.0.1:0").unwrap().local_addr().port();
        let err = run(
            &format!("127.0.0.1:{port}"),
            &DEFAULT_REQUESTS,
            &ClientConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
