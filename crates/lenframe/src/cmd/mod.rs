use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use lenframe_client::{ClientConfig, DEFAULT_ADDR};
use lenframe_frame::FrameConfig;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod echo;
pub mod query;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a sequence of requests, stopping at the first failure.
    Run(RunArgs),
    /// Send a single request and print the response.
    Query(QueryArgs),
    /// Start an echo server.
    Echo(EchoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Query(args) => query::run(args, format),
        Command::Echo(args) => echo::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Server address (host:port).
    #[arg(long, env = "LENFRAME_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,
    /// Connection timeout (e.g. 5s, 500ms). Default: OS behavior.
    #[arg(long, value_name = "DURATION")]
    pub connect_timeout: Option<String>,
    /// Read/write timeout per exchange (e.g. 5s, 500ms). Default: block.
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,
}

impl ConnectArgs {
    pub fn client_config(&self) -> CliResult<ClientConfig> {
        let io_timeout = self.timeout.as_deref().map(parse_duration).transpose()?;
        Ok(ClientConfig {
            connect_timeout: self
                .connect_timeout
                .as_deref()
                .map(parse_duration)
                .transpose()?,
            frame: FrameConfig {
                read_timeout: io_timeout,
                write_timeout: io_timeout,
                ..FrameConfig::default()
            },
        })
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Requests to send, in order. Default: "Hello 1" "Hello 2" "Hello 3".
    pub requests: Vec<String>,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Request text.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read request text from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Address to bind.
    #[arg(default_value = DEFAULT_ADDR)]
    pub addr: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}
