use lenframe_client::DEFAULT_REQUESTS;

use crate::cmd::RunArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_exchanges, OutputFormat};

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.connect.client_config()?;
    let requests = resolve_requests(args.requests);

    let report = lenframe_client::run(&args.connect.addr, &requests, &config)
        .map_err(|err| client_error("connect failed", err))?;

    print_exchanges(&report.completed, &args.connect.addr, format);

    match report.failure {
        None => Ok(SUCCESS),
        Some(failure) => {
            let context = format!(
                "request {} of {} failed ({} abandoned)",
                failure.index + 1,
                requests.len(),
                report.abandoned
            );
            Err(client_error(&context, failure.error))
        }
    }
}

fn resolve_requests(requests: Vec<String>) -> Vec<String> {
    if requests.is_empty() {
        DEFAULT_REQUESTS.iter().map(|r| r.to_string()).collect()
    } else {
        requests
    }
}
