use std::fs;

use lenframe_client::{connect_with_config, Exchanged};

use crate::cmd::QueryArgs;
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_exchanges, OutputFormat};

pub fn run(args: QueryArgs, format: OutputFormat) -> CliResult<i32> {
    let request = resolve_request(&args)?;
    let config = args.connect.client_config()?;

    let mut client = connect_with_config(&args.connect.addr, &config)
        .map_err(|err| client_error("connect failed", err))?;
    let response = client
        .query(&request)
        .map_err(|err| client_error("query failed", err))?;

    print_exchanges(
        &[Exchanged { request, response }],
        &args.connect.addr,
        format,
    );
    Ok(SUCCESS)
}

fn resolve_request(args: &QueryArgs) -> CliResult<String> {
    if let Some(data) = &args.data {
        return Ok(data.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        });
    }
    Err(CliError::new(USAGE, "one of --data or --file is required"))
}
