use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lenframe_client::Exchanged;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ExchangeOutput<'a> {
    index: usize,
    server: &'a str,
    request: &'a str,
    response: &'a str,
    response_size: usize,
    timestamp: String,
}

/// Print completed exchanges, one JSON object per line in JSON mode.
pub fn print_exchanges(exchanges: &[Exchanged], server: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for (index, exchanged) in exchanges.iter().enumerate() {
                let out = ExchangeOutput {
                    index,
                    server,
                    request: &exchanged.request,
                    response: &exchanged.response,
                    response_size: exchanged.response.len(),
                    timestamp: now_unix_seconds(),
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            if exchanges.is_empty() {
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "REQUEST", "RESPONSE", "SIZE"]);
            for (index, exchanged) in exchanges.iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    exchanged.request.clone(),
                    exchanged.response.clone(),
                    exchanged.response.len().to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for exchanged in exchanges {
                println!("Server says: {}", exchanged.response);
            }
        }
        OutputFormat::Raw => {
            for exchanged in exchanges {
                print_raw(exchanged.response.as_bytes());
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
