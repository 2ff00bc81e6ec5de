use std::io::{IsTerminal, Write};
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
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
struct MessageOutput<'a> {
    peer: String,
    size: usize,
    payload: &'a str,
    timestamp: String,
}

/// Print one decoded message to stdout in the selected format.
pub fn print_message(peer: SocketAddr, payload: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                peer: peer.to_string(),
                size: payload.len(),
                payload,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PEER", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    peer.to_string(),
                    payload.len().to_string(),
                    payload.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("peer={} size={} payload={}", peer, payload.len(), payload);
        }
        OutputFormat::Raw => {
            print_raw(payload.as_bytes());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.write_all(b"\n");
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
