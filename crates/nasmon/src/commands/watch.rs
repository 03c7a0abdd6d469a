//! Live view: runs the full store lifecycle and prints changes as they land.

use chrono::Utc;
use nasmon_core::{ConnectionState, DeviceStore, LatestValues};
use serde_json::json;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::latest::{self, LatestRow};

struct Printer {
    format: OutputFormat,
    color: bool,
    quiet: bool,
}

impl Printer {
    fn json(&self) -> bool {
        matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    fn emit(&self, line: &str) {
        output::print_output(line, self.quiet);
    }

    fn stamp(&self) -> String {
        output::dim(&Utc::now().format("%H:%M:%S").to_string(), self.color)
    }

    fn connection(&self, connected: bool) {
        if self.json() {
            self.emit(&output::render_json(
                &json!({"event": "connection", "connected": connected, "at": Utc::now()}),
                true,
            ));
            return;
        }
        let text = if connected { "connected" } else { "disconnected, probing" };
        self.emit(&format!(
            "{} {}",
            self.stamp(),
            output::status_text(text, connected, self.color)
        ));
    }

    fn error(&self, message: &str) {
        if self.json() {
            self.emit(&output::render_json(
                &json!({"event": "error", "message": message, "at": Utc::now()}),
                true,
            ));
            return;
        }
        self.emit(&format!(
            "{} {}",
            self.stamp(),
            output::status_text(message, false, self.color)
        ));
    }

    fn latest(&self, values: &LatestValues) {
        if values.is_empty() {
            return;
        }
        if self.json() {
            self.emit(&output::render_json(
                &json!({"event": "latest", "values": values, "at": Utc::now()}),
                true,
            ));
            return;
        }
        let stamp = self.stamp();
        let lines: Vec<String> = latest::flatten(values)
            .iter()
            .map(|row: &LatestRow| format!("{stamp} {}", row.plain()))
            .collect();
        self.emit(&lines.join("\n"));
    }
}

pub async fn handle(
    store: &DeviceStore,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let printer = Printer {
        format: global.output,
        color: output::should_color(global.color),
        quiet: global.quiet,
    };

    // Subscribe first so nothing written during initialization is missed.
    // Errors and values set by then surface as the loop's first changes.
    let data = store.data();
    let mut connected = data.subscribe_connected();
    let mut latest_values = data.subscribe_latest_values();
    let mut errors = data.subscribe_error();

    store.initialize().await;

    match store.connection_state() {
        ConnectionState::Connected => printer.connection(true),
        ConnectionState::DisconnectedProbing | ConnectionState::Initializing => {
            printer.connection(false);
        }
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let deadline = async {
        match args.duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let mut last_connected = data.is_connected();
    loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => {
                tracing::debug!("interrupted");
                break;
            }
            () = &mut deadline => break,
            Some(now) = connected.changed() => {
                if now != last_connected {
                    last_connected = now;
                    printer.connection(now);
                }
            }
            Some(message) = errors.changed() => {
                if let Some(message) = message {
                    printer.error(&message);
                }
            }
            Some(values) = latest_values.changed() => printer.latest(&values),
        }
    }
    Ok(())
}
