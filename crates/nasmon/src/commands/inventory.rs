//! Inventory command handler.

use nasmon_core::{DeviceStore, Inventory};
use serde_json::Value;
use tabled::Tabled;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl ComponentRow {
    fn new(kind: &'static str, value: &Value) -> Self {
        Self {
            kind,
            name: output::field(value, "name"),
            details: summary(value),
        }
    }
}

/// Pools list their member count; everything else its model, if known.
fn summary(value: &Value) -> String {
    if let Some(disks) = value.get("disks").and_then(Value::as_array) {
        return format!("{} disks", disks.len());
    }
    value
        .get("details")
        .and_then(|d| d.get("model"))
        .or_else(|| value.get("model"))
        .map_or_else(|| "-".into(), output::value_text)
}

fn rows(inventory: &Inventory) -> Vec<ComponentRow> {
    let devices = &inventory.system_devices;
    let mut rows: Vec<ComponentRow> = inventory
        .zpools
        .iter()
        .map(|p| ComponentRow::new("zfs_pool", p))
        .collect();
    for (kind, value) in [
        ("cpu", &devices.cpu),
        ("ram", &devices.ram),
        ("network", &devices.network),
    ] {
        if let Some(v) = value {
            rows.push(ComponentRow::new(kind, v));
        }
    }
    rows.extend(
        devices
            .storage
            .iter()
            .map(|d| ComponentRow::new("storage", d)),
    );
    rows
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(store: &DeviceStore, global: &GlobalOpts) -> Result<(), CliError> {
    store.load_inventory().await;
    util::ensure_connected(store)?;

    let data = store.data();
    let Some(inventory) = data.inventory() else {
        return Ok(());
    };

    let out = match global.output {
        OutputFormat::Table => format!(
            "Uptime: {}\n{}",
            output::format_uptime(data.uptime_seconds()),
            output::render_table(&rows(&inventory))
        ),
        OutputFormat::Plain => rows(&inventory)
            .into_iter()
            .map(|r| r.name)
            .collect::<Vec<_>>()
            .join("\n"),
        format => output::render_json(inventory.as_ref(), format == OutputFormat::JsonCompact),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
