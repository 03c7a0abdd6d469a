//! Latest values per device.

use nasmon_core::{DeviceStore, LatestValues};
use tabled::Tabled;

use crate::cli::{GlobalOpts, LatestArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Tabled)]
pub struct LatestRow {
    #[tabled(rename = "Device")]
    pub device: String,
    #[tabled(rename = "Label")]
    pub label: String,
    #[tabled(rename = "Value")]
    pub value: f64,
}

impl LatestRow {
    /// `device.label=value`
    pub fn plain(&self) -> String {
        format!("{}.{}={}", self.device, self.label, self.value)
    }
}

/// Flatten to one row per (device, label), sorted.
pub fn flatten(values: &LatestValues) -> Vec<LatestRow> {
    let mut rows: Vec<LatestRow> = values
        .iter()
        .flat_map(|(device, labels)| {
            labels.iter().map(move |(label, value)| LatestRow {
                device: device.clone(),
                label: label.clone(),
                value: *value,
            })
        })
        .collect();
    rows.sort_by(|a, b| (&a.device, &a.label).cmp(&(&b.device, &b.label)));
    rows
}

pub async fn handle(
    store: &DeviceStore,
    args: &LatestArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let types = util::device_types(&args.device_types);
    let values = store.backend().get_latest(types.as_deref()).await?.data;

    let out = match global.output {
        OutputFormat::Table => output::render_table(&flatten(&values)),
        OutputFormat::Plain => flatten(&values)
            .iter()
            .map(LatestRow::plain)
            .collect::<Vec<_>>()
            .join("\n"),
        format => output::render_json(&values, format == OutputFormat::JsonCompact),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
