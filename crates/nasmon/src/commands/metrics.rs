//! Metric time series.

use nasmon_core::{DeviceStore, HistoryType, MetricSample, MetricsQuery};
use tabled::Tabled;

use crate::cli::{GlobalOpts, MetricsArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct SampleRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&MetricSample> for SampleRow {
    fn from(s: &MetricSample) -> Self {
        Self {
            time: s.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            device: s.device_name.clone(),
            label: s.label.clone(),
            value: format!("{:.2}", s.value),
        }
    }
}

/// Build the query: one named device at any granularity, or raw samples
/// for a set of device types.
fn build_query(args: &MetricsArgs, default_hours: u32) -> Result<MetricsQuery, CliError> {
    let history_type = HistoryType::from(args.history);
    let hours = (history_type == HistoryType::Raw).then(|| args.hours.unwrap_or(default_hours));

    let mut query = MetricsQuery {
        history_type,
        hours,
        ..MetricsQuery::default()
    };
    if let Some(device) = &args.device {
        query = query.with_device_name(device.as_str());
    } else if history_type != HistoryType::Raw && args.device_types.is_empty() {
        return Err(CliError::Validation {
            field: "device".into(),
            reason: format!("--history {history_type} needs --device or --type"),
        });
    }
    if let Some(types) = util::device_types(&args.device_types) {
        query = query.with_device_types(&types);
    }
    Ok(query)
}

pub async fn handle(
    store: &DeviceStore,
    args: MetricsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let default_hours = if args.device.is_some() {
        store.config().detail_window_hours
    } else {
        store.config().metrics_window_hours
    };
    let query = build_query(&args, default_hours)?;
    tracing::debug!(?query, "fetching metrics");

    let mut samples = store.backend().get_metrics(&query).await?.data;
    samples.sort_by_key(|s| s.timestamp);
    if let Some(limit) = args.limit {
        let skip = samples.len().saturating_sub(limit);
        samples.drain(..skip);
    }

    let out = output::render_list(global.output, &samples, |s| SampleRow::from(s), |s| {
        format!("{}\t{}\t{}\t{}", s.timestamp.to_rfc3339(), s.device_name, s.label, s.value)
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::{DeviceTypeArg, HistoryArg};
    use nasmon_core::DeviceType;

    fn args() -> MetricsArgs {
        MetricsArgs {
            device: None,
            device_types: Vec::new(),
            history: HistoryArg::Raw,
            hours: None,
            limit: None,
        }
    }

    #[test]
    fn raw_by_type_uses_default_window() {
        let mut a = args();
        a.device_types = vec![DeviceTypeArg::Cpu, DeviceTypeArg::ZfsPool];
        let q = build_query(&a, 1).unwrap();
        assert_eq!(q.hours, Some(1));
        assert_eq!(q.device_types, vec![DeviceType::Cpu, DeviceType::ZfsPool]);
    }

    #[test]
    fn device_history_has_no_hours() {
        let mut a = args();
        a.device = Some("sda".into());
        a.history = HistoryArg::History;
        a.hours = Some(6);
        let q = build_query(&a, 24).unwrap();
        assert_eq!(q.hours, None);
        assert_eq!(q.device_names, vec!["sda".to_owned()]);
    }

    #[test]
    fn rollups_need_a_filter() {
        let mut a = args();
        a.history = HistoryArg::Daily;
        assert!(build_query(&a, 1).is_err());
    }
}
