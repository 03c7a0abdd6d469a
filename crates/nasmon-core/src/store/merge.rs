// ── Cache merge logic ──
//
// Pure functions applied to cache snapshots. Time-series samples are
// unioned per device; latest values are overwritten per device.

use std::collections::HashMap;

use chrono::TimeDelta;
use nasmon_api::{LatestValues, MetricSample};

/// Per-device metric sequences, each ordered by timestamp.
pub type MetricsByDevice = HashMap<String, Vec<MetricSample>>;

/// Group samples by `device_name`, preserving arrival order within a device.
pub(crate) fn group_by_device(samples: Vec<MetricSample>) -> MetricsByDevice {
    let mut grouped: MetricsByDevice = HashMap::new();
    for sample in samples {
        grouped
            .entry(sample.device_name.clone())
            .or_default()
            .push(sample);
    }
    grouped
}

/// Union `incoming` into `cached`, device by device.
///
/// A sample is identified by `(label, timestamp)`. An incoming sample with
/// a key already cached replaces it; the result holds each key once, ordered
/// by timestamp. Each merged series is then trimmed to `window` ending at
/// its newest sample, so repeated polls keep it bounded. Devices absent
/// from `incoming` are untouched.
pub(crate) fn merge_metrics(
    cached: &mut MetricsByDevice,
    incoming: MetricsByDevice,
    window: TimeDelta,
) {
    for (device, samples) in incoming {
        let series = cached.entry(device).or_default();
        merge_series(series, samples);
        prune_series(series, window);
    }
}

fn merge_series(series: &mut Vec<MetricSample>, incoming: Vec<MetricSample>) {
    let mut index: HashMap<(String, i64), usize> = series
        .iter()
        .enumerate()
        .map(|(i, s)| (sample_key(s), i))
        .collect();

    for sample in incoming {
        let key = sample_key(&sample);
        if let Some(&i) = index.get(&key) {
            series[i] = sample;
        } else {
            index.insert(key, series.len());
            series.push(sample);
        }
    }

    // Stable: equal timestamps keep label arrival order.
    series.sort_by_key(|s| s.timestamp);
}

/// Drop samples at or before `newest - window`. Expects `series` sorted.
fn prune_series(series: &mut Vec<MetricSample>, window: TimeDelta) {
    let Some(newest) = series.last().map(|s| s.timestamp) else {
        return;
    };
    let cutoff = newest - window;
    series.retain(|s| s.timestamp > cutoff);
}

fn sample_key(sample: &MetricSample) -> (String, i64) {
    (
        sample.label.clone(),
        sample.timestamp.timestamp_nanos_opt().unwrap_or(i64::MAX),
    )
}

/// Overwrite cached latest values for every device in `incoming`.
///
/// Devices absent from `incoming` keep their stale entries.
pub(crate) fn merge_latest(cached: &mut LatestValues, incoming: LatestValues) {
    cached.extend(incoming);
}
