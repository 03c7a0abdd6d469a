//! Backend dashboard settings.

use nasmon_core::{DeviceStore, DeviceType, FrontendConfig};
use tabled::Tabled;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct IntervalRow {
    #[tabled(rename = "Device Type")]
    device_type: String,
    #[tabled(rename = "Poll Interval")]
    interval: String,
}

#[derive(Tabled)]
struct LevelRow {
    #[tabled(rename = "SMART Level")]
    level: String,
    #[tabled(rename = "Meaning")]
    meaning: String,
}

fn detail(cfg: &FrontendConfig) -> String {
    let intervals: Vec<IntervalRow> = DeviceType::ALL
        .iter()
        .map(|t| IntervalRow {
            device_type: t.to_string(),
            interval: cfg
                .interval_secs(*t)
                .map_or_else(|| "not polled".into(), |s| format!("{s}s")),
        })
        .collect();

    let mut levels: Vec<LevelRow> = cfg
        .smart_status_levels
        .iter()
        .map(|(level, meaning)| LevelRow {
            level: level.clone(),
            meaning: meaning.clone(),
        })
        .collect();
    levels.sort_by(|a, b| a.level.cmp(&b.level));

    let mut out = vec![output::render_table(&intervals)];
    if !levels.is_empty() {
        out.push(output::render_table(&levels));
    }
    if let Some(points) = cfg.chart_history_points {
        out.push(format!("Chart history points: {points}"));
    }
    if let Some(hours) = cfg.raw_metrics_hours {
        out.push(format!("Raw metrics window:   {hours}h"));
    }
    out.join("\n")
}

pub async fn handle(store: &DeviceStore, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = store.backend().get_config().await?.data;
    let out = match global.output {
        OutputFormat::Plain => DeviceType::ALL
            .iter()
            .filter_map(|t| cfg.interval_secs(*t).map(|s| format!("{t}={s}")))
            .collect::<Vec<_>>()
            .join("\n"),
        format => output::render_single(format, &cfg, detail, |_| String::new()),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
