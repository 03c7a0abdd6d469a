//! Device registry command handlers.

use nasmon_core::{CoreError, DeviceRecord, DeviceStore, DeviceType, DeviceUpdate};
use tabled::Tabled;

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Monitored")]
    enabled: &'static str,
    #[tabled(rename = "Model")]
    model: String,
}

impl From<&DeviceRecord> for DeviceRow {
    fn from(d: &DeviceRecord) -> Self {
        Self {
            name: d.name.clone(),
            dtype: d.device_type.clone(),
            enabled: if d.enabled { "yes" } else { "no" },
            model: output::field(&d.details, "model"),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    store: &DeviceStore,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { device_type } => {
            let mut devices = store.backend().list_devices().await?.data;
            if let Some(filter) = device_type.map(DeviceType::from) {
                devices.retain(|d| d.device_type == filter.as_ref());
            }
            devices.sort_by(|a, b| a.name.cmp(&b.name));

            let out = output::render_list(
                global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Enable { name } => set_enabled(store, name, true, global).await,
        DevicesCommand::Disable { name } => set_enabled(store, name, false, global).await,
    }
}

async fn set_enabled(
    store: &DeviceStore,
    name: String,
    enabled: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    store
        .backend()
        .update_device(&name, &DeviceUpdate::enabled(enabled))
        .await
        .map_err(|e| match CoreError::from(e) {
            CoreError::NotFound { .. } => CoreError::DeviceNotFound { identifier: name.clone() },
            other => other,
        })?;

    if !global.quiet {
        let state = if enabled { "enabled" } else { "disabled" };
        eprintln!("Monitoring {state} for {name}");
    }
    Ok(())
}
