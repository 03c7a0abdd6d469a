//! Shared helpers for command handlers.

use std::io::IsTerminal;

use nasmon_core::{CONNECT_ERROR, DeviceStore, DeviceType};

use crate::cli::DeviceTypeArg;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Convert repeated `--type` flags; empty means "all types".
pub fn device_types(args: &[DeviceTypeArg]) -> Option<Vec<DeviceType>> {
    if args.is_empty() {
        None
    } else {
        Some(args.iter().copied().map(DeviceType::from).collect())
    }
}

/// Fail with a connection error if the last store call took it offline.
pub fn ensure_connected(store: &DeviceStore) -> Result<(), CliError> {
    if store.data().is_connected() {
        return Ok(());
    }
    let reason = store
        .data()
        .error()
        .unwrap_or_else(|| CONNECT_ERROR.to_owned());
    Err(CliError::ConnectionFailed {
        url: store.config().api_base.to_string(),
        source: reason.into(),
    })
}
