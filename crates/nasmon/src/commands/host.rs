//! Host power actions.

use nasmon_core::DeviceStore;

use crate::cli::{GlobalOpts, HostArgs, HostCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    store: &DeviceStore,
    args: &HostArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let host = store.config().api_base.host_str().unwrap_or("the NAS host").to_owned();

    let (prompt, action) = match args.command {
        HostCommand::Reboot => (format!("Reboot {host}?"), "host reboot"),
        HostCommand::Poweroff => (format!("Power off {host}?"), "host poweroff"),
    };
    if !util::confirm(&prompt, action, global.yes)? {
        return Ok(());
    }

    match args.command {
        HostCommand::Reboot => store.reboot_host().await?,
        HostCommand::Poweroff => store.shutdown_host().await?,
    }

    if !global.quiet {
        eprintln!("{action} requested for {host}");
    }
    Ok(())
}
