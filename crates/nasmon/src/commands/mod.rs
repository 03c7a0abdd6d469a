//! Command dispatch: bridges CLI args -> store / transport -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod host;
pub mod inventory;
pub mod latest;
pub mod metrics;
pub mod settings;
pub mod system;
pub mod util;
pub mod watch;

use nasmon_core::DeviceStore;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    store: &DeviceStore,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Inventory => inventory::handle(store, global).await,
        Command::Settings => settings::handle(store, global).await,
        Command::Metrics(args) => metrics::handle(store, args, global).await,
        Command::Latest(args) => latest::handle(store, &args, global).await,
        Command::Devices(args) => devices::handle(store, args, global).await,
        Command::System(args) => system::handle(store, &args, global).await,
        Command::Host(args) => host::handle(store, &args, global).await,
        Command::Watch(args) => watch::handle(store, &args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
