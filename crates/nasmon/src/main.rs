mod cli;
mod commands;
mod error;
mod output;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nasmon_config::{self as config, ConfigError};
use nasmon_core::{DeviceStore, StoreConfig, TlsVerification};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands never touch the backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "nasmon", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let store_config = build_store_config(&cli.global, &cmd)?;
            let store = DeviceStore::new(store_config)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &store, &cli.global).await;
            store.dispose().await;
            result
        }
    }
}

/// Resolve profile + environment + flags into a `StoreConfig`.
fn build_store_config(global: &GlobalOpts, cmd: &Command) -> Result<StoreConfig, CliError> {
    let cfg = config::load_config()?;
    let profile = global.profile.as_deref();

    let resolved = match global.api_base.as_deref() {
        Some(base) => config::resolve_with_api_base(&cfg, profile, Some(base)),
        None => config::resolve_store_config(&cfg, profile),
    };
    let mut store_config = resolved.map_err(|e| match e {
        ConfigError::UnknownProfile { profile } => {
            let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            names.sort_unstable();
            CliError::ProfileNotFound {
                name: profile,
                available: if names.is_empty() {
                    "(none)".into()
                } else {
                    names.join(", ")
                },
            }
        }
        other => other.into(),
    })?;

    if global.insecure {
        store_config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        store_config.timeout = Duration::from_secs(secs);
    }
    if let Command::Watch(args) = cmd {
        if let Some(every) = args.reconnect_every {
            store_config.reconnect_interval = every.max(Duration::from_millis(100));
        }
    }

    Ok(store_config)
}
