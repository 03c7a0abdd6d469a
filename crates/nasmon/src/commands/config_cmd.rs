//! Config subcommand handlers.

use std::fmt::Write as _;

use nasmon_config::{self as config, Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Human-readable TOML-ish dump of the effective configuration.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let d = &cfg.defaults;
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", d.output);
    let _ = writeln!(out, "color = \"{}\"", d.color);
    let _ = writeln!(out, "insecure = {}", d.insecure);
    let _ = writeln!(out, "timeout = {}", d.timeout);
    let _ = writeln!(out, "reconnect_interval_secs = {}", d.reconnect_interval_secs);
    let _ = writeln!(out, "metrics_window_hours = {}", d.metrics_window_hours);
    let _ = writeln!(out, "detail_window_hours = {}", d.detail_window_hours);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_base = \"{}\"", p.api_base);
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out.trim_end().to_owned()
}

fn validate_url(raw: &str) -> Result<(), CliError> {
    let url = url::Url::parse(raw).map_err(|e| CliError::Validation {
        field: "url".into(),
        reason: format!("{raw}: {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CliError::Validation {
            field: "url".into(),
            reason: format!("expected an http(s) URL, got '{raw}'"),
        });
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(global.output, &cfg, format_config, |c| {
                c.default_profile.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init {
            url,
            name,
            set_default,
        } => {
            validate_url(&url)?;

            let mut cfg = config::load_config_or_default();
            let existing = cfg.profiles.remove(&name);
            cfg.profiles.insert(
                name.clone(),
                Profile {
                    api_base: url,
                    ..existing.unwrap_or_default()
                },
            );
            if set_default || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(name.clone());
            }
            config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!(
                    "Profile '{name}' saved to {}",
                    config::config_path().display()
                );
            }
            Ok(())
        }
    }
}
