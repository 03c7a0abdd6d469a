//! System info command handler.

use nasmon_core::DeviceStore;
use serde_json::Value;

use crate::cli::{GlobalOpts, SystemArgs, SystemCommand};
use crate::error::CliError;
use crate::output;

/// One `key: value` line per top-level field; nested values as compact JSON.
fn detail(info: &Value) -> String {
    let Some(fields) = info.as_object() else {
        return output::value_text(info);
    };
    let width = fields.keys().map(String::len).max().unwrap_or(0) + 1;
    fields
        .iter()
        .map(|(key, value)| {
            let label = format!("{key}:");
            format!("{label:<width$} {}", output::value_text(value))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle(
    store: &DeviceStore,
    args: &SystemArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SystemCommand::Info => {
            let info = store.backend().get_system_info().await?.data;
            let out = output::render_single(global.output, &info, detail, |v| {
                output::field(v, "hostname")
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_aligns_keys() {
        let info = json!({"hostname": "nas", "os": "Debian"});
        assert_eq!(detail(&info), "hostname: nas\nos:       Debian");
    }
}
