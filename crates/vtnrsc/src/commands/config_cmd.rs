//! Config subcommand handlers.

use std::path::PathBuf;

use crate::cli::{ColorMode, ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

const KEYS: &str = "defaults.output, defaults.color, defaults.timeout, store.persist, \
                    store.data_dir, store.update_policy";

fn invalid(field: &str, reason: &str) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Apply one `key = value` assignment, validating the value.
fn set_value(cfg: &mut Config, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "defaults.output" => {
            config::parse_value::<OutputFormat>(key, &value)?;
            cfg.defaults.output = value;
        }
        "defaults.color" => {
            config::parse_value::<ColorMode>(key, &value)?;
            cfg.defaults.color = value;
        }
        "defaults.timeout" => {
            cfg.defaults.timeout = value
                .parse()
                .map_err(|_| invalid(key, "must be a number (seconds)"))?;
        }
        "store.persist" => {
            cfg.store.persist = value
                .parse()
                .map_err(|_| invalid(key, "must be 'true' or 'false'"))?;
        }
        // An empty value falls back to the platform data directory
        "store.data_dir" => {
            cfg.store.data_dir = (!value.is_empty()).then(|| PathBuf::from(value));
        }
        "store.update_policy" => {
            config::parse_update_policy(&value)?;
            cfg.store.update_policy = value;
        }
        other => {
            return Err(invalid(
                other,
                &format!("unknown config key '{other}'. Valid keys: {KEYS}"),
            ));
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let written = config::save_config(&Config::default())?;
            output::print_status(&format!("Wrote {}", written.display()), global);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let text = toml::to_string_pretty(&cfg).map_err(|e| CliError::Render {
                message: e.to_string(),
            })?;
            let out = output::render_single(
                &global.output(),
                &cfg,
                |_| text.trim_end().to_owned(),
                |_| config::config_path().display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            set_value(&mut cfg, &key, value)?;
            config::save_config(&cfg)?;
            output::print_status(&format!("Set {key}"), global);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
