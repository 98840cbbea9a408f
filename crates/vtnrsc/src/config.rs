//! CLI configuration: thin wrapper around `vtnrsc_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--data-dir, --ephemeral, etc.).

use std::time::Duration;

use clap::ValueEnum;

use vtnrsc_core::InventoryConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use vtnrsc_config::{
    Config, SNAPSHOT_FILE, config_path, load_config, parse_update_policy, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Fill output and color from the config file where no flag was given.
pub fn apply_defaults(global: &mut GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    if global.output.is_none() {
        global.output = Some(parse_value::<OutputFormat>(
            "defaults.output",
            &cfg.defaults.output,
        )?);
    }
    if global.color.is_none() {
        global.color = Some(parse_value::<ColorMode>(
            "defaults.color",
            &cfg.defaults.color,
        )?);
    }
    Ok(())
}

/// Parse a clap value enum from a config string, naming the field on error.
pub fn parse_value<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|_| {
        let accepted: Vec<String> = T::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value().map(|p| p.get_name().to_owned()))
            .collect();
        CliError::Validation {
            field: field.into(),
            reason: format!("expected one of {}, got '{raw}'", accepted.join(", ")),
        }
    })
}

/// Translate config + global flags into an `InventoryConfig`.
///
/// CLI flag overrides take priority over config values.
pub fn inventory_config(global: &GlobalOpts, cfg: &Config) -> Result<InventoryConfig, CliError> {
    let mut inventory = vtnrsc_config::to_inventory_config(cfg)?;

    if let Some(secs) = global.timeout {
        inventory = inventory.with_counter_timeout(Duration::from_secs(secs));
    }

    // --data-dir relocates the snapshot; it does not turn persistence on
    if global.ephemeral {
        inventory.snapshot_path = None;
    } else if let Some(dir) = &global.data_dir {
        if inventory.snapshot_path.is_some() {
            inventory.snapshot_path = Some(dir.join(SNAPSHOT_FILE));
        }
    }

    Ok(inventory)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["vtnrsc"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["counter", "get", "c1"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_config() {
        let mut cfg = Config::default();
        cfg.store.data_dir = Some(PathBuf::from("/srv/from-config"));

        let inv = inventory_config(&global(&["--data-dir", "/tmp/x", "--timeout", "9"]), &cfg)
            .unwrap();
        assert_eq!(inv.snapshot_path, Some(PathBuf::from("/tmp/x").join(SNAPSHOT_FILE)));
        assert_eq!(inv.counter_timeout, Duration::from_secs(9));
    }

    #[test]
    fn ephemeral_drops_the_snapshot() {
        let inv = inventory_config(&global(&["--ephemeral"]), &Config::default()).unwrap();
        assert_eq!(inv.snapshot_path, None);
    }

    #[test]
    fn data_dir_does_not_enable_persistence() {
        let mut cfg = Config::default();
        cfg.store.persist = false;
        let inv = inventory_config(&global(&["--data-dir", "/tmp/x"]), &cfg).unwrap();
        assert_eq!(inv.snapshot_path, None);
    }

    #[test]
    fn config_defaults_fill_missing_flags() {
        let mut cfg = Config::default();
        cfg.defaults.output = "json-compact".into();

        let mut opts = global(&["--color", "never"]);
        apply_defaults(&mut opts, &cfg).unwrap();
        assert_eq!(opts.output(), OutputFormat::JsonCompact);
        assert_eq!(opts.color(), ColorMode::Never);

        let mut explicit = global(&["-o", "yaml"]);
        apply_defaults(&mut explicit, &cfg).unwrap();
        assert_eq!(explicit.output(), OutputFormat::Yaml);
    }

    #[test]
    fn bad_output_in_config_is_reported() {
        let mut cfg = Config::default();
        cfg.defaults.output = "xml".into();
        let mut opts = global(&[]);
        let err = apply_defaults(&mut opts, &cfg).unwrap_err();
        assert!(err.to_string().contains("defaults.output"));
    }
}
