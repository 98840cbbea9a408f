//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use vtnrsc_config::ConfigError;
use vtnrsc_core::CoreError;

/// Process exit codes, one per error class.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const UNAVAILABLE: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(vtnrsc::not_found),
        help("Run: vtnrsc {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{kind} '{id}' references {referenced_kind} '{referenced_id}', which does not exist")]
    #[diagnostic(
        code(vtnrsc::missing_reference),
        help(
            "Create the {referenced_kind} first, or check: vtnrsc {list_command}\n\
             {written} earlier record(s) of this batch were written and kept."
        )
    )]
    MissingReference {
        kind: String,
        id: String,
        referenced_kind: String,
        referenced_id: String,
        list_command: String,
        written: usize,
    },

    // ── Store ────────────────────────────────────────────────────────
    #[error("Inventory store unavailable: {reason}")]
    #[diagnostic(code(vtnrsc::store_unavailable))]
    StoreUnavailable { reason: String },

    #[error("Could not read or write snapshot {path}: {reason}")]
    #[diagnostic(
        code(vtnrsc::snapshot),
        help(
            "Move the file aside to start from an empty inventory,\n\
             or run with --ephemeral to skip the snapshot."
        )
    )]
    Snapshot { path: String, reason: String },

    // ── Counter ──────────────────────────────────────────────────────
    #[error("Counter '{name}' did not answer within {millis}ms")]
    #[diagnostic(
        code(vtnrsc::timeout),
        help("Increase the wait with --timeout or defaults.timeout in the config file.")
    )]
    Timeout { name: String, millis: u128 },

    #[error("Counter '{name}' increment failed: {reason}")]
    #[diagnostic(code(vtnrsc::counter_failed))]
    CounterFailed { name: String, reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vtnrsc::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(vtnrsc::config),
        help("Check the file shown by: vtnrsc config path")
    )]
    Config { message: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(vtnrsc::config_exists),
        help("Use --force to overwrite it, or edit it with: vtnrsc config set")
    )]
    ConfigExists { path: String },

    #[error("Internal error: {message}")]
    #[diagnostic(code(vtnrsc::internal))]
    Internal { message: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(vtnrsc::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Could not render output: {message}")]
    #[diagnostic(code(vtnrsc::render))]
    Render { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::MissingReference { .. } | Self::ConfigExists { .. } => exit_code::CONFLICT,
            Self::StoreUnavailable { .. } => exit_code::UNAVAILABLE,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::Config { .. } | Self::Json(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

/// `networks list` for a network, and so on.
fn list_command(kind: &str) -> String {
    match kind {
        "virtual port" => "ports list".into(),
        other => format!("{other}s list"),
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingReference {
                kind,
                id,
                referenced_kind,
                referenced_id,
                written,
            } => CliError::MissingReference {
                kind: kind.into(),
                id,
                referenced_kind: referenced_kind.into(),
                referenced_id,
                list_command: list_command(referenced_kind),
                written,
            },

            CoreError::Store(err) => CliError::StoreUnavailable {
                reason: err.to_string(),
            },

            CoreError::NotOpen { component } => CliError::StoreUnavailable {
                reason: format!("{component} is not open"),
            },

            CoreError::CounterTimeout { name, timeout } => CliError::Timeout {
                name,
                millis: timeout.as_millis(),
            },

            CoreError::CounterFailed { name, reason } => CliError::CounterFailed { name, reason },

            CoreError::Snapshot { path, reason } => CliError::Snapshot {
                path: path.display().to_string(),
                reason,
            },

            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(err) => CliError::Io(err),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn missing_reference_is_a_conflict() {
        let err = CliError::from(CoreError::MissingReference {
            kind: "virtual port",
            id: "p1".into(),
            referenced_kind: "network",
            referenced_id: "net-404".into(),
            written: 2,
        });
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
        match err {
            CliError::MissingReference {
                list_command,
                written,
                ..
            } => {
                assert_eq!(list_command, "networks list");
                assert_eq!(written, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn counter_timeout_has_its_own_exit_code() {
        let err = CliError::from(CoreError::CounterTimeout {
            name: "c1".into(),
            timeout: Duration::from_millis(1500),
        });
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
        assert_eq!(err.to_string(), "Counter 'c1' did not answer within 1500ms");
    }

    #[test]
    fn list_command_for_each_kind() {
        assert_eq!(list_command("network"), "networks list");
        assert_eq!(list_command("subnet"), "subnets list");
        assert_eq!(list_command("virtual port"), "ports list");
    }
}
