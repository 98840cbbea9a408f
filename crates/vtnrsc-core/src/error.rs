// ── Core error types ──
//
// Validation failures are recoverable and surface as `Ok(false)` at the
// boolean manager boundary; everything else propagates as `Err`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::store::StoreError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation ───────────────────────────────────────────────────
    /// A record names a resource that does not exist. `written` counts the
    /// records of the same batch that were already committed before the
    /// failing one; they are not rolled back.
    #[error("{kind} '{id}' references {referenced_kind} '{referenced_id}', which does not exist")]
    MissingReference {
        kind: &'static str,
        id: String,
        referenced_kind: &'static str,
        referenced_id: String,
        written: usize,
    },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("{component} is not open")]
    NotOpen { component: &'static str },

    // ── Store ────────────────────────────────────────────────────────
    #[error(transparent)]
    Store(#[from] StoreError),

    // ── Counter ──────────────────────────────────────────────────────
    #[error("counter '{name}' did not answer within {}ms", timeout.as_millis())]
    CounterTimeout { name: String, timeout: Duration },

    #[error("counter '{name}' increment failed: {reason}")]
    CounterFailed { name: String, reason: String },

    // ── Snapshot ─────────────────────────────────────────────────────
    #[error("snapshot {}: {reason}", path.display())]
    Snapshot { path: PathBuf, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// True for a rejected reference, the one failure the boolean manager
    /// API reports as `false` instead of an error.
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::MissingReference { .. })
    }
}
