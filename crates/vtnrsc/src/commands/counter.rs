//! Counter command handlers.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use vtnrsc_core::{IncrementOutcome, Inventory};

use crate::cli::{CounterArgs, CounterCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct CounterValue {
    name: String,
    value: i64,
    replicated: bool,
}

fn print_value(value: &CounterValue, verb: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(
        &global.output(),
        value,
        |v| format!("{} {verb} {}", v.name, v.value),
        |v| v.value.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    inventory: &Inventory,
    args: CounterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CounterCommand::Increment(target) => {
            // Ctrl-C stops the wait; the increment itself still lands.
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            let watcher = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let outcome = inventory
                .increment_counter(&target.name, target.in_memory, &cancel)
                .await;
            watcher.abort();

            match outcome? {
                IncrementOutcome::Incremented(value) => print_value(
                    &CounterValue {
                        name: target.name,
                        value,
                        replicated: !target.in_memory,
                    },
                    "was incremented to",
                    global,
                ),
                IncrementOutcome::Failed(err) => Err(err.into()),
                IncrementOutcome::Cancelled => {
                    debug!(counter = %target.name, "wait interrupted");
                    Ok(())
                }
            }
        }

        CounterCommand::Get(target) => {
            let counter = inventory.counter(&target.name, target.in_memory)?;
            print_value(
                &CounterValue {
                    value: counter.get(),
                    name: target.name,
                    replicated: counter.is_replicated(),
                },
                "is",
                global,
            )
        }
    }
}
