//! Command dispatch: bridges CLI args -> inventory managers -> output formatting.

pub mod config_cmd;
pub mod counter;
pub mod networks;
pub mod ports;
pub mod subnets;
pub mod util;

use vtnrsc_core::Inventory;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an inventory-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    inventory: &Inventory,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Networks(args) => networks::handle(inventory, args, global),
        Command::Subnets(args) => subnets::handle(inventory, args, global),
        Command::Ports(args) => ports::handle(inventory, args, global),
        Command::Counter(args) => counter::handle(inventory, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal {
            message: "config and completions do not use the inventory".into(),
        }),
    }
}
