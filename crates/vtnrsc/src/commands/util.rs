//! Shared helpers for command handlers.

use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use vtnrsc_core::{Resource, ResourceManager};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// A `--from-file` payload: one record or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Read and parse a JSON file for `--from-file` flags. Array order is the
/// order records are written in.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let parsed: OneOrMany<T> =
        serde_json::from_str(&contents).map_err(|e| CliError::Validation {
            field: "from-file".into(),
            reason: format!("invalid JSON in {}: {e}", path.display()),
        })?;
    Ok(match parsed {
        OneOrMany::Many(records) => records,
        OneOrMany::One(record) => vec![record],
    })
}

/// Unwrap a flag clap only requires when `--from-file` is absent.
pub fn required<T>(value: Option<T>, flag: &str) -> Result<T, CliError> {
    value.ok_or_else(|| CliError::Validation {
        field: format!("--{flag}"),
        reason: "required unless --from-file is given".into(),
    })
}

/// `network net-1` for one record, `3 networks` for a batch.
fn describe<R: Resource>(records: &[R]) -> String {
    match records {
        [one] => format!("{} {}", R::KIND, one.id()),
        many => format!("{} {}s", many.len(), R::KIND),
    }
}

/// Get one record or fail with a not-found diagnostic.
pub fn get_or_not_found<M: ResourceManager>(
    manager: &M,
    id: &<M::Record as Resource>::Id,
    list_command: &str,
) -> Result<M::Record, CliError> {
    manager.get(id)?.ok_or_else(|| CliError::NotFound {
        resource_type: <M::Record as Resource>::KIND.into(),
        identifier: id.to_string(),
        list_command: list_command.into(),
    })
}

/// Create a batch, reporting the first rejected reference as an error.
pub fn create<M: ResourceManager>(
    manager: &M,
    records: Vec<M::Record>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let what = describe(&records);
    manager.try_create(records)?;
    output::print_status(&format!("Created {what}"), global);
    Ok(())
}

/// Overwrite a batch by id.
pub fn update<M: ResourceManager>(
    manager: &M,
    records: Vec<M::Record>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let what = describe(&records);
    manager.try_update(records)?;
    output::print_status(&format!("Updated {what}"), global);
    Ok(())
}

/// Remove by id; unknown ids are not an error.
pub fn remove<M: ResourceManager>(
    manager: &M,
    ids: Vec<String>,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    <M::Record as Resource>::Id: From<String>,
{
    let ids: Vec<<M::Record as Resource>::Id> = ids.into_iter().map(Into::into).collect();
    manager.remove(&ids)?;
    let what = match ids.as_slice() {
        [one] => format!("{} {one}", <M::Record as Resource>::KIND),
        many => format!("{} {}s", many.len(), <M::Record as Resource>::KIND),
    };
    output::print_status(&format!("Removed {what}"), global);
    Ok(())
}

/// Sort by id so listings are stable between runs.
pub fn sorted<R: Resource>(mut records: Vec<R>) -> Vec<R>
where
    R::Id: Ord,
{
    records.sort_by(|a, b| a.id().cmp(b.id()));
    records
}

/// `-` for empty values in detail views.
pub fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

/// Comma-join a list for table cells.
pub fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
