use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{
    BatchItem, BatchResult, ConnectionConfigFile, ConnectionDescriptor, ConnectionEntry,
    ProvisionError, RemoteResourceClient, SERVER_MANAGED_FIELDS, SERVER_MANAGED_ROUTE_FIELDS,
};

/// Parses a connection configuration file: either a bare array of connections
/// or an object with a `connections` array.
pub fn parse_connection_config(contents: &str) -> Result<Vec<ConnectionEntry>, ProvisionError> {
    let value: Value = serde_json::from_str(contents).map_err(|err| {
        ProvisionError::local(format!("invalid JSON in configuration file: {err}"))
    })?;
    let file: ConnectionConfigFile = serde_json::from_value(value).map_err(|_| {
        ProvisionError::local(
            "configuration file must contain an array of connections or an object with a \"connections\" property",
        )
    })?;
    Ok(file.into_entries())
}

/// Validates every entry before anything is submitted; the first bad entry
/// fails the whole batch. An entry's own `vaultID` wins over `default_vault_id`.
pub fn validate_connections(
    entries: &[ConnectionEntry],
    default_vault_id: Option<&str>,
) -> Result<Vec<ConnectionDescriptor>, ProvisionError> {
    if entries.is_empty() {
        return Err(ProvisionError::local(
            "no connections found in configuration file",
        ));
    }
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| validate_entry(index, entry, default_vault_id))
        .collect()
}

fn validate_entry(
    index: usize,
    entry: &ConnectionEntry,
    default_vault_id: Option<&str>,
) -> Result<ConnectionDescriptor, ProvisionError> {
    let name = text_field(entry.name.as_ref(), || {
        ProvisionError::local(format!(
            "connection at index {index} has an invalid field: name (expected a string)"
        ))
    })?
    .ok_or_else(|| {
        ProvisionError::local(format!(
            "connection at index {index} is missing required field: name"
        ))
    })?;
    let missing = |field: &str| {
        ProvisionError::local(format!(
            "connection \"{name}\" (index {index}) is missing required field: {field}"
        ))
    };

    let vault_id = text_field(entry.vault_id.as_ref(), || {
        ProvisionError::local(format!(
            "connection \"{name}\" (index {index}) has an invalid field: vaultID (expected a string)"
        ))
    })?
    .or_else(|| non_empty(default_vault_id))
        .ok_or_else(|| missing("vaultID"))?;

    let routes = match entry.routes.as_ref() {
        Some(Value::Array(routes)) if !routes.is_empty() => routes,
        _ => return Err(missing("routes (non-empty array)")),
    };
    let routes = routes
        .iter()
        .enumerate()
        .map(|(route_index, route)| match route {
            Value::Object(route) => Ok(strip_fields(route, &SERVER_MANAGED_ROUTE_FIELDS)),
            _ => Err(ProvisionError::local(format!(
                "connection \"{name}\" (index {index}) has an invalid route at routes[{route_index}]: expected an object"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ConnectionDescriptor {
        name: name.to_string(),
        vault_id: vault_id.to_string(),
        routes,
        settings: strip_fields(&entry.settings, &SERVER_MANAGED_FIELDS),
    })
}

/// Trimmed text of an optional string field; absent, null and blank are `None`.
fn text_field<'a>(
    value: Option<&'a Value>,
    invalid: impl FnOnce() -> ProvisionError,
) -> Result<Option<&'a str>, ProvisionError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(non_empty(Some(text))),
        Some(_) => Err(invalid()),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn strip_fields(map: &Map<String, Value>, fields: &[&str]) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !fields.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Batch progress reported to the caller of [`create_connections_with`].
#[derive(Debug, Clone, Copy)]
pub enum BatchProgress<'a> {
    /// About to submit the descriptor at `position` (1-based).
    Started {
        position: usize,
        total: usize,
        descriptor: &'a ConnectionDescriptor,
    },
    Finished {
        position: usize,
        total: usize,
        item: &'a BatchItem,
    },
}

pub async fn create_connections<C>(client: &C, descriptors: &[ConnectionDescriptor]) -> BatchResult
where
    C: RemoteResourceClient + ?Sized,
{
    create_connections_with(client, descriptors, |_| {}).await
}

/// Submits each descriptor in order. A failed item is recorded and the loop
/// moves on; `on_progress` sees every attempt before and after the remote call.
pub async fn create_connections_with<C, F>(
    client: &C,
    descriptors: &[ConnectionDescriptor],
    mut on_progress: F,
) -> BatchResult
where
    C: RemoteResourceClient + ?Sized,
    F: FnMut(BatchProgress<'_>),
{
    let total = descriptors.len();
    let mut result = BatchResult::default();
    for (index, descriptor) in descriptors.iter().enumerate() {
        let position = index + 1;
        info!(name = %descriptor.name, position, total, "creating connection");
        on_progress(BatchProgress::Started {
            position,
            total,
            descriptor,
        });
        let item = match client.create_connection(descriptor).await {
            Ok(created) => BatchItem::succeeded(&descriptor.name, created.id),
            Err(err) => {
                warn!(name = %descriptor.name, error = %err, "connection creation failed");
                BatchItem::failed(&descriptor.name, err.to_string())
            }
        };
        on_progress(BatchProgress::Finished {
            position,
            total,
            item: &item,
        });
        result.items.push(item);
    }
    result
}
