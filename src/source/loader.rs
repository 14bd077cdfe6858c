use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::SourceSchema;
use crate::model::qualified_name;
use crate::util::{AdapterError, Result};

const JSON_PREFIX: &str = "json:";

/// Loads and merges several schema sources into one description.
pub fn load_sources(sources: &[String]) -> Result<SourceSchema> {
    if sources.is_empty() {
        return Err(AdapterError::InvalidSource(
            "No schema sources provided".to_string(),
        ));
    }

    let mut loaded = Vec::with_capacity(sources.len());
    for source in sources {
        loaded.push((source.as_str(), load_source(source)?));
    }

    merge_sources(loaded)
}

/// Loads one source string: a path to a JSON document, optionally prefixed
/// with `json:`.
pub fn load_source(source: &str) -> Result<SourceSchema> {
    let path = source_path(source)?;
    let text = fs::read_to_string(path).map_err(|e| AdapterError::Read {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    let schema: SourceSchema = serde_json::from_str(&text).map_err(|e| AdapterError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    tracing::debug!(source, tables = schema.tables.len(), "loaded schema source");
    Ok(schema)
}

fn source_path(source: &str) -> Result<&str> {
    if let Some(path) = source.strip_prefix(JSON_PREFIX) {
        return Ok(path);
    }

    // A single letter before the colon is a Windows drive, not a prefix.
    if let Some((prefix, _)) = source.split_once(':') {
        if prefix.len() > 1 && prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AdapterError::InvalidSource(format!(
                "Unknown schema source prefix: {source}. \
                 Use 'json:' or a plain path to a JSON schema description."
            )));
        }
    }

    if Path::new(source).as_os_str().is_empty() {
        return Err(AdapterError::InvalidSource("Empty schema source".to_string()));
    }

    Ok(source)
}

fn merge_sources(sources: Vec<(&str, SourceSchema)>) -> Result<SourceSchema> {
    if sources.len() == 1 {
        if let Some((_, schema)) = sources.into_iter().next() {
            return Ok(schema);
        }
        return Err(AdapterError::InvalidSource("No schemas to merge".to_string()));
    }

    let mut merged = SourceSchema::default();
    let mut owners: HashMap<String, String> = HashMap::new();

    for (origin, schema) in sources {
        for table in schema.tables {
            let name = qualified_name(&table.schema, &table.name);
            if let Some(first) = owners.get(&name) {
                return Err(AdapterError::DuplicateSource {
                    table: name,
                    first: first.clone(),
                    second: origin.to_string(),
                });
            }
            owners.insert(name, origin.to_string());
            merged.tables.push(table);
        }
        merged.unsupported.extend(schema.unsupported);
    }

    Ok(merged)
}
