use crate::infrastructure::{CliError, Result};
use live_lobby_core::{ClientFrame, JoinRequest, LobbyBroadcast, Participant, StartRequest};
use schemars::schema_for;
use serde_json::{Map, Value};
use std::path::Path;

/// JSON schemas of every type that crosses the wire, keyed by type name
pub fn wire_schemas() -> Result<Value> {
    let schemas = [
        ("Participant", serde_json::to_value(schema_for!(Participant))?),
        ("JoinRequest", serde_json::to_value(schema_for!(JoinRequest))?),
        ("StartRequest", serde_json::to_value(schema_for!(StartRequest))?),
        ("ClientFrame", serde_json::to_value(schema_for!(ClientFrame))?),
        ("LobbyBroadcast", serde_json::to_value(schema_for!(LobbyBroadcast))?),
    ];

    Ok(Value::Object(
        schemas
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect::<Map<String, Value>>(),
    ))
}

/// Write one `<Type>.json` per wire type into `dir`
pub fn write_schemas(dir: &Path) -> Result<Vec<String>> {
    if dir.exists() && !dir.is_dir() {
        return Err(CliError::SchemaGeneration(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    std::fs::create_dir_all(dir)?;

    let Value::Object(schemas) = wire_schemas()? else {
        return Err(CliError::SchemaGeneration("unexpected schema layout".to_string()));
    };

    let mut written = Vec::with_capacity(schemas.len());
    for (name, schema) in schemas {
        let path = dir.join(format!("{}.json", name));
        std::fs::write(&path, serde_json::to_string_pretty(&schema)?)?;
        tracing::info!("Wrote schema {}", path.display());
        written.push(name);
    }
    Ok(written)
}
