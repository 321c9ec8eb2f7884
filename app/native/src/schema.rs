//! JSON Schema generation for the Fences configuration file.

use crate::config::FencesConfig;

const SCHEMA_ID: &str = "https://raw.githubusercontent.com/fences-app/fences/main/fences.schema.json";

/// Generates a JSON Schema for the configuration.
///
/// The schema includes every option with its type, description, and default.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(FencesConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert("$id".to_string(), serde_json::json!(SCHEMA_ID));
    }

    schema
}

/// Returns the schema as pretty-printed JSON.
#[must_use]
pub fn print_schema() -> String {
    let schema = generate_schema();
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
