use serde_json::{Map, Value, json};

/// Build a `{"fields": {...}}` update document.
///
/// `description` and `labels` are layered on top of `fields`, so they win on conflict. Labels
/// replace the issue's whole label list. Returns `None` when there is nothing to update.
#[must_use]
pub fn fields_document(
    mut fields: Map<String, Value>,
    description: Option<String>,
    labels: Vec<String>,
) -> Option<Value> {
    if let Some(description) = description {
        fields.insert("description".to_string(), Value::String(description));
    }
    if !labels.is_empty() {
        fields.insert("labels".to_string(), json!(labels));
    }
    if fields.is_empty() {
        return None;
    }
    Some(json!({ "fields": fields }))
}
