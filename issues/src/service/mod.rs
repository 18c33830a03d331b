pub mod change;
pub mod filter;
pub mod issue;

use serde_json::Value;

/// Renders a body `_id` for echoing back. Non-string ids are kept in their
/// JSON form and later fail to parse as an ObjectId.
pub(crate) fn id_text(id: Value) -> String {
    match id {
        Value::String(id) => id,
        other => other.to_string(),
    }
}
