//! JSON payloads shaped like the Joplin and AnkiConnect responses.

use serde_json::{json, Value};

pub fn folder(id: &str, title: &str, parent_id: &str) -> Value {
    json!({ "id": id, "title": title, "parent_id": parent_id })
}

pub fn note(id: &str, title: &str) -> Value {
    json!({ "id": id, "title": title })
}

/// A single listing page.
pub fn page(items: Vec<Value>, has_more: bool) -> Value {
    json!({ "items": items, "has_more": has_more })
}

/// Entry of a `notesInfo` result for a Basic note.
pub fn note_info(id: u64, front: &str, back: &str) -> Value {
    json!({
        "noteId": id,
        "modelName": "Basic",
        "tags": [],
        "fields": {
            "Front": { "value": front, "order": 0 },
            "Back": { "value": back, "order": 1 }
        },
        "cards": [id + 1000]
    })
}

pub fn anki_ok(result: Value) -> Value {
    json!({ "result": result, "error": null })
}

pub fn anki_err(message: &str) -> Value {
    json!({ "result": null, "error": message })
}
