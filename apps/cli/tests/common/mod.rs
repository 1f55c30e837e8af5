//! Common test utilities for sync runs against fake stores.
//!
//! Both collaborators are `wiremock` servers:
//! - the Joplin web clipper answers `GET /folders`, `/folders/{id}/notes`
//!   and `/notes/{id}`
//! - AnkiConnect answers `POST /`, matched on the envelope's `action`

#![allow(dead_code)]

pub mod fixtures;

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use joplin_anki_sync::Config;

pub const TOKEN: &str = "test-token";

/// Fake notes store and flashcard store.
pub struct Stores {
    pub joplin: MockServer,
    pub anki: MockServer,
}

impl Stores {
    pub async fn start() -> Self {
        Self {
            joplin: MockServer::start().await,
            anki: MockServer::start().await,
        }
    }

    /// Config pointing at both fakes.
    pub fn config(&self, folders: &[&str]) -> Config {
        let mut config = Config::new(TOKEN, folders.iter().map(|f| f.to_string()).collect());
        config.joplin_origin = self.joplin.uri();
        config.anki_origin = self.anki.uri();
        config.timeout = Duration::from_secs(5);
        config
    }

    pub async fn mount_folders(&self, folders: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/folders"))
            .and(query_param("token", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::page(folders, false)))
            .mount(&self.joplin)
            .await;
    }

    pub async fn mount_notes(&self, folder_id: &str, notes: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(format!("/folders/{}/notes", folder_id)))
            .and(query_param("token", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::page(notes, false)))
            .mount(&self.joplin)
            .await;
    }

    pub async fn mount_body(&self, note_id: &str, body: &str) {
        self.mount_body_expecting(note_id, body, 1).await;
    }

    pub async fn mount_body_expecting(&self, note_id: &str, body: &str, times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/notes/{}", note_id)))
            .and(query_param("fields", "body"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "body": body })))
            .expect(times)
            .mount(&self.joplin)
            .await;
    }

    /// Answer `action` with `response`, expecting exactly `times` calls.
    pub async fn mount_anki(&self, action: &str, response: Value, times: u64) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "action": action })))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .expect(times)
            .mount(&self.anki)
            .await;
    }

    /// Answer `findNotes` for one deck.
    pub async fn mount_deck(&self, deck: &str, note_ids: Vec<u64>) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "action": "findNotes",
                "params": { "query": format!("deck:\"{}\"", deck) }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::anki_ok(json!(note_ids))))
            .mount(&self.anki)
            .await;
    }

    /// Bodies of every AnkiConnect request with the given action.
    pub async fn anki_requests(&self, action: &str) -> Vec<Value> {
        self.anki
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| r.body_json::<Value>().ok())
            .filter(|body| body["action"] == action)
            .collect()
    }
}
