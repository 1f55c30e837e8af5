//! Client for the AnkiConnect add-on.
//!
//! Every call is a POST of `{action, version, params}` to the add-on's single
//! endpoint, answered with `{result, error}`.

use std::collections::HashMap;
use std::time::Duration;

use notesync_core::{CardUpdate, ExistingCard, NewCard};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Result, SyncError};

pub const SERVICE: &str = "AnkiConnect";

const API_VERSION: u32 = 6;
const FRONT: &str = "Front";
const BACK: &str = "Back";

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    action: &'a str,
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Turn a non-null `error` into a [`SyncError::Anki`].
    pub fn into_result(self, action: &str) -> Result<Option<T>> {
        match self.error {
            Some(message) => Err(SyncError::Anki {
                action: action.to_string(),
                message,
            }),
            None => Ok(self.result),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Field {
    value: String,
}

/// Entry of a `notesInfo` result. Unknown ids come back as `{}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteInfo {
    note_id: Option<u64>,
    #[serde(default)]
    fields: HashMap<String, Field>,
}

impl NoteInfo {
    fn into_card(mut self) -> Option<ExistingCard> {
        let id = self.note_id?;
        let mut field = |name: &str| self.fields.remove(name).map(|f| f.value).unwrap_or_default();
        Some(ExistingCard {
            id,
            front: field(FRONT),
            back: field(BACK),
        })
    }
}

/// Access to one Anki profile through AnkiConnect.
pub struct AnkiClient {
    client: Client,
    origin: String,
    model_name: String,
}

impl AnkiClient {
    pub fn new(origin: &str, model_name: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::from_reqwest(SERVICE, origin, e))?;

        Ok(Self {
            client,
            origin: origin.trim_end_matches('/').to_string(),
            model_name: model_name.to_string(),
        })
    }

    /// API version of the add-on; used as a reachability check.
    pub async fn version(&self) -> Result<u32> {
        Ok(self.request("version", None).await?.unwrap_or_default())
    }

    pub async fn find_notes(&self, query: &str) -> Result<Vec<u64>> {
        let params = json!({ "query": query });
        Ok(self.request("findNotes", Some(params)).await?.unwrap_or_default())
    }

    /// Fetch the Front/Back fields of many notes in one request.
    pub async fn notes_info(&self, note_ids: &[u64]) -> Result<Vec<ExistingCard>> {
        if note_ids.is_empty() {
            return Ok(Vec::new());
        }

        let params = json!({ "notes": note_ids });
        let notes: Vec<NoteInfo> = self
            .request("notesInfo", Some(params))
            .await?
            .unwrap_or_default();

        Ok(notes.into_iter().filter_map(NoteInfo::into_card).collect())
    }

    /// Every card currently in `deck` or its subdecks.
    pub async fn deck_cards(&self, deck: &str) -> Result<Vec<ExistingCard>> {
        let ids = self.find_notes(&deck_query(deck)).await?;
        tracing::debug!(deck, count = ids.len(), "found notes");
        self.notes_info(&ids).await
    }

    /// Add cards in one batch. Returns the new note id per card, or `None`
    /// where Anki refused it.
    pub async fn add_notes(&self, cards: &[NewCard]) -> Result<Vec<Option<u64>>> {
        if cards.is_empty() {
            return Ok(Vec::new());
        }

        let notes: Vec<serde_json::Value> = cards
            .iter()
            .map(|card| {
                json!({
                    "deckName": card.deck,
                    "modelName": self.model_name,
                    "fields": { FRONT: card.front, BACK: card.back },
                })
            })
            .collect();

        let params = json!({ "notes": notes });
        Ok(self.request("addNotes", Some(params)).await?.unwrap_or_default())
    }

    pub async fn update_note(&self, update: &CardUpdate) -> Result<()> {
        let params = json!({
            "note": {
                "id": update.id,
                "fields": { FRONT: update.front, BACK: update.back },
            }
        });
        self.request::<serde_json::Value>("updateNote", Some(params))
            .await?;
        Ok(())
    }

    pub async fn delete_notes(&self, note_ids: &[u64]) -> Result<()> {
        if note_ids.is_empty() {
            return Ok(());
        }

        let params = json!({ "notes": note_ids });
        self.request::<serde_json::Value>("deleteNotes", Some(params))
            .await?;
        Ok(())
    }

    async fn request<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Option<serde_json::Value>,
    ) -> Result<Option<T>> {
        let body = Envelope {
            action,
            version: API_VERSION,
            params,
        };

        let resp = self
            .client
            .post(&self.origin)
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::from_reqwest(SERVICE, &self.origin, e))?;

        if !resp.status().is_success() {
            return Err(SyncError::Http {
                service: SERVICE,
                url: self.origin.clone(),
                status: resp.status().as_u16(),
            });
        }

        let response: ApiResponse<T> = resp
            .json()
            .await
            .map_err(|e| SyncError::from_reqwest(SERVICE, &self.origin, e))?;

        response.into_result(action)
    }
}

/// Anki search query matching a deck and its subdecks.
pub fn deck_query(deck: &str) -> String {
    format!("deck:\"{}\"", deck.replace('\\', "\\\\").replace('"', "\\\""))
}
