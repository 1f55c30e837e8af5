//! Client for the Joplin web clipper API.

use std::time::Duration;

use notesync_core::{FolderRecord, NoteRecord};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Result, SyncError};

pub const SERVICE: &str = "Joplin web clipper";

const PAGE_LIMIT: u32 = 100;

/// Listings longer than this many pages are treated as a misbehaving server.
pub const MAX_PAGES: u32 = 1000;

/// One page of a listing endpoint.
#[derive(Debug, Deserialize)]
struct Page<T> {
    items: Vec<T>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct NoteBody {
    #[serde(default)]
    body: String,
}

/// Read-only access to folders and notes.
pub struct JoplinClient {
    client: Client,
    origin: String,
    token: String,
}

impl JoplinClient {
    pub fn new(origin: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::from_reqwest(SERVICE, origin, e))?;

        Ok(Self {
            client,
            origin: origin.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Every folder, all pages.
    pub async fn folders(&self) -> Result<Vec<FolderRecord>> {
        self.get_all("/folders", "id,title,parent_id").await
    }

    /// Notes directly inside a folder, all pages.
    pub async fn folder_notes(&self, folder_id: &str) -> Result<Vec<NoteRecord>> {
        self.get_all(&format!("/folders/{}/notes", folder_id), "id,title")
            .await
    }

    /// Markdown body of a note.
    pub async fn note_body(&self, note_id: &str) -> Result<String> {
        let note: NoteBody = self
            .get(&format!("/notes/{}", note_id), &[("fields", "body".to_string())])
            .await?;
        Ok(note.body)
    }

    async fn get_all<T: DeserializeOwned>(&self, path: &str, fields: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page_number: u32 = 1;

        loop {
            let page: Page<T> = self
                .get(
                    path,
                    &[
                        ("fields", fields.to_string()),
                        ("limit", PAGE_LIMIT.to_string()),
                        ("page", page_number.to_string()),
                    ],
                )
                .await?;

            items.extend(page.items);
            if !page.has_more {
                break;
            }
            if page_number >= MAX_PAGES {
                return Err(SyncError::Pagination {
                    service: SERVICE,
                    path: path.to_string(),
                    pages: page_number,
                });
            }
            page_number += 1;
        }

        tracing::debug!(path, count = items.len(), pages = page_number, "listed");
        Ok(items)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.origin, path);

        let resp = self
            .client
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| SyncError::from_reqwest(SERVICE, &self.origin, e))?;

        if !resp.status().is_success() {
            return Err(SyncError::Http {
                service: SERVICE,
                url,
                status: resp.status().as_u16(),
            });
        }

        resp.json()
            .await
            .map_err(|e| SyncError::from_reqwest(SERVICE, &self.origin, e))
    }
}
