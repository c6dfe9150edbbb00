//! Remote store capability and the row types of the two remote tables.
//!
//! Timestamp conventions differ per table and are converted here, at the
//! schema edge:
//! - `notes.updated_at` is a raw sortable number (Unix ms), sent exactly as the
//!   local snapshot stores it and never turned into a calendar type.
//! - `profiles.updated_at` is a real timestamp column, sent as RFC 3339.

mod postgrest;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthSession;
use crate::models::{Note, NoteId, NoteKind, Settings};
use crate::util::{decode_each, deserialize_millis, null_as_default};

pub use postgrest::PostgrestStore;

/// Remote table holding notes and folders.
pub const NOTES_TABLE: &str = "notes";
/// Remote table holding one preferences row per user.
pub const PROFILES_TABLE: &str = "profiles";

#[derive(Debug, Error)]
pub enum RemoteError {
    /// A single-row read matched no row.
    #[error("Remote record not found")]
    NotFound,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Remote API error: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// CRUD over the `notes` and `profiles` tables, on behalf of `session`.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Every note row visible to the session user.
    async fn fetch_notes(&self, session: &AuthSession) -> RemoteResult<Vec<RemoteNote>>;

    /// Insert-or-replace rows by id, in one request.
    async fn upsert_notes(&self, session: &AuthSession, rows: &[RemoteNote]) -> RemoteResult<()>;

    async fn delete_note(&self, session: &AuthSession, id: &NoteId) -> RemoteResult<()>;

    /// The profile row for `user_id`, or [`RemoteError::NotFound`].
    async fn fetch_profile(&self, session: &AuthSession, user_id: &str)
        -> RemoteResult<RemoteProfile>;

    async fn upsert_profile(&self, session: &AuthSession, row: &RemoteProfile) -> RemoteResult<()>;
}

/// A row of the remote `notes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNote {
    pub id: NoteId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(default)]
    pub parent_id: Option<NoteId>,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_trashed: bool,
    /// Unix ms, stored as a plain number
    #[serde(default, deserialize_with = "deserialize_millis")]
    pub updated_at: i64,
}

impl RemoteNote {
    /// Translate a local record into a row owned by `user_id`.
    #[must_use]
    pub fn from_note(note: &Note, user_id: &str) -> Self {
        Self {
            id: note.id.clone(),
            user_id: user_id.to_string(),
            parent_id: note.parent_id.clone(),
            kind: note.kind,
            name: note.name.clone(),
            content: note.content.clone(),
            is_trashed: note.is_trashed,
            updated_at: note.updated_at,
        }
    }
}

/// Decode fetched note rows one by one, dropping (and logging) rows that do
/// not fit the schema so the rest can still be merged.
#[must_use]
pub fn decode_note_rows(rows: Vec<serde_json::Value>) -> Vec<RemoteNote> {
    decode_each(rows, "remote note row").0
}

impl From<RemoteNote> for Note {
    fn from(row: RemoteNote) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            parent_id: row.parent_id,
            name: row.name,
            content: row.content,
            is_trashed: row.is_trashed,
            updated_at: row.updated_at,
        }
    }
}

/// A row of the remote `profiles` table. Every column but `id` may be null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteProfile {
    pub id: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub view_mode: Option<String>,
    #[serde(default)]
    pub daily_goal: Option<i64>,
    #[serde(default)]
    pub stats: Option<serde_json::Value>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RemoteProfile {
    /// Package local settings for upload, stamped with `updated_at`.
    #[must_use]
    pub fn from_settings(user_id: &str, settings: &Settings, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: user_id.to_string(),
            theme: Some(settings.theme.as_str().to_string()),
            view_mode: Some(settings.view_mode.clone()),
            daily_goal: Some(settings.daily_goal),
            stats: Some(settings.stats.clone()),
            updated_at: Some(updated_at),
        }
    }
}
