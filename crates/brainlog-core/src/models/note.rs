//! Note model

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::util::{deserialize_millis, null_as_default, unix_millis_now};

/// Identifier of a note or folder.
///
/// Ids are opaque strings: new local records get a UUID v7, but rows created
/// by other clients may use any format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Polymorphic tag of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Folder,
    Document,
}

impl NoteKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Document => "document",
        }
    }
}

/// A note or folder in the local snapshot.
///
/// Serialized with the camelCase field names the local snapshot has always
/// used (`parentId`, `isTrashed`, `updatedAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    #[serde(default)]
    pub parent_id: Option<NoteId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_trashed: bool,
    /// Last modification time (Unix ms)
    #[serde(default, deserialize_with = "deserialize_millis")]
    pub updated_at: i64,
}

impl Note {
    /// Create a new document under `parent_id`.
    #[must_use]
    pub fn document(name: impl Into<String>, parent_id: Option<NoteId>) -> Self {
        Self::with_kind(NoteKind::Document, name, parent_id)
    }

    /// Create a new, empty folder under `parent_id`.
    #[must_use]
    pub fn folder(name: impl Into<String>, parent_id: Option<NoteId>) -> Self {
        Self::with_kind(NoteKind::Folder, name, parent_id)
    }

    fn with_kind(kind: NoteKind, name: impl Into<String>, parent_id: Option<NoteId>) -> Self {
        Self {
            id: NoteId::new(),
            kind,
            parent_id,
            name: name.into(),
            content: String::new(),
            is_trashed: false,
            updated_at: unix_millis_now(),
        }
    }

    #[must_use]
    pub const fn is_folder(&self) -> bool {
        matches!(self.kind, NoteKind::Folder)
    }

    /// Stamp the note as modified now.
    ///
    /// The stamp never moves backwards, so an edit made right after a merge
    /// that pulled a row from a fast clock still wins the next comparison.
    pub fn touch(&mut self) {
        self.updated_at = unix_millis_now().max(self.updated_at.saturating_add(1));
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.touch();
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_trashed(&mut self, trashed: bool) {
        self.is_trashed = trashed;
        self.touch();
    }

    pub fn move_to(&mut self, parent_id: Option<NoteId>) {
        self.parent_id = parent_id;
        self.touch();
    }
}
