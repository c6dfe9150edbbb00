//! The owned local snapshot of notes and settings.

use std::io::ErrorKind;

use tokio::sync::Mutex;

use super::{
    BlobStore, DAILY_GOAL_KEY, NOTES_KEY, NOTES_RECOVERY_KEY, SESSION_KEYS, STATS_KEY, THEME_KEY,
    VIEW_MODE_KEY,
};
use crate::error::{Error, Result};
use crate::models::{Note, NoteId, Settings, ThemeMode};
use crate::util::{decode_each, normalize_text_option};

#[derive(Debug, Clone, Default)]
struct LocalState {
    notes: Vec<Note>,
    settings: Settings,
}

/// Single owner of the device's notes and settings.
///
/// Every read and write goes through one async mutex, and each mutation is
/// persisted before it becomes visible in memory: if the blob write fails the
/// in-memory state is left as it was.
pub struct LocalStore<B: BlobStore> {
    blobs: B,
    state: Mutex<LocalState>,
}

impl<B: BlobStore> LocalStore<B> {
    /// Load the snapshot and settings from `blobs`.
    ///
    /// Unparsable persisted values are logged and replaced by defaults.
    pub fn open(blobs: B) -> Result<Self> {
        let notes = load_notes(&blobs)?;
        let settings = load_settings(&blobs)?;
        tracing::debug!("Loaded local snapshot with {} notes", notes.len());
        Ok(Self {
            blobs,
            state: Mutex::new(LocalState { notes, settings }),
        })
    }

    /// Backing medium.
    pub const fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Copy of the current snapshot.
    pub async fn notes(&self) -> Vec<Note> {
        self.state.lock().await.notes.clone()
    }

    /// Find a note by id.
    pub async fn note(&self, id: &NoteId) -> Option<Note> {
        self.state
            .lock()
            .await
            .notes
            .iter()
            .find(|note| &note.id == id)
            .cloned()
    }

    /// Apply `apply` to the snapshot and persist the result atomically.
    pub async fn update_notes<T>(&self, apply: impl FnOnce(&mut Vec<Note>) -> T) -> Result<T> {
        let mut state = self.state.lock().await;
        let mut next = state.notes.clone();
        let output = apply(&mut next);
        self.blobs.write(NOTES_KEY, &serde_json::to_string(&next)?)?;
        state.notes = next;
        Ok(output)
    }

    /// Replace the whole snapshot.
    pub async fn replace_notes(&self, notes: Vec<Note>) -> Result<()> {
        self.update_notes(move |current| *current = notes).await
    }

    /// Insert `note`, or replace the record with the same id in place.
    pub async fn upsert_note(&self, note: Note) -> Result<()> {
        self.update_notes(move |notes| {
            if let Some(existing) = notes.iter_mut().find(|existing| existing.id == note.id) {
                *existing = note;
            } else {
                notes.push(note);
            }
        })
        .await
    }

    /// Remove a note from the snapshot, returning it if it was present.
    pub async fn remove_note(&self, id: &NoteId) -> Result<Option<Note>> {
        self.update_notes(|notes| {
            let index = notes.iter().position(|note| &note.id == id)?;
            Some(notes.remove(index))
        })
        .await
    }

    /// Copy of the current settings.
    pub async fn settings(&self) -> Settings {
        self.state.lock().await.settings.clone()
    }

    /// Apply `apply` to the settings and persist all of them as one unit.
    pub async fn update_settings<T>(&self, apply: impl FnOnce(&mut Settings) -> T) -> Result<T> {
        let mut state = self.state.lock().await;
        let mut next = state.settings.clone();
        let output = apply(&mut next);
        save_settings(&self.blobs, &next)?;
        state.settings = next;
        Ok(output)
    }

    pub async fn save_settings(&self, settings: Settings) -> Result<()> {
        self.update_settings(move |current| *current = settings).await
    }

    /// Erase the session-scoped keys: note snapshot, stats, daily goal and
    /// any recovered records.
    ///
    /// Every key is attempted and the in-memory state is reset even when a
    /// removal fails; the first failure is returned afterwards.
    pub async fn clear_session_data(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut first_error = None;
        for key in SESSION_KEYS {
            if let Err(error) = self.blobs.remove(key) {
                tracing::warn!("Failed to erase local key '{}': {}", key, error);
                first_error.get_or_insert(error);
            }
        }
        let defaults = Settings::default();
        state.notes.clear();
        state.settings.stats = defaults.stats;
        state.settings.daily_goal = defaults.daily_goal;
        first_error.map_or(Ok(()), Err)
    }
}

/// Read `key`, treating bytes that are not valid text as an absent value.
fn read_text(blobs: &impl BlobStore, key: &str) -> Result<Option<String>> {
    match blobs.read(key) {
        Err(Error::Io(error)) if error.kind() == ErrorKind::InvalidData => {
            tracing::warn!("Ignoring undecodable local value '{}': {}", key, error);
            Ok(None)
        }
        other => other,
    }
}

/// Decode the snapshot record by record. Records that fail to decode, or the
/// whole text when it is not a JSON array, are kept under
/// [`NOTES_RECOVERY_KEY`] before the snapshot is next rewritten.
fn load_notes(blobs: &impl BlobStore) -> Result<Vec<Note>> {
    let Some(raw) = read_text(blobs, NOTES_KEY)? else {
        return Ok(Vec::new());
    };
    let records = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(records) => records,
        Err(error) => {
            tracing::warn!("Ignoring unreadable local note snapshot: {}", error);
            stash_unreadable(blobs, &raw);
            return Ok(Vec::new());
        }
    };

    let (notes, rejected) = decode_each::<Note>(records, "local note");
    if !rejected.is_empty() {
        stash_unreadable(blobs, &serde_json::to_string(&rejected)?);
    }
    Ok(notes)
}

fn stash_unreadable(blobs: &impl BlobStore, value: &str) {
    if let Err(error) = blobs.write(NOTES_RECOVERY_KEY, value) {
        tracing::warn!("Failed to keep unreadable note records: {}", error);
    }
}

fn load_settings(blobs: &impl BlobStore) -> Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = normalize_text_option(read_text(blobs, THEME_KEY)?) {
        match raw.parse::<ThemeMode>() {
            Ok(theme) => settings.theme = theme,
            Err(error) => tracing::warn!("Ignoring stored theme: {}", error),
        }
    }

    if let Some(view_mode) = normalize_text_option(read_text(blobs, VIEW_MODE_KEY)?) {
        settings.view_mode = view_mode;
    }

    if let Some(raw) = normalize_text_option(read_text(blobs, DAILY_GOAL_KEY)?) {
        match raw.parse::<i64>() {
            Ok(goal) => settings.daily_goal = goal,
            Err(error) => tracing::warn!("Ignoring stored daily goal '{}': {}", raw, error),
        }
    }

    if let Some(raw) = normalize_text_option(read_text(blobs, STATS_KEY)?) {
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Null) => {}
            Ok(stats) => settings.stats = stats,
            Err(error) => tracing::warn!("Ignoring unreadable stats blob: {}", error),
        }
    }

    Ok(settings)
}

fn save_settings(blobs: &impl BlobStore, settings: &Settings) -> Result<()> {
    blobs.write(THEME_KEY, settings.theme.as_str())?;
    blobs.write(VIEW_MODE_KEY, &settings.view_mode)?;
    blobs.write(DAILY_GOAL_KEY, &settings.daily_goal.to_string())?;
    blobs.write(STATS_KEY, &serde_json::to_string(&settings.stats)?)?;
    Ok(())
}
