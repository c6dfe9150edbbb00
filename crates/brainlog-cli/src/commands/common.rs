use brainlog_core::config::SupabaseConfig;
use brainlog_core::local::{FileBlobStore, LocalStore};
use brainlog_core::remote::PostgrestStore;
use brainlog_core::sync::{ProfileOutcome, WriteOutcome};
use brainlog_core::{Note, NoteKind, SyncEngine};
use chrono::Utc;
use serde::Serialize;

use crate::auth::{auth_client, CliAuthClient};
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;
use crate::terminal_ui::TerminalUi;

pub type Engine = SyncEngine<CliAuthClient, PostgrestStore, FileBlobStore, TerminalUi>;

const SHORT_ID_LEN: usize = 13;

/// A resolved, fully configured CLI profile.
#[derive(Debug, Clone)]
pub struct ProfileContext {
    pub name: String,
    pub profile: CliProfile,
    pub supabase: SupabaseConfig,
}

pub fn load_profile(global_profile: Option<&str>) -> Result<ProfileContext, CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let name = config.resolve_profile_name(global_profile);
    let profile = config
        .profile(&name)
        .cloned()
        .ok_or_else(|| CliError::NotConfigured(name.clone()))?;
    let supabase = profile
        .supabase_config()
        .map_err(|error| CliError::Config(error.to_string()))?
        .ok_or_else(|| CliError::NotConfigured(name.clone()))?;
    Ok(ProfileContext {
        name,
        profile,
        supabase,
    })
}

pub fn open_engine(context: &ProfileContext) -> Result<Engine, CliError> {
    let data_dir = context
        .profile
        .data_dir(&context.name)
        .map_err(CliError::Config)?;
    let local = LocalStore::open(FileBlobStore::open(&data_dir)?)?;
    let auth = auth_client(&context.name, &context.supabase)
        .map_err(|error| CliError::Auth(error.to_string()))?;
    let remote = PostgrestStore::new(&context.supabase)
        .map_err(|error| CliError::Config(error.to_string()))?;
    tracing::debug!("Opened local snapshot at {}", data_dir.display());
    Ok(SyncEngine::new(
        auth,
        remote,
        local,
        TerminalUi::new(context.profile.prefers_dark()),
    ))
}

/// Find a note by exact id, falling back to a unique id prefix.
pub fn resolve_note(notes: &[Note], query: &str) -> Result<Note, CliError> {
    let query = normalize_note_identifier(query)?;
    if let Some(note) = notes.iter().find(|note| note.id.as_str() == query) {
        return Ok(note.clone());
    }

    let matches = notes
        .iter()
        .filter(|note| note.id.as_str().starts_with(&query))
        .collect::<Vec<_>>();
    match matches.as_slice() {
        [] => Err(CliError::NoteNotFound(query)),
        [note] => Ok((*note).clone()),
        _ => {
            let options = matches
                .iter()
                .take(3)
                .map(|note| short_id(note))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_name(name: &str) -> Result<String, CliError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyName)
    } else {
        Ok(trimmed.to_string())
    }
}

/// The parent must exist and be a folder.
pub fn resolve_parent(notes: &[Note], query: &str) -> Result<Note, CliError> {
    let parent = resolve_note(notes, query)?;
    if parent.is_folder() {
        Ok(parent)
    } else {
        Err(CliError::InvalidParent(parent.id.to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub name: String,
    pub parent_id: Option<String>,
    pub preview: String,
    pub is_trashed: bool,
    pub updated_at: i64,
    pub relative_time: String,
}

/// Visible notes, most recently updated first.
pub fn listed_notes(mut notes: Vec<Note>, include_trashed: bool) -> Vec<Note> {
    notes.retain(|note| include_trashed || !note.is_trashed);
    notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    notes
}

pub fn short_id(note: &Note) -> String {
    note.id.as_str().chars().take(SHORT_ID_LEN).collect()
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .iter()
        .map(|note| {
            let marker = if note.is_folder() { "/" } else { " " };
            let name = format!("{}{marker}", truncate(&note.name, 30));
            let relative_time = format_relative_time(note.updated_at, now_ms);
            let mut line = format!(
                "{:<13}  {name:<31}  {:<40}  {relative_time}",
                short_id(note),
                note_preview(note, 40)
            );
            if note.is_trashed {
                line.push_str("  [trashed]");
            }
            line.trim_end().to_string()
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    NoteListItem {
        id: note.id.to_string(),
        kind: note.kind,
        name: note.name.clone(),
        parent_id: note.parent_id.as_ref().map(ToString::to_string),
        preview: note_preview(note, 80),
        is_trashed: note.is_trashed,
        updated_at: note.updated_at,
        relative_time: format_relative_time(note.updated_at, now_ms),
    }
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&collapsed, max_chars)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = text.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn describe_write(outcome: &WriteOutcome) -> String {
    match outcome {
        WriteOutcome::SignedOut => "saved locally (not signed in)".to_string(),
        WriteOutcome::Empty => "nothing to upload".to_string(),
        WriteOutcome::Written { rows: 1 } => "synced".to_string(),
        WriteOutcome::Written { rows } => format!("synced {rows} rows"),
        WriteOutcome::Failed { reason } => format!("saved locally; remote write failed: {reason}"),
    }
}

pub fn describe_profile(outcome: &ProfileOutcome) -> String {
    match outcome {
        ProfileOutcome::SignedOut => "not signed in".to_string(),
        ProfileOutcome::Applied => "applied remote profile".to_string(),
        ProfileOutcome::Bootstrapped => "created remote profile from local settings".to_string(),
        ProfileOutcome::Pushed => "pushed".to_string(),
        ProfileOutcome::Failed { reason } => format!("failed: {reason}"),
    }
}
