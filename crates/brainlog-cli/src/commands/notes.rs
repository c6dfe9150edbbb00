//! Note mutations: local snapshot first, then the matching remote write.

use brainlog_core::{Note, NoteId};

use crate::commands::common::{
    describe_write, format_note_lines, listed_notes, normalize_name, note_to_list_item,
    resolve_note, resolve_parent, short_id, Engine, NoteListItem,
};
use crate::error::CliError;

pub async fn run_add(
    engine: &Engine,
    name: &str,
    folder: bool,
    parent: Option<&str>,
    content: Option<String>,
) -> Result<(), CliError> {
    let name = normalize_name(name)?;
    let notes = engine.local().notes().await;
    let parent_id = parent
        .map(|query| resolve_parent(&notes, query).map(|parent| parent.id))
        .transpose()?;

    let note = if folder {
        Note::folder(name, parent_id)
    } else {
        let mut note = Note::document(name, parent_id);
        if let Some(content) = content {
            note.set_content(content);
        }
        note
    };

    engine.local().upsert_note(note.clone()).await?;
    let outcome = engine.push_item(&note).await;
    println!(
        "Created {} {} ({})",
        note.kind.as_str(),
        note.id,
        describe_write(&outcome)
    );
    Ok(())
}

pub async fn run_list(engine: &Engine, include_trashed: bool, as_json: bool) -> Result<(), CliError> {
    let notes = listed_notes(engine.local().notes().await, include_trashed);

    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if notes.is_empty() {
        println!("No notes yet.");
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
    }

    Ok(())
}

#[derive(Debug, Default)]
pub struct NoteEdit {
    pub name: Option<String>,
    pub content: Option<String>,
    pub parent: Option<String>,
    pub move_to_root: bool,
}

impl NoteEdit {
    const fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none() && self.parent.is_none() && !self.move_to_root
    }
}

/// Apply `edit` to `note`, resolving names and parents against `notes`.
pub fn apply_edit(notes: &[Note], note: &mut Note, edit: NoteEdit) -> Result<(), CliError> {
    if edit.is_empty() {
        return Err(CliError::NothingToChange);
    }

    if let Some(name) = edit.name {
        note.rename(normalize_name(&name)?);
    }
    if let Some(content) = edit.content {
        note.set_content(content);
    }
    if edit.move_to_root {
        note.move_to(None);
    } else if let Some(query) = edit.parent {
        let parent = resolve_parent(notes, &query)?;
        if parent.id == note.id {
            return Err(CliError::InvalidParent(parent.id.to_string()));
        }
        note.move_to(Some(parent.id));
    }
    Ok(())
}

pub async fn run_edit(engine: &Engine, id: &str, edit: NoteEdit) -> Result<(), CliError> {
    let notes = engine.local().notes().await;
    let mut note = resolve_note(&notes, id)?;
    apply_edit(&notes, &mut note, edit)?;

    engine.local().upsert_note(note.clone()).await?;
    let outcome = engine.push_item(&note).await;
    println!("Updated {} ({})", note.id, describe_write(&outcome));
    Ok(())
}

pub async fn run_set_trashed(engine: &Engine, id: &str, trashed: bool) -> Result<(), CliError> {
    let notes = engine.local().notes().await;
    let mut note = resolve_note(&notes, id)?;
    note.set_trashed(trashed);

    engine.local().upsert_note(note.clone()).await?;
    let outcome = engine.push_item(&note).await;
    let verb = if trashed { "Trashed" } else { "Restored" };
    println!("{verb} {} ({})", short_id(&note), describe_write(&outcome));
    Ok(())
}

pub async fn run_delete(engine: &Engine, id: &str) -> Result<(), CliError> {
    let notes = engine.local().notes().await;
    let note_id: NoteId = resolve_note(&notes, id)?.id;

    let removed = engine
        .local()
        .remove_note(&note_id)
        .await?
        .ok_or_else(|| CliError::NoteNotFound(note_id.to_string()))?;
    let outcome = engine.delete_item(&removed.id).await;
    println!("Deleted {} ({})", removed.id, describe_write(&outcome));
    Ok(())
}
