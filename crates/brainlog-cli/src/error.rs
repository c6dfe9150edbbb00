use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] brainlog_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("{0}")]
    AmbiguousNoteId(String),
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Note name cannot be empty")]
    EmptyName,
    #[error("Nothing to change; pass at least one option")]
    NothingToChange,
    #[error("Parent {0} is not a folder")]
    InvalidParent(String),
    #[error(
        "Profile '{0}' is not configured. Run `brainlog config init --supabase-url <URL> --supabase-anon-key <KEY>` first."
    )]
    NotConfigured(String),
}
