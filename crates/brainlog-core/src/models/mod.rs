//! Data models for BrainLog

mod note;
mod settings;

pub use note::{Note, NoteId, NoteKind};
pub use settings::{ResolvedTheme, Settings, ThemeMode, DEFAULT_VIEW_MODE};
