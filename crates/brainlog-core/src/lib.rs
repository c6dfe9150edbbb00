//! brainlog-core - Core library for BrainLog
//!
//! Offline-first notes: a locally owned snapshot of notes and settings,
//! Supabase adapters for auth and the remote tables, and the sync engine that
//! reconciles the two with last-writer-wins.

pub mod auth;
pub mod config;
pub mod error;
pub mod local;
pub mod models;
pub mod remote;
pub mod session;
pub mod sync;
pub mod ui;
pub mod util;

mod supabase;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use models::{Note, NoteId, NoteKind, Settings, ThemeMode};
pub use sync::SyncEngine;
