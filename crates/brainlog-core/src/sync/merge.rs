//! Last-writer-wins reconciliation of the local snapshot with remote rows.

use std::collections::HashMap;

use crate::models::{Note, NoteId};
use crate::remote::RemoteNote;

/// What a merge pass did with the remote rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Remote rows that replaced or added a local record.
    pub pulled: usize,
    /// Remote rows that lost to a local record at least as new.
    pub kept_local: usize,
}

/// Merge `remote` into `local`.
///
/// A remote row wins when no local record has its id, or when its
/// `updated_at` is strictly greater than the local one; ties keep the local
/// record. Output order is the local order followed by remote-only rows in
/// remote order. Running the merge again over its own output and the same
/// remote rows changes nothing.
pub fn merge_notes(local: Vec<Note>, remote: Vec<RemoteNote>) -> (Vec<Note>, MergeStats) {
    let mut merged: Vec<Note> = Vec::with_capacity(local.len() + remote.len());
    let mut index: HashMap<NoteId, usize> = HashMap::with_capacity(merged.capacity());
    let mut stats = MergeStats::default();

    for note in local {
        if let Some(&slot) = index.get(&note.id) {
            merged[slot] = note;
        } else {
            index.insert(note.id.clone(), merged.len());
            merged.push(note);
        }
    }

    for row in remote {
        match index.get(&row.id).copied() {
            Some(slot) if row.updated_at <= merged[slot].updated_at => stats.kept_local += 1,
            Some(slot) => {
                merged[slot] = row.into();
                stats.pulled += 1;
            }
            None => {
                index.insert(row.id.clone(), merged.len());
                merged.push(row.into());
                stats.pulled += 1;
            }
        }
    }

    (merged, stats)
}
