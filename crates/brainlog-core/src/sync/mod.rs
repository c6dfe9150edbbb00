//! Sync engine: reconciles the local snapshot with the remote tables.
//!
//! Remote failures never abort an operation. They are logged and reported in
//! the returned outcome; only local persistence errors come back as `Err`.

mod merge;
mod profile;

use crate::auth::{AuthProvider, AuthSession};
use crate::error::Result;
use crate::local::{BlobStore, LocalStore};
use crate::models::{Note, NoteId};
use crate::remote::{RemoteNote, RemoteStore};
use crate::ui::UiContext;

pub use merge::{merge_notes, MergeStats};
pub use profile::ProfileOutcome;

/// Result of a remote write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Nobody is signed in; nothing was sent.
    SignedOut,
    /// There was nothing to send.
    Empty,
    Written { rows: usize },
    Failed { reason: String },
}

/// Result of [`SyncEngine::upload_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    pub notes: WriteOutcome,
    /// Profile push that follows a note upload; `None` when no upload ran.
    pub profile: Option<ProfileOutcome>,
}

impl BackupReport {
    /// Whether everything that needed uploading reached the remote store.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        match (&self.notes, &self.profile) {
            (WriteOutcome::Empty, None) => true,
            (WriteOutcome::Written { .. }, Some(profile)) => profile.is_success(),
            _ => false,
        }
    }
}

/// Result of [`SyncEngine::sync`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No session could be resolved; nothing was touched.
    SignedOut,
    Completed(SyncReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Notes in the snapshot after the merge.
    pub total: usize,
    pub merge: MergeStats,
    /// Set when the remote notes could not be read and the merge ran against
    /// an empty remote list.
    pub remote_error: Option<String>,
    pub profile: ProfileOutcome,
}

/// Owns the local store and drives the auth, remote and UI capabilities.
pub struct SyncEngine<A, R, B, U>
where
    B: BlobStore,
{
    auth: A,
    remote: R,
    local: LocalStore<B>,
    ui: U,
}

impl<A, R, B, U> SyncEngine<A, R, B, U>
where
    A: AuthProvider,
    R: RemoteStore,
    B: BlobStore,
    U: UiContext,
{
    pub const fn new(auth: A, remote: R, local: LocalStore<B>, ui: U) -> Self {
        Self {
            auth,
            remote,
            local,
            ui,
        }
    }

    pub const fn auth(&self) -> &A {
        &self.auth
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    pub const fn local(&self) -> &LocalStore<B> {
        &self.local
    }

    pub const fn ui(&self) -> &U {
        &self.ui
    }

    /// Resolve the signed-in session; auth failures count as signed out.
    async fn session(&self) -> Option<AuthSession> {
        match self.auth.current_session().await {
            Ok(session) => session,
            Err(error) => {
                tracing::warn!("Could not resolve auth session: {}", error);
                None
            }
        }
    }

    /// Pull remote notes, merge them into the snapshot, then sync the profile.
    ///
    /// The remote read happens before the snapshot lock is taken; the merge
    /// and the write run under the lock so concurrent local edits are applied
    /// either before or after the merge, never lost.
    pub async fn sync(&self) -> Result<SyncOutcome> {
        let Some(session) = self.session().await else {
            tracing::debug!("Skipping sync: not signed in");
            return Ok(SyncOutcome::SignedOut);
        };

        let (rows, remote_error) = match self.remote.fetch_notes(&session).await {
            Ok(rows) => (rows, None),
            Err(error) => {
                tracing::error!("Notes sync fetch failed: {}", error);
                (Vec::new(), Some(error.to_string()))
            }
        };
        let fetched = rows.len();

        let (merge, total) = self
            .local
            .update_notes(|notes| {
                let (merged, stats) = merge_notes(std::mem::take(notes), rows);
                *notes = merged;
                (stats, notes.len())
            })
            .await?;

        tracing::info!(
            "Merged {} remote notes: {} pulled, {} kept local, {} total",
            fetched,
            merge.pulled,
            merge.kept_local,
            total
        );

        let profile = self.sync_profile(&session).await?;

        Ok(SyncOutcome::Completed(SyncReport {
            total,
            merge,
            remote_error,
            profile,
        }))
    }

    /// Upsert one note remotely. The local snapshot is not touched.
    pub async fn push_item(&self, note: &Note) -> WriteOutcome {
        let Some(session) = self.session().await else {
            return WriteOutcome::SignedOut;
        };
        let row = RemoteNote::from_note(note, &session.user.id);
        match self
            .remote
            .upsert_notes(&session, std::slice::from_ref(&row))
            .await
        {
            Ok(()) => WriteOutcome::Written { rows: 1 },
            Err(error) => {
                tracing::error!("Failed to push note {}: {}", note.id, error);
                WriteOutcome::Failed {
                    reason: error.to_string(),
                }
            }
        }
    }

    /// Delete one note remotely.
    ///
    /// Only the remote row is removed; callers remove the record from the
    /// snapshot themselves with [`LocalStore::remove_note`].
    pub async fn delete_item(&self, id: &NoteId) -> WriteOutcome {
        let Some(session) = self.session().await else {
            return WriteOutcome::SignedOut;
        };
        match self.remote.delete_note(&session, id).await {
            Ok(()) => WriteOutcome::Written { rows: 1 },
            Err(error) => {
                tracing::error!("Failed to delete remote note {}: {}", id, error);
                WriteOutcome::Failed {
                    reason: error.to_string(),
                }
            }
        }
    }

    /// Upload every local note in one batch, then push the profile.
    ///
    /// Re-sends everything on each call; unchanged rows overwrite themselves.
    pub async fn upload_all(&self) -> BackupReport {
        let Some(session) = self.session().await else {
            return BackupReport {
                notes: WriteOutcome::SignedOut,
                profile: None,
            };
        };

        let notes = self.local.notes().await;
        if notes.is_empty() {
            return BackupReport {
                notes: WriteOutcome::Empty,
                profile: None,
            };
        }

        tracing::info!("Backing up {} notes", notes.len());
        let rows = notes
            .iter()
            .map(|note| RemoteNote::from_note(note, &session.user.id))
            .collect::<Vec<_>>();

        let notes = match self.remote.upsert_notes(&session, &rows).await {
            Ok(()) => {
                tracing::info!("Full backup complete");
                WriteOutcome::Written { rows: rows.len() }
            }
            Err(error) => {
                tracing::error!("Full backup failed: {}", error);
                WriteOutcome::Failed {
                    reason: error.to_string(),
                }
            }
        };

        let profile = self.push_profile(&session).await;
        BackupReport {
            notes,
            profile: Some(profile),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{note, remote_note, Harness};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn sync_without_session_is_a_no_op() {
        let harness = Harness::signed_out();
        harness.remote.set_notes(vec![remote_note("a", 1, "A")]);

        assert_eq!(harness.engine.sync().await.unwrap(), SyncOutcome::SignedOut);
        assert!(harness.engine.local().notes().await.is_empty());
        assert!(harness.events().is_empty());
    }

    #[tokio::test]
    async fn sync_merges_and_persists_snapshot() {
        let harness = Harness::signed_in();
        harness
            .engine
            .local()
            .replace_notes(vec![note("a", 100, "X"), note("keep", 5, "K")])
            .await
            .unwrap();
        harness
            .remote
            .set_notes(vec![remote_note("a", 200, "Y"), remote_note("new", 1, "N")]);

        let SyncOutcome::Completed(report) = harness.engine.sync().await.unwrap() else {
            panic!("sync should run when signed in");
        };

        let expected = vec![note("a", 200, "Y"), note("keep", 5, "K"), note("new", 1, "N")];
        assert_eq!(harness.engine.local().notes().await, expected);
        assert_eq!(harness.persisted_notes(), expected);
        assert_eq!(report.total, 3);
        assert_eq!(report.merge, MergeStats { pulled: 2, kept_local: 0 });
        assert_eq!(report.remote_error, None);
    }

    #[tokio::test]
    async fn sync_twice_yields_identical_snapshot() {
        let harness = Harness::signed_in();
        harness
            .engine
            .local()
            .replace_notes(vec![note("a", 300, "local"), note("b", 1, "old")])
            .await
            .unwrap();
        harness
            .remote
            .set_notes(vec![remote_note("a", 200, "remote"), remote_note("b", 2, "newer")]);

        harness.engine.sync().await.unwrap();
        let first = harness.engine.local().notes().await;
        harness.engine.sync().await.unwrap();
        assert_eq!(harness.engine.local().notes().await, first);
    }

    #[tokio::test]
    async fn remote_read_failure_keeps_local_and_still_syncs_profile() {
        let harness = Harness::signed_in();
        harness
            .engine
            .local()
            .replace_notes(vec![note("a", 1, "A")])
            .await
            .unwrap();
        harness.remote.fail_fetch_notes();

        let SyncOutcome::Completed(report) = harness.engine.sync().await.unwrap() else {
            panic!("sync should run when signed in");
        };

        assert_eq!(harness.engine.local().notes().await, vec![note("a", 1, "A")]);
        assert!(report.remote_error.is_some());
        assert!(harness.events().contains(&"fetch_profile".to_string()));
    }

    #[tokio::test]
    async fn push_item_sends_raw_timestamp_for_session_user() {
        let harness = Harness::signed_in();
        let outcome = harness.engine.push_item(&note("a", 1_234, "A")).await;

        assert_eq!(outcome, WriteOutcome::Written { rows: 1 });
        let rows = harness.remote.notes();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "user-1");
        assert_eq!(rows[0].updated_at, 1_234);
    }

    #[tokio::test]
    async fn push_and_delete_are_no_ops_when_signed_out() {
        let harness = Harness::signed_out();
        assert_eq!(
            harness.engine.push_item(&note("a", 1, "A")).await,
            WriteOutcome::SignedOut
        );
        assert_eq!(
            harness.engine.delete_item(&NoteId::from("a")).await,
            WriteOutcome::SignedOut
        );
        assert!(harness.events().is_empty());
    }

    #[tokio::test]
    async fn delete_item_leaves_local_snapshot_alone() {
        let harness = Harness::signed_in();
        harness
            .engine
            .local()
            .replace_notes(vec![note("a", 1, "A")])
            .await
            .unwrap();
        harness.remote.set_notes(vec![remote_note("a", 1, "A")]);

        let outcome = harness.engine.delete_item(&NoteId::from("a")).await;

        assert_eq!(outcome, WriteOutcome::Written { rows: 1 });
        assert!(harness.remote.notes().is_empty());
        assert_eq!(harness.engine.local().notes().await, vec![note("a", 1, "A")]);
    }

    #[tokio::test]
    async fn failed_push_is_reported() {
        let harness = Harness::signed_in();
        harness.remote.fail_writes();
        assert!(matches!(
            harness.engine.push_item(&note("a", 1, "A")).await,
            WriteOutcome::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn upload_all_sends_every_note_then_profile() {
        let harness = Harness::signed_in();
        harness
            .engine
            .local()
            .replace_notes(vec![note("a", 1, "A"), note("b", 2, "B"), note("c", 3, "C")])
            .await
            .unwrap();

        let report = harness.engine.upload_all().await;

        assert_eq!(report.notes, WriteOutcome::Written { rows: 3 });
        assert_eq!(report.profile, Some(ProfileOutcome::Pushed));
        assert!(report.is_complete());
        assert_eq!(
            harness.events(),
            vec!["upsert_notes:3".to_string(), "upsert_profile".to_string()]
        );
    }

    #[tokio::test]
    async fn upload_all_skips_empty_snapshot() {
        let harness = Harness::signed_in();
        let report = harness.engine.upload_all().await;
        assert_eq!(report.notes, WriteOutcome::Empty);
        assert_eq!(report.profile, None);
        assert!(report.is_complete());
        assert!(harness.events().is_empty());
    }

    #[tokio::test]
    async fn upload_all_still_pushes_profile_after_failed_backup() {
        let harness = Harness::signed_in();
        harness
            .engine
            .local()
            .replace_notes(vec![note("a", 1, "A")])
            .await
            .unwrap();
        harness.remote.fail_writes();

        let report = harness.engine.upload_all().await;

        assert!(matches!(report.notes, WriteOutcome::Failed { .. }));
        assert!(matches!(report.profile, Some(ProfileOutcome::Failed { .. })));
        assert!(!report.is_complete());
        assert_eq!(
            harness.events(),
            vec!["upsert_notes:1".to_string(), "upsert_profile".to_string()]
        );
    }
}
