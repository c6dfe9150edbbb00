//! Safe logout: back up, sign out, wipe, redirect.

use crate::auth::AuthProvider;
use crate::error::Result;
use crate::local::BlobStore;
use crate::remote::RemoteStore;
use crate::sync::{BackupReport, SyncEngine};
use crate::ui::UiContext;

/// What happened during [`SyncEngine::logout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutReport {
    pub backup: BackupReport,
    /// Set when the auth provider could not revoke the session.
    pub sign_out_error: Option<String>,
}

impl<A, R, B, U> SyncEngine<A, R, B, U>
where
    A: AuthProvider,
    R: RemoteStore,
    B: BlobStore,
    U: UiContext,
{
    /// Log out without losing unsynced work.
    ///
    /// Steps run strictly in order: full backup, sign-out, erase of the
    /// session keys, navigation to sign-in. The erase always happens once the
    /// backup has been attempted, whether or not it succeeded; the report
    /// says which. A failed erase is returned as an error, after the sign-in
    /// surface has been shown.
    pub async fn logout(&self) -> Result<LogoutReport> {
        let backup = self.upload_all().await;

        let sign_out_error = match self.auth().sign_out().await {
            Ok(()) => None,
            Err(error) => {
                tracing::warn!("Sign-out failed: {}", error);
                Some(error.to_string())
            }
        };

        if !backup.is_complete() {
            tracing::warn!("Erasing local data after an incomplete backup: {:?}", backup);
        }
        let wiped = self.local().clear_session_data().await;
        self.ui().show_sign_in();
        wiped?;

        Ok(LogoutReport {
            backup,
            sign_out_error,
        })
    }
}
