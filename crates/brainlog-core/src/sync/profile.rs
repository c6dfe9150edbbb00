//! Profile sync: pull the remote preferences row, or bootstrap it from local
//! settings when the account has none yet.

use chrono::Utc;
use serde_json::Value;

use super::SyncEngine;
use crate::auth::{AuthProvider, AuthSession};
use crate::error::Result;
use crate::local::BlobStore;
use crate::models::ThemeMode;
use crate::remote::{RemoteError, RemoteProfile, RemoteStore};
use crate::ui::UiContext;
use crate::util::normalize_text_option;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    SignedOut,
    /// The remote row was pulled into local settings.
    Applied,
    /// No remote row existed; local settings were pushed as the first one.
    Bootstrapped,
    /// Local settings were pushed.
    Pushed,
    Failed { reason: String },
}

impl ProfileOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Applied | Self::Bootstrapped | Self::Pushed)
    }
}

impl<A, R, B, U> SyncEngine<A, R, B, U>
where
    A: AuthProvider,
    R: RemoteStore,
    B: BlobStore,
    U: UiContext,
{
    /// Pull the profile row for the session user into local settings.
    ///
    /// A missing row triggers one push of the current local settings. Other
    /// fetch failures leave local settings untouched.
    pub async fn sync_profile(&self, session: &AuthSession) -> Result<ProfileOutcome> {
        let row = match self.remote().fetch_profile(session, &session.user.id).await {
            Ok(row) => row,
            Err(RemoteError::NotFound) => {
                tracing::info!(
                    "No remote profile for {}; pushing local settings",
                    session.user.id
                );
                return Ok(match self.push_profile(session).await {
                    ProfileOutcome::Pushed => ProfileOutcome::Bootstrapped,
                    other => other,
                });
            }
            Err(error) => {
                tracing::error!("Profile fetch failed: {}", error);
                return Ok(ProfileOutcome::Failed {
                    reason: error.to_string(),
                });
            }
        };

        self.apply_profile(row).await?;
        Ok(ProfileOutcome::Applied)
    }

    /// Push current local settings as the session user's profile row.
    pub async fn update_profile(&self) -> ProfileOutcome {
        let Some(session) = self.session().await else {
            return ProfileOutcome::SignedOut;
        };
        self.push_profile(&session).await
    }

    pub(super) async fn push_profile(&self, session: &AuthSession) -> ProfileOutcome {
        let settings = self.local().settings().await;
        let row = RemoteProfile::from_settings(&session.user.id, &settings, Utc::now());
        match self.remote().upsert_profile(session, &row).await {
            Ok(()) => ProfileOutcome::Pushed,
            Err(error) => {
                tracing::error!("Profile push failed: {}", error);
                ProfileOutcome::Failed {
                    reason: error.to_string(),
                }
            }
        }
    }

    /// Copy the set columns of `row` into local settings and apply the
    /// resulting theme. Empty, zero and null columns are skipped.
    async fn apply_profile(&self, row: RemoteProfile) -> Result<()> {
        let theme = row
            .theme
            .and_then(|raw| normalize_text_option(Some(raw)))
            .and_then(|raw| match raw.parse::<ThemeMode>() {
                Ok(theme) => Some(theme),
                Err(error) => {
                    tracing::warn!("Ignoring remote theme: {}", error);
                    None
                }
            });
        let view_mode = normalize_text_option(row.view_mode);
        let daily_goal = row.daily_goal.filter(|goal| *goal != 0);
        let stats = row.stats.filter(is_truthy);

        let theme = self
            .local()
            .update_settings(|settings| {
                if let Some(theme) = theme {
                    settings.theme = theme;
                }
                if let Some(view_mode) = view_mode {
                    settings.view_mode = view_mode;
                }
                if let Some(daily_goal) = daily_goal {
                    settings.daily_goal = daily_goal;
                }
                if let Some(stats) = stats {
                    settings.stats = stats;
                }
                settings.theme
            })
            .await?;

        self.ui().apply_theme(theme.resolve(self.ui().prefers_dark()));
        Ok(())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
