//! In-crate fakes for the auth, remote, storage and UI capabilities.
//!
//! Every fake appends to one shared event log so tests can assert the order
//! in which the engine touched its collaborators.

use std::sync::{Arc, Mutex};

use crate::auth::{AuthError, AuthProvider, AuthResult, AuthSession, AuthUser, SignUpOutcome};
use crate::local::{BlobStore, LocalStore, MemoryBlobStore, NOTES_KEY};
use crate::models::{Note, NoteId, NoteKind, ResolvedTheme};
use crate::remote::{RemoteError, RemoteNote, RemoteProfile, RemoteResult, RemoteStore};
use crate::sync::{ProfileOutcome, SyncEngine};
use crate::ui::UiContext;

type EventLog = Arc<Mutex<Vec<String>>>;

fn record(log: &EventLog, event: impl Into<String>) {
    log.lock().unwrap().push(event.into());
}

pub fn note(id: &str, updated_at: i64, name: &str) -> Note {
    Note {
        id: NoteId::from(id),
        kind: NoteKind::Document,
        parent_id: None,
        name: name.to_string(),
        content: format!("{name} body"),
        is_trashed: false,
        updated_at,
    }
}

pub fn remote_note(id: &str, updated_at: i64, name: &str) -> RemoteNote {
    RemoteNote::from_note(&note(id, updated_at, name), "user-1")
}

pub fn session() -> AuthSession {
    AuthSession {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at: i64::MAX,
        user: AuthUser {
            id: "user-1".to_string(),
            email: Some("writer@example.com".to_string()),
        },
    }
}

#[derive(Clone)]
pub struct FakeAuth {
    log: EventLog,
    session: Arc<Mutex<Option<AuthSession>>>,
    fail_sign_out: Arc<Mutex<bool>>,
}

impl FakeAuth {
    pub fn fail_sign_out(&self) {
        *self.fail_sign_out.lock().unwrap() = true;
    }
}

impl AuthProvider for FakeAuth {
    async fn sign_up(&self, _email: &str, _password: &str) -> AuthResult<SignUpOutcome> {
        Ok(SignUpOutcome::SignedIn(session()))
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> AuthResult<AuthSession> {
        let signed_in = session();
        *self.session.lock().unwrap() = Some(signed_in.clone());
        Ok(signed_in)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        record(&self.log, "sign_out");
        *self.session.lock().unwrap() = None;
        if *self.fail_sign_out.lock().unwrap() {
            return Err(AuthError::Api("logout endpoint unavailable (503)".to_string()));
        }
        Ok(())
    }

    async fn current_session(&self) -> AuthResult<Option<AuthSession>> {
        Ok(self.session.lock().unwrap().clone())
    }
}

#[derive(Default)]
struct RemoteState {
    notes: Vec<RemoteNote>,
    profile: Option<RemoteProfile>,
    fail_fetch_notes: bool,
    fail_fetch_profile: bool,
    fail_writes: bool,
}

#[derive(Clone)]
pub struct FakeRemote {
    log: EventLog,
    state: Arc<Mutex<RemoteState>>,
}

impl FakeRemote {
    pub fn set_notes(&self, notes: Vec<RemoteNote>) {
        self.state.lock().unwrap().notes = notes;
    }

    pub fn notes(&self) -> Vec<RemoteNote> {
        self.state.lock().unwrap().notes.clone()
    }

    pub fn set_profile(&self, profile: RemoteProfile) {
        self.state.lock().unwrap().profile = Some(profile);
    }

    pub fn profile(&self) -> Option<RemoteProfile> {
        self.state.lock().unwrap().profile.clone()
    }

    pub fn fail_fetch_notes(&self) {
        self.state.lock().unwrap().fail_fetch_notes = true;
    }

    pub fn fail_fetch_profile(&self) {
        self.state.lock().unwrap().fail_fetch_profile = true;
    }

    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }
}

fn unavailable() -> RemoteError {
    RemoteError::Api {
        status: 503,
        code: None,
        message: "service unavailable (503)".to_string(),
    }
}

impl RemoteStore for FakeRemote {
    async fn fetch_notes(&self, _session: &AuthSession) -> RemoteResult<Vec<RemoteNote>> {
        record(&self.log, "fetch_notes");
        let state = self.state.lock().unwrap();
        if state.fail_fetch_notes {
            return Err(unavailable());
        }
        Ok(state.notes.clone())
    }

    async fn upsert_notes(&self, _session: &AuthSession, rows: &[RemoteNote]) -> RemoteResult<()> {
        record(&self.log, format!("upsert_notes:{}", rows.len()));
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(unavailable());
        }
        for row in rows {
            if let Some(existing) = state.notes.iter_mut().find(|n| n.id == row.id) {
                *existing = row.clone();
            } else {
                state.notes.push(row.clone());
            }
        }
        Ok(())
    }

    async fn delete_note(&self, _session: &AuthSession, id: &NoteId) -> RemoteResult<()> {
        record(&self.log, format!("delete_note:{id}"));
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(unavailable());
        }
        state.notes.retain(|row| &row.id != id);
        Ok(())
    }

    async fn fetch_profile(
        &self,
        _session: &AuthSession,
        user_id: &str,
    ) -> RemoteResult<RemoteProfile> {
        record(&self.log, "fetch_profile");
        let state = self.state.lock().unwrap();
        if state.fail_fetch_profile {
            return Err(unavailable());
        }
        state
            .profile
            .clone()
            .filter(|profile| profile.id == user_id)
            .ok_or(RemoteError::NotFound)
    }

    async fn upsert_profile(&self, _session: &AuthSession, row: &RemoteProfile) -> RemoteResult<()> {
        record(&self.log, "upsert_profile");
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(unavailable());
        }
        state.profile = Some(row.clone());
        Ok(())
    }
}

/// Blob store that logs removals.
#[derive(Clone)]
pub struct RecordingBlobs {
    log: EventLog,
    inner: Arc<MemoryBlobStore>,
    failing_removal: Arc<Mutex<Option<String>>>,
}

impl BlobStore for RecordingBlobs {
    fn read(&self, key: &str) -> crate::Result<Option<String>> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> crate::Result<()> {
        self.inner.write(key, value)
    }

    fn remove(&self, key: &str) -> crate::Result<()> {
        record(&self.log, format!("remove:{key}"));
        if self.failing_removal.lock().unwrap().as_deref() == Some(key) {
            return Err(crate::Error::Storage(format!("cannot remove {key}")));
        }
        self.inner.remove(key)
    }
}

#[derive(Clone)]
pub struct RecordingUi {
    log: EventLog,
    prefers_dark: bool,
    applied: Arc<Mutex<Vec<ResolvedTheme>>>,
}

impl RecordingUi {
    pub fn applied(&self) -> Vec<ResolvedTheme> {
        self.applied.lock().unwrap().clone()
    }
}

impl UiContext for RecordingUi {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }

    fn apply_theme(&self, theme: ResolvedTheme) {
        self.applied.lock().unwrap().push(theme);
    }

    fn show_sign_in(&self) {
        record(&self.log, "show_sign_in");
    }
}

pub struct Harness {
    pub engine: SyncEngine<FakeAuth, FakeRemote, RecordingBlobs, RecordingUi>,
    pub auth: FakeAuth,
    pub remote: FakeRemote,
    pub ui: RecordingUi,
    blobs: RecordingBlobs,
    log: EventLog,
}

impl Harness {
    pub fn signed_in() -> Self {
        Self::build(Some(session()), false)
    }

    pub fn signed_in_with_ui(prefers_dark: bool) -> Self {
        Self::build(Some(session()), prefers_dark)
    }

    pub fn signed_out() -> Self {
        Self::build(None, false)
    }

    fn build(session: Option<AuthSession>, prefers_dark: bool) -> Self {
        let log = EventLog::default();
        let auth = FakeAuth {
            log: log.clone(),
            session: Arc::new(Mutex::new(session)),
            fail_sign_out: Arc::new(Mutex::new(false)),
        };
        let remote = FakeRemote {
            log: log.clone(),
            state: Arc::default(),
        };
        let blobs = RecordingBlobs {
            log: log.clone(),
            inner: Arc::new(MemoryBlobStore::new()),
            failing_removal: Arc::default(),
        };
        let ui = RecordingUi {
            log: log.clone(),
            prefers_dark,
            applied: Arc::default(),
        };
        let local = LocalStore::open(blobs.clone()).unwrap();
        let engine = SyncEngine::new(auth.clone(), remote.clone(), local, ui.clone());
        Self {
            engine,
            auth,
            remote,
            ui,
            blobs,
            log,
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear_events(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn fail_blob_removal(&self, key: &str) {
        *self.blobs.failing_removal.lock().unwrap() = Some(key.to_string());
    }

    pub fn blob(&self, key: &str) -> Option<String> {
        self.blobs.read(key).unwrap()
    }

    pub fn persisted_notes(&self) -> Vec<Note> {
        self.blob(NOTES_KEY)
            .map(|raw| serde_json::from_str(&raw).unwrap())
            .unwrap_or_default()
    }

    pub async fn sync_profile(&self) -> ProfileOutcome {
        self.engine.sync_profile(&session()).await.unwrap()
    }
}
