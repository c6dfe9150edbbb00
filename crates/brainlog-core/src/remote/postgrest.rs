//! Supabase PostgREST implementation of [`RemoteStore`].

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};

use super::{
    decode_note_rows, RemoteError, RemoteNote, RemoteProfile, RemoteResult, RemoteStore,
    NOTES_TABLE, PROFILES_TABLE,
};
use crate::auth::AuthSession;
use crate::config::SupabaseConfig;
use crate::models::NoteId;
use crate::supabase::{describe_api_error, ApiErrorBody};

/// PostgREST error code for "single row requested, none matched".
const NO_ROWS_CODE: &str = "PGRST116";
const SINGLE_OBJECT_MEDIA_TYPE: &str = "application/vnd.pgrst.object+json";
const UPSERT_PREFERENCE: &str = "resolution=merge-duplicates,return=minimal";

#[derive(Clone)]
pub struct PostgrestStore {
    rest_url: String,
    anon_key: String,
    client: Client,
}

impl PostgrestStore {
    pub fn new(config: &SupabaseConfig) -> RemoteResult<Self> {
        Ok(Self {
            rest_url: config.rest_url(),
            anon_key: config.anon_key().to_string(),
            client: Client::builder().build()?,
        })
    }

    fn request(&self, method: Method, table: &str, session: &AuthSession) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{table}", self.rest_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    async fn upsert<T: serde::Serialize + ?Sized>(
        &self,
        table: &str,
        session: &AuthSession,
        body: &T,
    ) -> RemoteResult<()> {
        let response = self
            .request(Method::POST, table, session)
            .header("Prefer", UPSERT_PREFERENCE)
            .json(body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

impl RemoteStore for PostgrestStore {
    async fn fetch_notes(&self, session: &AuthSession) -> RemoteResult<Vec<RemoteNote>> {
        let response = self
            .request(Method::GET, NOTES_TABLE, session)
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", session.user.id)),
            ])
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = ensure_success(response).await?.json().await?;
        Ok(decode_note_rows(rows))
    }

    async fn upsert_notes(&self, session: &AuthSession, rows: &[RemoteNote]) -> RemoteResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.upsert(NOTES_TABLE, session, rows).await
    }

    async fn delete_note(&self, session: &AuthSession, id: &NoteId) -> RemoteResult<()> {
        let response = self
            .request(Method::DELETE, NOTES_TABLE, session)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn fetch_profile(
        &self,
        session: &AuthSession,
        user_id: &str,
    ) -> RemoteResult<RemoteProfile> {
        let response = self
            .request(Method::GET, PROFILES_TABLE, session)
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT_MEDIA_TYPE)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{user_id}"))])
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn upsert_profile(&self, session: &AuthSession, row: &RemoteProfile) -> RemoteResult<()> {
        self.upsert(PROFILES_TABLE, session, row).await
    }
}

async fn ensure_success(response: Response) -> RemoteResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(classify_error(status, &body))
}

fn classify_error(status: StatusCode, body: &str) -> RemoteError {
    let code = ApiErrorBody::parse(body).code;
    if code.as_deref() == Some(NO_ROWS_CODE) {
        return RemoteError::NotFound;
    }
    RemoteError::Api {
        status: status.as_u16(),
        code,
        message: describe_api_error(status, body),
    }
}
