//! Helpers shared by the GoTrue and PostgREST clients.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::util::compact_text;

/// Error payload returned by Supabase services.
///
/// GoTrue uses `msg` / `error_description`, PostgREST uses `code` /
/// `message` / `details`; every field is optional.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub msg: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub details: Option<String>,
}

impl ApiErrorBody {
    pub(crate) fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn summary(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
            .map(|message| match self.details.as_deref().map(str::trim) {
                Some(details) if !details.is_empty() => {
                    format!("{}: {}", message.trim(), details)
                }
                _ => message.trim().to_string(),
            })
    }
}

/// Render an error response as `"<message> (<status>)"`.
pub(crate) fn describe_api_error(status: StatusCode, body: &str) -> String {
    if let Some(message) = ApiErrorBody::parse(body).summary() {
        return format!("{} ({})", message, status.as_u16());
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
