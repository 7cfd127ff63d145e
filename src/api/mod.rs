//! Wire payloads and errors for the counseling backend.
//!
//! Two endpoint families exist: the bearer-authenticated `/api/*` routes
//! used by the full service, and the unauthenticated `/chat` + `/reset`
//! routes exposed by the simple demo server. Both speak JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod client;

#[derive(Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub username: String,
    #[serde(default)]
    pub recent_summaries: Option<Vec<SessionSummary>>,
}

#[derive(Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupResponse {
    pub access_token: String,
    pub username: String,
}

#[derive(Serialize)]
pub struct ChatTurnRequest {
    pub message: String,
    pub session_id: String,
}

#[derive(Deserialize)]
pub struct ChatTurnResponse {
    pub prompt: String,
}

/// Reply shape of the simple demo server's `/chat` route.
#[derive(Deserialize)]
pub struct SimpleChatResponse {
    pub response: String,
}

#[derive(Serialize)]
pub struct EndSessionRequest {
    pub session_id: String,
}

#[derive(Deserialize)]
pub struct EndSessionResponse {
    pub summary: String,
}

#[derive(Serialize)]
pub struct ResetRequest {
    pub session_id: String,
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// One concluded-session summary, most recent first in
/// [`LoginResponse::recent_summaries`] and the persisted profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSummary {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The backend rejected the request with a parseable `{detail}` body.
    Rejected { status: u16, detail: String },

    /// A 401 on an authenticated call: the stored token is expired or invalid.
    SessionExpired,

    /// Transport failure, or a non-2xx response with no parseable body.
    Network(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Rejected { detail, .. } => write!(f, "{detail}"),
            ApiError::SessionExpired => write!(f, "session expired"),
            ApiError::Network(message) => write!(f, "network error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}
