//! HTTP client for the counseling backend.
//!
//! [`CounselorClient`] wraps a shared `reqwest::Client` and maps responses
//! into the [`ApiError`] taxonomy. The chat loop talks to the backend
//! through the [`CounselingBackend`] trait so the two endpoint variants
//! (bearer-authenticated and simple demo) stay interchangeable and the
//! loop remains testable without a server.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{
    ApiError, ChatTurnRequest, ChatTurnResponse, EndSessionRequest, EndSessionResponse,
    ErrorBody, LoginRequest, LoginResponse, ResetRequest, SignupRequest, SignupResponse,
    SimpleChatResponse,
};
use crate::utils::url::{endpoint_url, normalize_base_url};

#[derive(Clone)]
pub struct CounselorClient {
    http: reqwest::Client,
    base_url: String,
}

impl CounselorClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: normalize_base_url(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.post("api/login", &request, None).await?;
        parse_response(response).await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<SignupResponse, ApiError> {
        let response = self.post("api/signup", request, None).await?;
        parse_response(response).await
    }

    pub async fn chat(
        &self,
        token: &str,
        session_id: &str,
        message: &str,
    ) -> Result<String, ApiError> {
        let request = ChatTurnRequest {
            message: message.to_string(),
            session_id: session_id.to_string(),
        };
        let response = self.post("api/chat", &request, Some(token)).await?;
        if response.status().as_u16() == 401 {
            return Err(ApiError::SessionExpired);
        }
        let turn: ChatTurnResponse = parse_response(response).await?;
        Ok(turn.prompt)
    }

    pub async fn end_session(&self, token: &str, session_id: &str) -> Result<String, ApiError> {
        let request = EndSessionRequest {
            session_id: session_id.to_string(),
        };
        let response = self.post("api/session/end", &request, Some(token)).await?;
        if response.status().as_u16() == 401 {
            return Err(ApiError::SessionExpired);
        }
        let ended: EndSessionResponse = parse_response(response).await?;
        Ok(ended.summary)
    }

    /// `/chat` on the simple demo server; no authentication.
    pub async fn simple_chat(&self, session_id: &str, message: &str) -> Result<String, ApiError> {
        let request = ChatTurnRequest {
            message: message.to_string(),
            session_id: session_id.to_string(),
        };
        let response = self.post("chat", &request, None).await?;
        let turn: SimpleChatResponse = parse_response(response).await?;
        Ok(turn.response)
    }

    /// `/reset` on the simple demo server; discards the server-side history.
    pub async fn reset(&self, session_id: &str) -> Result<(), ApiError> {
        let request = ResetRequest {
            session_id: session_id.to_string(),
        };
        let response = self.post("reset", &request, None).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response).await)
        }
    }

    async fn post<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self
            .http
            .post(endpoint_url(&self.base_url, path))
            .json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))
    }
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))
    } else {
        Err(rejection(response).await)
    }
}

/// Map a non-2xx response: a parseable `{detail}` body is a backend
/// rejection, anything else counts as a network-level failure.
async fn rejection(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => ApiError::Rejected {
            status,
            detail: parsed.detail,
        },
        Err(_) => ApiError::Network(format!("HTTP {status}")),
    }
}

/// The chat-phase operations the event loop needs from a backend.
///
/// `end_session` yields the server-produced summary, or `None` for
/// backends that reset without summarizing.
#[async_trait]
pub trait CounselingBackend: Send + Sync {
    async fn chat_turn(&self, session_id: &str, message: &str) -> Result<String, ApiError>;
    async fn end_session(&self, session_id: &str) -> Result<Option<String>, ApiError>;
}

/// The full service: bearer token on every call, summaries on session end.
pub struct BearerBackend {
    client: CounselorClient,
    token: String,
}

impl BearerBackend {
    pub fn new(client: CounselorClient, token: String) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl CounselingBackend for BearerBackend {
    async fn chat_turn(&self, session_id: &str, message: &str) -> Result<String, ApiError> {
        self.client.chat(&self.token, session_id, message).await
    }

    async fn end_session(&self, session_id: &str) -> Result<Option<String>, ApiError> {
        let summary = self.client.end_session(&self.token, session_id).await?;
        Ok(Some(summary))
    }
}

/// The unauthenticated demo server: `/chat` turns, `/reset` on session end.
pub struct SimpleBackend {
    client: CounselorClient,
}

impl SimpleBackend {
    pub fn new(client: CounselorClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CounselingBackend for SimpleBackend {
    async fn chat_turn(&self, session_id: &str, message: &str) -> Result<String, ApiError> {
        self.client.simple_chat(session_id, message).await
    }

    async fn end_session(&self, session_id: &str) -> Result<Option<String>, ApiError> {
        self.client.reset(session_id).await?;
        Ok(None)
    }
}
