//! Appwrite account REST adapter.
//!
//! # Responsibility
//! - Implement `SessionGateway` over the Appwrite `/account` endpoints.
//! - Keep the session cookie inside one blocking HTTP client.
//!
//! # Invariants
//! - Every request carries the configured project header.
//! - Non-2xx responses map to `AuthError::Rejected` with the provider message.

use crate::config::AuthConfig;
use crate::session::gateway::{Account, AuthError, AuthResult, Session, SessionGateway};
use log::{info, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const UNIQUE_USER_ID: &str = "unique()";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Blocking Appwrite client for the account API.
pub struct AppwriteGateway {
    client: Client,
    endpoint: String,
    project_id: String,
}

impl AppwriteGateway {
    /// Builds a gateway from auth configuration.
    ///
    /// # Errors
    /// - `InvalidInput` when endpoint or project id is missing or malformed.
    /// - `Transport` when the HTTP client cannot be constructed.
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        let endpoint = config.endpoint.trim().trim_end_matches('/').to_string();
        reqwest::Url::parse(&endpoint).map_err(|err| {
            AuthError::InvalidInput(format!("invalid auth endpoint `{endpoint}`: {err}"))
        })?;
        let project_id = config
            .project_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AuthError::InvalidInput("auth project id is not configured".into()))?
            .to_string();

        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(|err| AuthError::Transport(format!("client build failed: {err}")))?;

        Ok(Self {
            client,
            endpoint,
            project_id,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    fn send(&self, request: RequestBuilder) -> AuthResult<Response> {
        let response = request
            .header(PROJECT_HEADER, self.project_id.as_str())
            .send()
            .map_err(|err| AuthError::Transport(err.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        Err(parse_rejection(status, &body))
    }
}

impl SessionGateway for AppwriteGateway {
    fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let request = self
            .client
            .post(self.url("/account/sessions/email"))
            .json(&json!({ "email": email, "password": password }));
        let result = self.send(request).and_then(decode::<Session>);
        log_outcome("auth_sign_in", &result);
        result
    }

    fn sign_up(&self, email: &str, password: &str, name: &str) -> AuthResult<Account> {
        let request = self.client.post(self.url("/account")).json(&json!({
            "userId": UNIQUE_USER_ID,
            "email": email,
            "password": password,
            "name": name,
        }));
        let result = self.send(request).and_then(decode::<Account>);
        log_outcome("auth_sign_up", &result);
        result
    }

    fn sign_out(&self) -> AuthResult<()> {
        let request = self.client.delete(self.url("/account/sessions/current"));
        let result = match self.send(request) {
            Ok(_) => Ok(()),
            Err(AuthError::Rejected { status: 401, .. }) => Err(AuthError::NoActiveSession),
            Err(err) => Err(err),
        };
        log_outcome("auth_sign_out", &result);
        result
    }

    fn current_session(&self) -> AuthResult<Option<Account>> {
        let request = self.client.get(self.url("/account"));
        match self.send(request) {
            Ok(response) => decode::<Account>(response).map(Some),
            Err(AuthError::Rejected { status: 401, .. }) => Ok(None),
            Err(err) => {
                warn!("event=auth_current module=session status=error error={err}");
                Err(err)
            }
        }
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> AuthResult<T> {
    response
        .json::<T>()
        .map_err(|err| AuthError::InvalidResponse(err.to_string()))
}

fn parse_rejection(status: u16, body: &str) -> AuthError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(payload) => AuthError::Rejected {
            status,
            kind: payload.kind,
            message: payload.message,
        },
        Err(_) => AuthError::Rejected {
            status,
            kind: None,
            message: format!("authentication request failed with HTTP {status}"),
        },
    }
}

fn log_outcome<T>(event: &str, result: &AuthResult<T>) {
    match result {
        Ok(_) => info!("event={event} module=session status=ok"),
        Err(AuthError::Rejected { status, kind, .. }) => warn!(
            "event={event} module=session status=rejected http_status={status} kind={}",
            kind.as_deref().unwrap_or("unknown")
        ),
        Err(err) => warn!("event={event} module=session status=error error={err}"),
    }
}
