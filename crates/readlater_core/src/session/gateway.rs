//! Session gateway contract consumed by the app.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AuthResult<T> = Result<T, AuthError>;

/// Remote user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Active login session issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub expire: Option<String>,
}

/// Authentication failure, rendered verbatim to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Required field missing or malformed before any remote call.
    InvalidInput(String),
    /// Provider refused the request (bad credentials, duplicate account, ...).
    Rejected {
        status: u16,
        kind: Option<String>,
        message: String,
    },
    NoActiveSession,
    /// Network or client failure before a response was received.
    Transport(String),
    /// Provider answered with a body that does not match the contract.
    InvalidResponse(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "{message}"),
            Self::Rejected { message, .. } => write!(f, "{message}"),
            Self::NoActiveSession => write!(f, "no active session"),
            Self::Transport(message) => write!(f, "authentication service unreachable: {message}"),
            Self::InvalidResponse(message) => {
                write!(f, "unexpected authentication response: {message}")
            }
        }
    }
}

impl Error for AuthError {}

/// Account API of the hosted backend.
pub trait SessionGateway {
    /// Creates an e-mail/password session.
    fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session>;
    /// Registers a new account. Does not sign in.
    fn sign_up(&self, email: &str, password: &str, name: &str) -> AuthResult<Account>;
    /// Ends the current session; `NoActiveSession` when there is none.
    fn sign_out(&self) -> AuthResult<()>;
    /// Returns the account bound to the current session, if any.
    fn current_session(&self) -> AuthResult<Option<Account>>;
}
