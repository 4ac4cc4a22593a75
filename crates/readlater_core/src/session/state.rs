//! Explicit application auth state.
//!
//! # Responsibility
//! - Track whether the app is checking, signed out, or signed in.
//! - Drive sign-in / sign-up / sign-out through a `SessionGateway`.
//!
//! # Invariants
//! - Status starts as `Checking` and leaves it only through `initialize` or
//!   a successful sign-in.
//! - Only successful gateway calls change the status; failures are returned
//!   and the previous status is kept (except `initialize`, which treats any
//!   failure as signed out).
//! - Empty credentials are rejected before the gateway is called.

use crate::session::gateway::{AuthError, AuthResult, SessionGateway};
use log::{info, warn};

const MISSING_FIELDS_MESSAGE: &str = "Please fill all required fields.";

/// Current authentication status as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// Startup probe has not completed yet.
    Checking,
    SignedOut,
    SignedIn { user_id: String },
}

impl AuthStatus {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }
}

/// Auth context owned by the app shell and passed to screens.
pub struct SessionState<G: SessionGateway> {
    gateway: G,
    status: AuthStatus,
}

impl<G: SessionGateway> SessionState<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            status: AuthStatus::Checking,
        }
    }

    pub fn status(&self) -> &AuthStatus {
        &self.status
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Resolves the startup status from the provider's current session.
    pub fn initialize(&mut self) -> &AuthStatus {
        self.status = match self.gateway.current_session() {
            Ok(Some(account)) => AuthStatus::SignedIn {
                user_id: account.id,
            },
            Ok(None) => AuthStatus::SignedOut,
            Err(err) => {
                warn!("event=session_init module=session status=degraded error={err}");
                AuthStatus::SignedOut
            }
        };
        info!(
            "event=session_init module=session status=ok signed_in={}",
            self.status.is_signed_in()
        );
        &self.status
    }

    pub fn sign_in(&mut self, email: &str, password: &str) -> AuthResult<&AuthStatus> {
        require_fields(&[email, password])?;
        let session = self.gateway.sign_in(email.trim(), password)?;
        self.status = AuthStatus::SignedIn {
            user_id: session.user_id,
        };
        Ok(&self.status)
    }

    /// Registers the account, then signs in with the same credentials.
    pub fn sign_up(&mut self, email: &str, password: &str, name: &str) -> AuthResult<&AuthStatus> {
        require_fields(&[email, password, name])?;
        self.gateway.sign_up(email.trim(), password, name.trim())?;
        self.sign_in(email, password)
    }

    pub fn sign_out(&mut self) -> AuthResult<&AuthStatus> {
        self.gateway.sign_out()?;
        self.status = AuthStatus::SignedOut;
        Ok(&self.status)
    }
}

fn require_fields(values: &[&str]) -> AuthResult<()> {
    if values.iter().any(|value| value.trim().is_empty()) {
        return Err(AuthError::InvalidInput(MISSING_FIELDS_MESSAGE.to_string()));
    }
    Ok(())
}
