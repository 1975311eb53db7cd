//! Session lifecycle orchestration.
//!
//! `SessionManager` mediates between the credential store, the
//! in-memory session state, and the identity service: login, signup,
//! logout, startup restoration, and silent access-token renewal.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiError, FieldErrors, IdentityApi};

use super::{CredentialStore, SessionState, StorageHorizon};

/// Failure modes surfaced to callers. Expected failures are returned,
/// never panicked; storage faults are the one case passed through
/// untyped, since no local recovery exists for them.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Field-keyed validation errors, surfaced verbatim for form display.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The service rejected the email/password combination.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Renewal failed, or there was nothing left to renew.
    #[error("session expired")]
    SessionExpired,

    /// The request never completed, or the service answered outside its
    /// contract. Not distinguished further; callers treat it as a
    /// generic failure and no automatic retry happens.
    #[error("request failed: {0}")]
    Network(#[source] ApiError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl AuthError {
    /// Map an identity-service failure from login/signup, where a 401
    /// means the credentials themselves were rejected.
    fn from_credential_failure(err: ApiError) -> Self {
        match err {
            ApiError::Validation(fields) => AuthError::Validation(fields),
            ApiError::Unauthorized => AuthError::InvalidCredentials,
            other => AuthError::Network(other),
        }
    }
}

/// Orchestrates the credential lifecycle: startup restoration, login,
/// signup, logout, and access-token renewal.
///
/// Every operation takes `&mut self`, so overlapping operations -
/// including concurrent renewals against an expired access token - are
/// unrepresentable; the exclusive borrow is the single-flight guard.
pub struct SessionManager<C> {
    api: C,
    store: CredentialStore,
    state: SessionState,
}

impl<C: IdentityApi> SessionManager<C> {
    /// Create a manager with an empty, loading session. Call
    /// [`restore`](Self::restore) once before any other operation.
    pub fn new(api: C, store: CredentialStore) -> Self {
        Self {
            api,
            store,
            state: SessionState::new(),
        }
    }

    /// The session state the application observes.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Access token for authenticated record requests, read from
    /// whichever horizon holds the session.
    pub fn access_token(&self) -> Result<Option<String>, AuthError> {
        Ok(self.store.read()?.map(|(pair, _)| pair.access))
    }

    /// Reconstruct session state from persisted credentials. Runs once
    /// at startup, before any other operation.
    ///
    /// Verifies the stored access token against the profile endpoint;
    /// on rejection attempts exactly one renewal before clearing all
    /// state. Returns whether a session was restored. The loading flag
    /// drops on every exit path, including propagated storage errors.
    pub async fn restore(&mut self) -> Result<bool, AuthError> {
        debug!("Restoring session from credential store");
        let outcome = self.restore_inner().await;
        self.state.finish_loading();
        outcome
    }

    async fn restore_inner(&mut self) -> Result<bool, AuthError> {
        let Some((pair, horizon)) = self.store.read()? else {
            debug!("No stored token pair");
            self.clear_auth();
            return Ok(false);
        };
        let Some(user) = self.store.read_user()? else {
            // Tokens without a snapshot is a partial write; treat as no session.
            warn!("Token pair present but user snapshot missing");
            self.clear_auth();
            return Ok(false);
        };

        match self.api.profile(&pair.access).await {
            Ok(_) => {
                info!(user_id = user.id, ?horizon, "Session restored");
                self.state.set_user(user);
                return Ok(true);
            }
            Err(err) => {
                debug!(error = %err, ?horizon, "Stored access token rejected, attempting renewal");
            }
        }

        match self.renew().await {
            Ok(()) => {
                info!(user_id = user.id, "Session restored after renewal");
                self.state.set_user(user);
                Ok(true)
            }
            Err(err) => {
                warn!(error = %err, "Renewal during restore failed, clearing session");
                self.clear_auth();
                Ok(false)
            }
        }
    }

    /// Authenticate with email and password.
    ///
    /// `remember_me` selects the persistent horizon; otherwise the
    /// session lives only as long as this process. On failure nothing
    /// is written anywhere.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<(), AuthError> {
        let payload = self
            .api
            .login(email, password)
            .await
            .map_err(AuthError::from_credential_failure)?;

        let horizon = if remember_me {
            StorageHorizon::Persistent
        } else {
            StorageHorizon::Ephemeral
        };
        self.store.write(horizon, payload.tokens)?;
        self.store.write_user(&payload.user)?;

        info!(user_id = payload.user.id, ?horizon, "Login successful");
        self.state.set_user(payload.user);
        Ok(())
    }

    /// Create an account and start a session. A fresh account is
    /// treated as "remember me": credentials always land in the
    /// persistent horizon.
    pub async fn signup(
        &mut self,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<(), AuthError> {
        if password != password_confirm {
            // Same check and message the service applies; failing here
            // skips a doomed round trip.
            return Err(AuthError::Validation(FieldErrors::single(
                FieldErrors::NON_FIELD,
                "Passwords do not match.",
            )));
        }

        let payload = self
            .api
            .signup(email, password, password_confirm)
            .await
            .map_err(AuthError::from_credential_failure)?;

        self.store.write(StorageHorizon::Persistent, payload.tokens)?;
        self.store.write_user(&payload.user)?;

        info!(user_id = payload.user.id, "Signup successful");
        self.state.set_user(payload.user);
        Ok(())
    }

    /// End the session. The server-side blacklist call is best-effort:
    /// its failure is logged and swallowed, and local state always
    /// clears.
    pub async fn logout(&mut self) {
        match self.store.read() {
            Ok(Some((pair, _))) => {
                if let Err(err) = self.api.logout(&pair.access, &pair.refresh).await {
                    warn!(error = %err, "Server-side logout failed, clearing locally anyway");
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "Could not read stored tokens during logout");
            }
        }
        self.clear_auth();
        info!("Logged out");
    }

    /// Mint a new access token from the stored refresh token.
    ///
    /// On success only the access token is written back, into the
    /// horizon that supplied the refresh token. On failure nothing is
    /// written; the caller decides whether the failure warrants a full
    /// clear. With no stored refresh token this fails without touching
    /// the network.
    pub async fn renew(&mut self) -> Result<(), AuthError> {
        let Some((pair, horizon)) = self.store.read()? else {
            debug!("Renewal requested with no stored refresh token");
            return Err(AuthError::SessionExpired);
        };

        let access = self.api.refresh(&pair.refresh).await.map_err(|err| match err {
            ApiError::Validation(_) | ApiError::Unauthorized => AuthError::SessionExpired,
            other => AuthError::Network(other),
        })?;

        self.store.replace_access(horizon, access)?;
        debug!(?horizon, "Access token renewed");
        Ok(())
    }

    /// Reset to logged-out: empty session state, purged credential
    /// store. The universal failure-path primitive; never fails.
    pub fn clear_auth(&mut self) {
        self.state.clear();
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "Failed to purge credential store");
        }
    }
}
