//! Session lifecycle management.
//!
//! The session owns the bearer token and the cached user record, persists
//! them as a pair, and tracks the lifecycle phase as an explicit enum so
//! invalid combinations are unrepresentable. All state lives server-side;
//! losing the local session only ever costs a re-login.
//!
//! The session is the sole writer of its two store keys. Every mutation
//! takes `&mut self`, so the single-writer rule is enforced by the borrow
//! checker.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::models::{id, User};

use super::store::{SessionStore, TOKEN_KEY, USER_KEY};

/// Lifecycle phase of the session.
///
/// `Authenticating` and `VerifyingOtp` cover the two-step login handshake;
/// they are only ever entered while no token is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Initial phase, before the store has been consulted.
    Restoring,
    /// No token held; only a successful login leaves this phase.
    Absent,
    /// Password step of the login handshake in flight.
    Authenticating,
    /// OTP step of the login handshake in flight.
    VerifyingOtp,
    /// Token held. The user record may briefly lag behind (see
    /// [`Session::ensure_user`]).
    Ready,
}

pub struct Session<S: SessionStore> {
    store: S,
    token: Option<String>,
    user: Option<User>,
    phase: SessionPhase,
}

impl<S: SessionStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            token: None,
            user: None,
            phase: SessionPhase::Restoring,
        }
    }

    /// Single transition point for the phase machine.
    fn transition(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "Session phase change");
            self.phase = phase;
        }
    }

    /// A session is authenticated as soon as it holds a token; the user
    /// record may still be in flight.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Restore a persisted session from the store. Returns whether a token
    /// was found.
    ///
    /// Store read failures are never surfaced to the user; they degrade to
    /// the logged-out state. A token without a readable user record restores
    /// into `Ready` with no cached user; the next [`ensure_user`] call
    /// re-fetches the profile or, failing that, tears the session down.
    ///
    /// [`ensure_user`]: Session::ensure_user
    pub fn restore(&mut self) -> bool {
        let token = match self.store.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                debug!(error = %e, "Session token read failed, treating as logged out");
                None
            }
        };

        let Some(token) = token else {
            self.transition(SessionPhase::Absent);
            return false;
        };

        let user = match self.store.get(USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    debug!(error = %e, "Cached user record unreadable, will re-fetch");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                debug!(error = %e, "Cached user read failed, will re-fetch");
                None
            }
        };

        self.token = Some(token);
        self.user = user;
        self.transition(SessionPhase::Ready);
        true
    }

    /// Commit a full credential issued by the backend.
    ///
    /// Token and user are persisted as a single logical transaction: if
    /// either write fails, both keys are removed and nothing is committed
    /// to memory, so the store never holds a half-written session.
    pub fn login(&mut self, token: String, mut user: User) -> Result<()> {
        user.id = id::normalize(&user.id);

        let user_json = serde_json::to_string(&user).context("Failed to serialize user")?;
        let committed = self
            .store
            .set(TOKEN_KEY, &token)
            .and_then(|_| self.store.set(USER_KEY, &user_json));

        if let Err(e) = committed {
            // Partial failure is logout-equivalent, never a half-written session
            self.clear_store();
            self.token = None;
            self.user = None;
            self.transition(SessionPhase::Absent);
            return Err(e.context("Failed to persist session"));
        }

        self.token = Some(token);
        self.user = Some(user);
        self.transition(SessionPhase::Ready);
        Ok(())
    }

    /// Log out. The remote call is best-effort; local state is cleared
    /// regardless, so this never fails from the caller's perspective.
    pub async fn logout(&mut self, api: &ApiClient) {
        if let Some(token) = &self.token {
            if let Err(e) = api.with_token(token.clone()).logout().await {
                warn!(error = %e, "Remote logout failed, clearing local session anyway");
            }
        }
        self.discard();
    }

    /// Drop the session without the remote call, for when the token is
    /// already dead server-side (e.g. the account was just deleted).
    pub fn discard(&mut self) {
        self.clear_store();
        self.token = None;
        self.user = None;
        self.transition(SessionPhase::Absent);
    }

    /// Fetch the user record if a token is held but no user is cached
    /// (a restored token without a profile, or a corrupt cached record).
    ///
    /// Any failure here means the token can no longer be trusted and the
    /// session is torn down.
    pub async fn ensure_user(&mut self, api: &ApiClient) {
        let Some(token) = self.token.clone() else {
            return;
        };
        if self.user.is_some() {
            return;
        }

        match api.with_token(token).fetch_me().await {
            Ok(user) => {
                self.cache_user(user);
            }
            Err(e) => {
                warn!(error = %e, "Current-user fetch failed, forcing logout");
                self.logout(api).await;
            }
        }
    }

    /// Re-fetch the current user and overwrite the cached record.
    ///
    /// On failure the cached user is cleared but the token is kept: a
    /// profile refresh is user-initiated and retryable, unlike the restore
    /// path where a failed fetch invalidates the whole session.
    pub async fn refresh_user(&mut self, api: &ApiClient) -> Result<User> {
        let token = self
            .token
            .clone()
            .context("Not logged in")?;

        match api.with_token(token).fetch_me().await {
            Ok(user) => {
                let user = self.cache_user(user);
                Ok(user)
            }
            Err(e) => {
                self.user = None;
                if let Err(remove_err) = self.store.remove(USER_KEY) {
                    warn!(error = %remove_err, "Failed to remove cached user");
                }
                Err(anyhow::Error::new(e).context("Failed to refresh user"))
            }
        }
    }

    /// Mark the password step of the login handshake as in flight.
    pub fn begin_login(&mut self) {
        debug_assert!(self.token.is_none());
        self.transition(SessionPhase::Authenticating);
    }

    /// Mark the OTP step of the login handshake as in flight.
    pub fn begin_otp_verification(&mut self) {
        debug_assert!(self.token.is_none());
        self.transition(SessionPhase::VerifyingOtp);
    }

    /// Abandon an uncommitted login handshake.
    pub fn abort_login(&mut self) {
        if self.token.is_none() {
            self.transition(SessionPhase::Absent);
        }
    }

    fn cache_user(&mut self, mut user: User) -> User {
        user.id = id::normalize(&user.id);
        match serde_json::to_string(&user) {
            Ok(json) => {
                if let Err(e) = self.store.set(USER_KEY, &json) {
                    warn!(error = %e, "Failed to persist user record");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize user record"),
        }
        self.user = Some(user.clone());
        user
    }

    fn clear_store(&mut self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "Failed to remove session key");
            }
        }
    }

    #[cfg(test)]
    fn store(&self) -> &S {
        &self.store
    }
}
