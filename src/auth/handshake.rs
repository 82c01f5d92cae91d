//! Two-step login handshake (password, then optional TOTP code).
//!
//! The pending state between the two steps is its own type rather than a
//! field on the session, so a temp token can never coexist with a committed
//! session token. Committing the final credential is the session's job
//! (`Session::login`); this module only drives the exchange.

use crate::api::{ApiClient, ApiError};
use crate::models::User;

/// Outcome of the password step.
pub enum LoginStep {
    /// No second factor configured; the backend issued a full credential.
    Complete { token: String, user: User },
    /// A TOTP code is required to finish the login.
    OtpRequired(PendingLogin),
}

/// Short-lived credential issued after a successful password check, valid
/// only for completing the OTP exchange. Dropped on success or when the
/// user abandons the login.
pub struct PendingLogin {
    temp_token: String,
}

/// Submit username + password. The backend either issues a full credential
/// or a temp token that must be exchanged with [`PendingLogin::verify`].
pub async fn start(
    api: &ApiClient,
    username: &str,
    password: &str,
) -> Result<LoginStep, ApiError> {
    let response = api.login_password(username, password).await?;

    if response.requires_otp || response.temp_token.is_some() {
        let temp_token = response.temp_token.ok_or_else(|| {
            ApiError::InvalidResponse("login requires OTP but no temp_token issued".to_string())
        })?;
        return Ok(LoginStep::OtpRequired(PendingLogin { temp_token }));
    }

    match (response.token, response.user) {
        (Some(token), Some(user)) => Ok(LoginStep::Complete { token, user }),
        _ => Err(ApiError::InvalidResponse(
            "login response missing token or user".to_string(),
        )),
    }
}

impl PendingLogin {
    /// Exchange the temp token and a TOTP code for a full credential.
    ///
    /// Takes `&self`: a failed attempt leaves the pending login intact so
    /// the user can retry with a fresh code.
    pub async fn verify(&self, api: &ApiClient, code: &str) -> Result<(String, User), ApiError> {
        let success = api.verify_otp(&self.temp_token, code).await?;
        Ok((success.token, success.user))
    }
}
