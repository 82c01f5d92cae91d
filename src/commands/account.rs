//! Account commands: register, login, logout, whoami, refresh.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::api::ApiError;
use crate::auth::{handshake, CredentialStore, LoginStep};
use crate::feed;
use crate::otp;
use crate::utils::format_optional;

use super::Ctx;

/// Create a new account. The backend enrolls every account in TOTP at
/// registration, so this prints the secret and the otpauth URI for the
/// user's authenticator app.
pub async fn register(ctx: &mut Ctx, username: &str, email: &str) -> Result<()> {
    let password = prompt_new_password()?;
    let response = ctx.api.register(username, email, &password).await?;

    let uri = otp::provisioning_uri(&response.user.username, &response.otp_secret)?;
    println!("Account created: {}", response.user.username);
    println!();
    println!("TOTP secret:  {}", response.otp_secret);
    println!("otpauth URI:  {}", uri);
    println!();
    println!("Add the secret to an authenticator app, then run `quill login`.");
    Ok(())
}

/// Log in: password step, then the TOTP step when the account requires it.
pub async fn login(ctx: &mut Ctx, username: Option<String>, remember: bool) -> Result<()> {
    if ctx.session.is_authenticated() {
        bail!("Already logged in - run `quill logout` first");
    }

    let username = match username.or_else(|| ctx.config.last_username.clone()) {
        Some(u) => u,
        None => prompt_line("Username: ")?,
    };
    let had_stored = CredentialStore::has_credentials(&username);
    let mut using_stored = had_stored;
    let mut password = if using_stored {
        CredentialStore::get_password(&username)?
    } else {
        rpassword::prompt_password("Password: ").context("Failed to read password")?
    };

    ctx.session.begin_login();
    let step = loop {
        match handshake::start(&ctx.api, &username, &password).await {
            Ok(step) => break step,
            // A stale keychain entry (password changed elsewhere) falls
            // back to the prompt instead of failing every login
            Err(e) if using_stored && is_credential_rejection(&e) => {
                eprintln!("Stored password rejected: {e}");
                using_stored = false;
                password =
                    rpassword::prompt_password("Password: ").context("Failed to read password")?;
            }
            Err(e) => {
                ctx.session.abort_login();
                return Err(e).context("Login failed");
            }
        }
    };

    let (token, user) = match step {
        LoginStep::Complete { token, user } => (token, user),
        LoginStep::OtpRequired(pending) => {
            ctx.session.begin_otp_verification();
            loop {
                let code = prompt_line("OTP code (empty to abort): ")?;
                if code.is_empty() {
                    ctx.session.abort_login();
                    bail!("Login aborted");
                }
                // A failed code leaves the pending login intact for retry
                match pending.verify(&ctx.api, &code).await {
                    Ok(credential) => break credential,
                    Err(e) => eprintln!("OTP verification failed: {e}"),
                }
            }
        }
    };

    ctx.session.login(token, user)?;

    ctx.config.last_username = Some(username.clone());
    if let Err(e) = ctx.config.save() {
        warn!(error = %e, "Failed to save config");
    }
    // Refresh a stale keychain entry that the fallback replaced
    if remember || (had_stored && !using_stored) {
        if let Err(e) = CredentialStore::store(&username, &password) {
            warn!(error = %e, "Failed to store password in keychain");
        }
    }

    let user = ctx.require_user()?;
    println!("Logged in as {} (id {})", user.username, user.id);
    Ok(())
}

/// Log out. Never fails: the remote call is best-effort and local state is
/// cleared regardless.
pub async fn logout(ctx: &mut Ctx) -> Result<()> {
    if !ctx.session.is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }
    ctx.session.logout(&ctx.api).await;
    println!("Logged out.");
    Ok(())
}

/// Show the logged-in user's profile and activity counts.
pub async fn whoami(ctx: &mut Ctx) -> Result<()> {
    let user = ctx.require_user()?.clone();
    let stats = feed::user_stats(&ctx.api, &user.id).await?;

    // Older backend versions omit the flag from the user record
    let otp_enabled = match user.has_otp {
        Some(enabled) => enabled,
        None => ctx.authed()?.fetch_otp_status().await?.enabled,
    };

    println!("{} (id {})", user.username, user.id);
    println!("  email: {}", user.email);
    println!("  bio:   {}", format_optional(&user.bio, "-"));
    println!("  otp:   {}", if otp_enabled { "enabled" } else { "disabled" });
    println!(
        "  {} posts, {} likes, {} comments",
        stats.posts, stats.likes, stats.comments
    );
    Ok(())
}

/// Re-fetch the logged-in user's profile from the backend.
pub async fn refresh(ctx: &mut Ctx) -> Result<()> {
    let user = ctx.session.refresh_user(&ctx.api).await?;
    println!("Profile refreshed: {} (id {})", user.username, user.id);
    Ok(())
}

/// Permanently delete the logged-in user's account.
pub async fn delete_account(ctx: &mut Ctx) -> Result<()> {
    let user = ctx.require_user()?.clone();

    let confirm = prompt_line(&format!(
        "Type '{}' to permanently delete this account: ",
        user.username
    ))?;
    if confirm != user.username {
        bail!("Confirmation did not match, nothing deleted");
    }

    ctx.authed()?.delete_user(&user.id).await?;
    if CredentialStore::has_credentials(&user.username) {
        if let Err(e) = CredentialStore::delete(&user.username) {
            warn!(error = %e, "Failed to remove saved password");
        }
    }
    // The backend already invalidated the token along with the account
    ctx.session.discard();
    println!("Account deleted.");
    Ok(())
}

/// Whether a failed password step means the credentials themselves were
/// rejected (worth re-prompting) rather than the request not getting
/// through.
fn is_credential_rejection(err: &ApiError) -> bool {
    !matches!(err, ApiError::Network(_) | ApiError::ServerError(_))
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}

fn prompt_new_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
    let confirm =
        rpassword::prompt_password("Confirm password: ").context("Failed to read password")?;
    if password != confirm {
        bail!("Passwords do not match");
    }
    Ok(password)
}
