//! CLI command implementations.
//!
//! Each subcommand gets a `Ctx` holding the loaded config, an API client
//! for the resolved backend, and the restored session. Commands print
//! human-readable output to stdout and surface failures as errors; nothing
//! is retried automatically.

pub mod account;
pub mod posts;
pub mod users;

use anyhow::{Context as _, Result};
use tracing::warn;

use crate::api::{ApiClient, ApiError};
use crate::auth::{FileStore, Session};
use crate::config::Config;
use crate::models::User;

pub struct Ctx {
    pub config: Config,
    pub api: ApiClient,
    pub session: Session<FileStore>,
}

impl Ctx {
    /// Load config, build the API client, and restore any persisted
    /// session (including the self-healing current-user fetch).
    pub async fn init(api_url_override: Option<&str>) -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let base_url = config.resolve_api_url(api_url_override);
        let api = ApiClient::new(&base_url).context("Failed to build API client")?;

        let store = FileStore::new(Config::session_dir()?);
        let mut session = Session::new(store);
        if session.restore() {
            session.ensure_user(&api).await;
        }

        Ok(Self {
            config,
            api,
            session,
        })
    }

    /// An API client carrying the session token, or an error when logged
    /// out.
    pub fn authed(&self) -> Result<ApiClient> {
        let token = self
            .session
            .token()
            .context("Not logged in - run `quill login` first")?;
        Ok(self.api.with_token(token.to_string()))
    }

    /// The logged-in user record, or an error when logged out.
    pub fn require_user(&self) -> Result<&User> {
        self.session
            .user()
            .context("Not logged in - run `quill login` first")
    }

    /// Escalate a rejected token on an authenticated call into a forced
    /// logout, so the next invocation starts clean.
    pub async fn handle_auth_failure(&mut self, err: &anyhow::Error) {
        let invalid_token = err
            .downcast_ref::<ApiError>()
            .map(|e| e.is_auth_failure())
            .unwrap_or(false);
        if invalid_token && self.session.is_authenticated() {
            warn!("Token rejected by backend, clearing local session");
            self.session.logout(&self.api).await;
        }
    }
}
