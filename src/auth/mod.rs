//! Authentication module: session lifecycle, login handshake, credentials.
//!
//! This module provides:
//! - `Session`: the token/user pair, its persistence, and its phase machine
//! - `SessionStore` / `FileStore`: the two-key persistent store behind it
//! - `handshake`: the password + TOTP login exchange
//! - `CredentialStore`: opt-in OS keychain storage of the account password

pub mod credentials;
pub mod handshake;
pub mod session;
pub mod store;

pub use credentials::CredentialStore;
pub use handshake::{LoginStep, PendingLogin};
pub use session::{Session, SessionPhase};
pub use store::{FileStore, SessionStore};
