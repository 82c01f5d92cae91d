//! Persistent key-value store backing the session.
//!
//! The session occupies exactly two keys: `authToken` holds the raw bearer
//! token and `user` holds the JSON-serialized user record. The store is a
//! trait so tests can swap in an in-memory implementation with injectable
//! write failures.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Store key for the raw bearer token.
pub const TOKEN_KEY: &str = "authToken";

/// Store key for the JSON-serialized user record.
pub const USER_KEY: &str = "user";

pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// File-backed store: one file per key under the app cache directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session key: {}", key))?;
        Ok(Some(contents))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create session directory: {:?}", self.dir))?;
        std::fs::write(self.key_path(key), value)
            .with_context(|| format!("Failed to write session key: {}", key))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove session key: {}", key))?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{HashMap, HashSet};

    use anyhow::{anyhow, Result};

    use super::SessionStore;

    /// In-memory store with injectable failures for lifecycle tests.
    #[derive(Default)]
    pub struct MemStore {
        pub entries: HashMap<String, String>,
        /// Keys whose writes fail, to exercise the partial-write path.
        pub fail_set: HashSet<String>,
        /// When true, every read fails, to exercise the silent-restore path.
        pub fail_get: bool,
    }

    impl MemStore {
        pub fn with_session(token: &str, user_json: &str) -> Self {
            let mut store = Self::default();
            store
                .entries
                .insert(super::TOKEN_KEY.to_string(), token.to_string());
            store
                .entries
                .insert(super::USER_KEY.to_string(), user_json.to_string());
            store
        }
    }

    impl SessionStore for MemStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            if self.fail_get {
                return Err(anyhow!("injected read failure"));
            }
            Ok(self.entries.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if self.fail_set.contains(key) {
                return Err(anyhow!("injected write failure for {key}"));
            }
            self.entries.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.entries.remove(key);
            Ok(())
        }
    }
}
