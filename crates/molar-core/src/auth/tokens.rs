//! Durable token storage.
//!
//! Access and refresh tokens are two opaque strings kept under fixed keys.
//! Storage is read at request-send time and written at login, refresh, and
//! logout, so every implementation must be safe to share across tasks.

use std::path::PathBuf;
use std::sync::RwLock;

use anyhow::{Context, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};

/// Keyring service name / storage directory name
const SERVICE_NAME: &str = "molar";

/// Fixed storage keys for the two credentials
const ACCESS_KEY: &str = "access-token";
const REFRESH_KEY: &str = "refresh-token";

/// Token file name for file-backed storage
const TOKEN_FILE: &str = "tokens.json";

/// Shared storage for the access/refresh token pair.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    /// Store both tokens, replacing any previous pair.
    fn store_pair(&self, access: &str, refresh: &str) -> Result<()>;
    /// Replace only the access token, keeping the refresh token.
    fn store_access(&self, access: &str) -> Result<()>;
    /// Remove both tokens. Must succeed when nothing is stored.
    fn clear(&self) -> Result<()>;
}

/// Token storage in the OS keychain.
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keyring entry")
    }

    fn read(&self, key: &str) -> Option<String> {
        self.entry(key).ok()?.get_password().ok()
    }

    fn delete(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn access_token(&self) -> Option<String> {
        self.read(ACCESS_KEY)
    }

    fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_KEY)
    }

    fn store_pair(&self, access: &str, refresh: &str) -> Result<()> {
        self.entry(ACCESS_KEY)?
            .set_password(access)
            .context("Failed to store access token in keychain")?;
        self.entry(REFRESH_KEY)?
            .set_password(refresh)
            .context("Failed to store refresh token in keychain")?;
        Ok(())
    }

    fn store_access(&self, access: &str) -> Result<()> {
        self.entry(ACCESS_KEY)?
            .set_password(access)
            .context("Failed to store access token in keychain")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.delete(ACCESS_KEY)?;
        self.delete(REFRESH_KEY)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredTokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// Token storage in a JSON file, for headless environments without a
/// keychain.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location under the platform cache directory.
    pub fn default_path() -> Result<PathBuf> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(SERVICE_NAME).join(TOKEN_FILE))
    }

    fn read(&self) -> StoredTokens {
        let Ok(contents) = std::fs::read_to_string(&self.path) else {
            return StoredTokens::default();
        };
        serde_json::from_str(&contents).unwrap_or_default()
    }

    fn write(&self, tokens: &StoredTokens) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create token storage directory")?;
        }
        let contents = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, contents).context("Failed to write token file")?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.read().access
    }

    fn refresh_token(&self) -> Option<String> {
        self.read().refresh
    }

    fn store_pair(&self, access: &str, refresh: &str) -> Result<()> {
        self.write(&StoredTokens {
            access: Some(access.to_string()),
            refresh: Some(refresh.to_string()),
        })
    }

    fn store_access(&self, access: &str) -> Result<()> {
        let mut tokens = self.read();
        tokens.access = Some(access.to_string());
        self.write(&tokens)
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove token file")?;
        }
        Ok(())
    }
}

/// In-memory token storage for tests and embedded use.
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: RwLock<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_read(&self) -> StoredTokens {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.lock_read().access
    }

    fn refresh_token(&self) -> Option<String> {
        self.lock_read().refresh
    }

    fn store_pair(&self, access: &str, refresh: &str) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.access = Some(access.to_string());
        inner.refresh = Some(refresh.to_string());
        Ok(())
    }

    fn store_access(&self, access: &str) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.access = Some(access.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *inner = StoredTokens::default();
        Ok(())
    }
}
