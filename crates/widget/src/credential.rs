//! API key handling: validation policies, the on-disk store, and the
//! holder that ties them together for a session.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use tracing::warn;
use zeroize::Zeroize;

use shared::error::ChatError;

/// File name of the single persisted entry under the config directory.
const KEY_FILE_NAME: &str = "gemini_api_key";

/// An opaque credential. Wiped from memory on drop; never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    fn new(raw: &str) -> Self {
        Self(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Which shape of input counts as a plausible key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Google API keys: must start with `AIza` and exceed 20 characters.
    GooglePrefixed,
    /// Any non-empty trimmed string.
    AnyNonEmpty,
}

impl KeyPolicy {
    pub fn validate(&self, raw: &str) -> Result<ApiKey, ChatError> {
        let trimmed = raw.trim();
        match self {
            KeyPolicy::GooglePrefixed => {
                if trimmed.starts_with("AIza") && trimmed.len() > 20 {
                    Ok(ApiKey::new(trimmed))
                } else {
                    Err(ChatError::InvalidKey(
                        "That doesn't look like a valid Google API key. It should start with 'AIza'. Please try again.".to_string(),
                    ))
                }
            }
            KeyPolicy::AnyNonEmpty => {
                if trimmed.is_empty() {
                    Err(ChatError::InvalidKey("Please enter an API key.".to_string()))
                } else {
                    Ok(ApiKey::new(trimmed))
                }
            }
        }
    }
}

/// One fixed-name entry on disk, so the key survives a reload.
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    pub fn open_default() -> Self {
        let dir = directories::ProjectDirs::from("com.local", "Sidekick", "Sidekick")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: dir.join(KEY_FILE_NAME),
        }
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Option<ApiKey> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(ApiKey::new(trimmed))
        }
    }

    /// Overwrites any previously saved key.
    pub fn save(&self, key: &ApiKey) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating key store dir {:?}", parent))?;
        }
        fs::write(&self.path, key.as_str())
            .with_context(|| format!("writing key store entry {:?}", self.path))
    }
}

/// Owns the key for one session. Session-only for the chat popup,
/// store-backed for the code panels.
pub struct CredentialHolder {
    policy: KeyPolicy,
    store: Option<KeyStore>,
    key: Option<ApiKey>,
}

impl CredentialHolder {
    pub fn session_only(policy: KeyPolicy) -> Self {
        Self {
            policy,
            store: None,
            key: None,
        }
    }

    /// Store-backed holder; loads any previously saved key at startup.
    pub fn persistent(policy: KeyPolicy, store: KeyStore) -> Self {
        let key = store.load();
        Self {
            policy,
            store: Some(store),
            key,
        }
    }

    pub fn get(&self) -> Option<&ApiKey> {
        self.key.as_ref()
    }

    /// Validate and adopt a key; persists when a store is attached. A
    /// persistence failure keeps the key usable for the session.
    pub fn set(&mut self, raw: &str) -> Result<(), ChatError> {
        let key = self.policy.validate(raw)?;
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&key) {
                warn!("failed to persist API key: {:#}", e);
            }
        }
        self.key = Some(key);
        Ok(())
    }
}
