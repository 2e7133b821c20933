//! Persisted key-value session store
//!
//! Stands in for browser local storage: a flat string map holding the access
//! and refresh tokens under fixed keys. File-backed stores write the whole map
//! atomically (temp file + rename) on every mutation so a crash never leaves a
//! half-written session behind. A tokio Mutex serializes mutations coming from
//! concurrent requests and the refresh path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use common::Secret;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::error::{Error, Result};

/// Snapshot of the two session credentials. Either may be absent.
#[derive(Debug, Clone, Default)]
pub struct SessionTokens {
    pub access: Option<Secret<String>>,
    pub refresh: Option<Secret<String>>,
}

impl SessionTokens {
    /// Anonymous session: nothing stored.
    pub fn is_anonymous(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// Process-wide session store.
///
/// `path: None` keeps everything in memory; otherwise the map is mirrored to a
/// JSON object file after each mutation.
pub struct SessionStore {
    path: Option<PathBuf>,
    state: Mutex<BTreeMap<String, String>>,
}

impl SessionStore {
    /// Ephemeral store, lost when the process exits.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(BTreeMap::new()),
        }
    }

    /// Load a file-backed store.
    ///
    /// A missing file is a cold start (anonymous session); the empty file is
    /// created right away so later loads take the normal path.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading session file: {e}")))?;
            let entries: BTreeMap<String, String> = serde_json::from_str(&contents)
                .map_err(|e| Error::Parse(format!("parsing session file: {e}")))?;
            info!(path = %path.display(), keys = entries.len(), "loaded session");
            entries
        } else {
            info!(path = %path.display(), "session file not found, starting anonymous");
            let entries = BTreeMap::new();
            write_atomic(&path, &entries).await?;
            entries
        };

        Ok(Self {
            path: Some(path),
            state: Mutex::new(state),
        })
    }

    /// Read a single key.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.state.lock().await.get(key).cloned()
    }

    /// Write a single key and persist.
    pub async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut state = self.state.lock().await;
        state.insert(key.to_string(), value);
        debug!(key, "session key set");
        self.persist(&state).await
    }

    /// Remove a single key and persist. Returns whether it was present.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let removed = state.remove(key).is_some();
        if removed {
            debug!(key, "session key removed");
            self.persist(&state).await?;
        }
        Ok(removed)
    }

    /// Drop every key (sign-out, irrecoverable refresh failure).
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.clear();
        info!("session cleared");
        self.persist(&state).await
    }

    /// Current access token, if signed in.
    pub async fn access_token(&self) -> Option<Secret<String>> {
        self.get(ACCESS_TOKEN_KEY).await.and_then(Secret::non_empty)
    }

    /// Current refresh token, if any.
    pub async fn refresh_token(&self) -> Option<Secret<String>> {
        self.get(REFRESH_TOKEN_KEY).await.and_then(Secret::non_empty)
    }

    /// Store a freshly minted token pair.
    ///
    /// The refresh token is only overwritten when the server returned one;
    /// `None` keeps the previously stored value.
    pub async fn store_tokens(&self, access: &str, refresh: Option<&str>) -> Result<()> {
        let mut state = self.state.lock().await;
        state.insert(ACCESS_TOKEN_KEY.to_string(), access.to_string());
        if let Some(refresh) = refresh {
            state.insert(REFRESH_TOKEN_KEY.to_string(), refresh.to_string());
        }
        debug!(rotated_refresh = refresh.is_some(), "stored session tokens");
        self.persist(&state).await
    }

    /// Snapshot of both credentials.
    pub async fn tokens(&self) -> SessionTokens {
        let state = self.state.lock().await;
        SessionTokens {
            access: state.get(ACCESS_TOKEN_KEY).cloned().and_then(Secret::non_empty),
            refresh: state.get(REFRESH_TOKEN_KEY).cloned().and_then(Secret::non_empty),
        }
    }

    /// Whether the store holds no keys at all.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.is_empty()
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn persist(&self, state: &BTreeMap<String, String>) -> Result<()> {
        match &self.path {
            Some(path) => write_atomic(path, state).await,
            None => Ok(()),
        }
    }
}

/// Write the session map to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over the
/// target. The file holds bearer tokens, so it is restricted to 0600 on unix.
async fn write_atomic(path: &Path, data: &BTreeMap<String, String>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| Error::Parse(format!("serializing session: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("session path has no parent directory".into()))?;

    if !dir.as_os_str().is_empty() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::Io(format!("creating session directory: {e}")))?;
    }

    let tmp_path = dir.join(format!(".session.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp session file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting session file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp session file: {e}")))?;

    debug!(path = %path.display(), "persisted session");
    Ok(())
}
