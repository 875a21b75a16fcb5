//! Access token persistence and the authenticated flag.
//!
//! The token lives in a single file next to the config (`~/.bihua/auth_token`). Its
//! presence is the whole of "authenticated"; it is never validated client-side.

use fs2::FileExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// File name of the stored token inside the config directory.
pub const TOKEN_FILE_NAME: &str = "auth_token";

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("token store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("token store poisoned")]
    Poisoned,
}

/// Where the access token is kept between runs.
pub trait TokenStore: Send + Sync {
    /// Stored token, if any. Blank counts as absent.
    fn load(&self) -> Result<Option<String>, TokenStoreError>;
    fn save(&self, token: &str) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Token kept in one file; writers take an exclusive lock.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/auth_token`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(TOKEN_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => {
                let t = s.trim();
                Ok(if t.is_empty() { None } else { Some(t.to_string()) })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)?;
        file.lock_exclusive()?;
        let written = file
            .set_len(0)
            .and_then(|_| file.write_all(token.as_bytes()))
            .and_then(|_| file.flush());
        let unlocked = FileExt::unlock(&file);
        written?;
        unlocked?;
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, used by tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        let guard = self.token.lock().map_err(|_| TokenStoreError::Poisoned)?;
        Ok(guard.clone().filter(|t| !t.trim().is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        let mut guard = self.token.lock().map_err(|_| TokenStoreError::Poisoned)?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let mut guard = self.token.lock().map_err(|_| TokenStoreError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

/// Authentication status, read from the store once at start-up and kept in sync on
/// login/logout. Passed by reference to whatever needs it.
pub struct AuthState {
    store: Arc<dyn TokenStore>,
    token: Option<String>,
}

impl AuthState {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let token = match store.load() {
            Ok(token) => token,
            Err(e) => {
                log::warn!("could not read stored token: {}", e);
                None
            }
        };
        Self { store, token }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Persist `token` and mark the session authenticated. Blank tokens are ignored.
    pub fn login(&mut self, token: &str) -> Result<bool, TokenStoreError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(false);
        }
        self.store.save(token)?;
        self.token = Some(token.to_string());
        log::info!("signed in");
        Ok(true)
    }

    /// Forget the token, both in memory and in the store.
    pub fn logout(&mut self) -> Result<(), TokenStoreError> {
        self.token = None;
        self.store.clear()?;
        log::info!("signed out");
        Ok(())
    }

    /// Raw token for the API client.
    pub fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }

    /// `Bearer <token>` header value.
    pub fn bearer_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bihua-auth-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn file_store_round_trip_and_clear() {
        let dir = temp_dir();
        let store = FileTokenStore::in_dir(&dir);
        assert_eq!(store.load().unwrap(), None);
        store.save("longer-token-value").unwrap();
        store.save("tok").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn state_reads_token_once_at_start() {
        let store = Arc::new(MemoryTokenStore::with_token("abc"));
        let auth = AuthState::new(store);
        assert!(auth.is_authenticated());
        assert_eq!(auth.bearer_header().as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn login_and_logout_update_store() {
        let store = Arc::new(MemoryTokenStore::new());
        let mut auth = AuthState::new(store.clone());
        assert!(!auth.is_authenticated());
        assert!(!auth.login("   ").unwrap());
        assert!(!auth.is_authenticated());
        assert!(auth.login(" t1 ").unwrap());
        assert_eq!(store.load().unwrap().as_deref(), Some("t1"));
        auth.logout().unwrap();
        assert!(!auth.is_authenticated());
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(auth.bearer_token(), None);
    }
}
