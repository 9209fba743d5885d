//! Bearer-token storage and the identity derived from it.
//!
//! [`SessionStore`] is the single source of truth for the current token.
//! The actual persistence lives behind the [`TokenStore`] trait so tests
//! run against an in-memory backend and the CLI against a file, and so a
//! process without any persistent storage (a detached store) simply
//! behaves as anonymous.
//!
//! Storage I/O failures are deliberately non-fatal: a failed read acts
//! like an absent token, a failed write like a no-op, both with a
//! warning. Auth state degrades to "logged out" rather than breaking the
//! caller.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::token;

/// Persistence backend for the single bearer token.
///
/// Implementations hold at most one token at a time; `save` replaces any
/// prior value and `clear` is idempotent.
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any.
    fn load(&self) -> io::Result<Option<String>>;
    /// Store a token, replacing any prior value.
    fn save(&self, token: &str) -> io::Result<()>;
    /// Remove the stored token. Succeeds when nothing is stored.
    fn clear(&self) -> io::Result<()>;
}

/// In-memory token store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.inner.lock().expect("token store lock poisoned").clone())
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *self.inner.lock().expect("token store lock poisoned") = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.inner.lock().expect("token store lock poisoned") = None;
        Ok(())
    }
}

/// File-backed token store: one file holding exactly the token.
///
/// Survives process restarts, which is what makes a login session outlive
/// a single CLI invocation.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Owner of the current bearer token and the identity derived from it.
///
/// Cheap to clone; clones share the same backend, so a clear performed by
/// one (e.g. on a 401) is visible to all.
#[derive(Clone)]
pub struct SessionStore {
    store: Option<Arc<dyn TokenStore>>,
}

impl SessionStore {
    /// Create a session store over the given backend.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Create a session store with no persistence at all.
    ///
    /// Reads always yield an absent token and writes are discarded; the
    /// process behaves as permanently anonymous.
    pub fn detached() -> Self {
        Self { store: None }
    }

    /// Convenience constructor over a fresh [`MemoryTokenStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// The currently stored bearer token, if any.
    pub fn token(&self) -> Option<String> {
        let store = self.store.as_ref()?;
        match store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored token; treating as absent");
                None
            }
        }
    }

    /// Store a token, replacing any prior value. No format validation is
    /// performed; the server is the judge of validity.
    pub fn set_token(&self, token: &str) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        if let Err(e) = store.save(token) {
            tracing::warn!(error = %e, "Failed to persist token");
        }
    }

    /// Remove the stored token. Idempotent.
    pub fn clear_token(&self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        if let Err(e) = store.clear() {
            tracing::warn!(error = %e, "Failed to clear stored token");
        }
    }

    /// The `sub` claim of the current token, decoded on demand.
    ///
    /// Returns `None` when no token is stored or the token is malformed
    /// in any way; never errors. See [`token::decode_subject`].
    pub fn identity(&self) -> Option<String> {
        self.token().and_then(|t| token::decode_subject(&t))
    }

    /// Whether a token is currently stored. Says nothing about whether
    /// the server still accepts it.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("attached", &self.store.is_some())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
