//! Durable storage for the access credential.
//!
//! In a browser this is the `accessKey` cookie scoped to path `/`. The
//! controller only needs three things from it (save, load, clear), so the
//! seam is the small [`CredentialStore`] trait. Two implementations ship:
//!
//! - [`MemoryCredentialStore`]: lives as long as the process. Tests, and
//!   embedders that persist the credential some other way.
//! - [`FileCredentialStore`]: a JSON cookie record on disk, surviving
//!   restarts like a persistent cookie survives page reloads.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use portico_protocol::AccessCredential;
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Name the credential is stored under.
pub const CREDENTIAL_COOKIE: &str = "accessKey";

/// Path scope of the stored credential.
pub const CREDENTIAL_PATH: &str = "/";

/// Persists the access credential between page lifecycles.
pub trait CredentialStore: Send + Sync {
    /// Stores `credential`, replacing any previous one.
    fn save(&self, credential: &AccessCredential) -> Result<(), SessionError>;

    /// Returns the stored credential, if any.
    fn load(&self) -> Result<Option<AccessCredential>, SessionError>;

    /// Removes the stored credential. Clearing an empty store is not an
    /// error.
    fn clear(&self) -> Result<(), SessionError>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn save(&self, credential: &AccessCredential) -> Result<(), SessionError> {
        (**self).save(credential)
    }

    fn load(&self) -> Result<Option<AccessCredential>, SessionError> {
        (**self).load()
    }

    fn clear(&self) -> Result<(), SessionError> {
        (**self).clear()
    }
}

// ---------------------------------------------------------------------------
// MemoryCredentialStore
// ---------------------------------------------------------------------------

/// A [`CredentialStore`] that keeps the credential in memory.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<AccessCredential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `credential`, as if a previous page
    /// had saved it.
    pub fn holding(credential: impl Into<AccessCredential>) -> Self {
        Self {
            slot: Mutex::new(Some(credential.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, credential: &AccessCredential) -> Result<(), SessionError> {
        *self.slot.lock().unwrap_or_else(|p| p.into_inner()) = Some(credential.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<AccessCredential>, SessionError> {
        Ok(self.slot.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.slot.lock().unwrap_or_else(|p| p.into_inner()).take();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileCredentialStore
// ---------------------------------------------------------------------------

/// On-disk shape of the stored credential: a cookie without the browser.
#[derive(Debug, Serialize, Deserialize)]
struct CookieRecord {
    name: String,
    value: AccessCredential,
    path: String,
}

/// A [`CredentialStore`] backed by a JSON file.
///
/// The file holds a single cookie record:
///
/// ```json
/// { "name": "accessKey", "value": "<credential>", "path": "/" }
/// ```
///
/// A missing file means "no credential". A record with a different name or
/// path is ignored, the same way a browser wouldn't send a cookie scoped
/// elsewhere. On Unix the file is created with mode `0600`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where the record lives.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, credential: &AccessCredential) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(SessionError::Store)?;
        }
        let record = CookieRecord {
            name: CREDENTIAL_COOKIE.to_string(),
            value: credential.clone(),
            path: CREDENTIAL_PATH.to_string(),
        };
        let bytes = serde_json::to_vec_pretty(&record).map_err(SessionError::CorruptRecord)?;
        fs::write(&self.path, bytes).map_err(SessionError::Store)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(SessionError::Store)?;
        }

        tracing::debug!(path = %self.path.display(), "credential saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<AccessCredential>, SessionError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Store(e)),
        };
        let record: CookieRecord =
            serde_json::from_slice(&bytes).map_err(SessionError::CorruptRecord)?;

        if record.name != CREDENTIAL_COOKIE || record.path != CREDENTIAL_PATH {
            tracing::debug!(name = %record.name, path = %record.path, "ignoring out-of-scope record");
            return Ok(None);
        }
        Ok(Some(record.value))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "credential removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Store(e)),
        }
    }
}
