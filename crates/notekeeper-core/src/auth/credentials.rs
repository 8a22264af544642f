use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use keyring::Entry;
use thiserror::Error;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Key the bearer credential is stored under.
pub const CREDENTIAL_KEY: &str = "accessToken";

const SERVICE_NAME: &str = "notekeeper";

/// Credential file name in the cache directory
const CREDENTIAL_FILE: &str = "credentials.json";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to access credential file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse credential file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Credential store lock poisoned")]
    Poisoned,
}

/// Client-local storage for the single active bearer credential.
///
/// Writes are last-write-wins; implementations do no coordination beyond
/// keeping individual reads and writes atomic.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<Option<String>, CredentialError>;
    fn set(&self, token: &str) -> Result<(), CredentialError>;
    fn remove(&self) -> Result<(), CredentialError>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.token.read().map_err(|_| CredentialError::Poisoned)?.clone())
    }

    fn set(&self, token: &str) -> Result<(), CredentialError> {
        *self.token.write().map_err(|_| CredentialError::Poisoned)? = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), CredentialError> {
        *self.token.write().map_err(|_| CredentialError::Poisoned)? = None;
        Ok(())
    }
}

/// JSON key/value file, the on-disk analogue of browser local storage.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileCredentialStore {
    pub fn new(cache_dir: &Path) -> Self {
        Self::at(cache_dir.join(CREDENTIAL_FILE))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            path,
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Entries to rewrite. A damaged file is replaced rather than blocking
    /// every later write.
    fn entries_for_write(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        match self.read_entries() {
            Err(CredentialError::Parse(e)) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable credential file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    /// Replace the file atomically, readable by the owner only.
    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp_file = NamedTempFile::new_in(dir)?;
        std::fs::write(tmp_file.path(), contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(tmp_file.path(), std::fs::Permissions::from_mode(0o600))?;
        }
        tmp_file.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<Option<String>, CredentialError> {
        let _guard = self.lock.read().map_err(|_| CredentialError::Poisoned)?;
        Ok(self.read_entries()?.remove(CREDENTIAL_KEY))
    }

    fn set(&self, token: &str) -> Result<(), CredentialError> {
        let _guard = self.lock.write().map_err(|_| CredentialError::Poisoned)?;
        let mut entries = self.entries_for_write()?;
        entries.insert(CREDENTIAL_KEY.to_string(), token.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self) -> Result<(), CredentialError> {
        let _guard = self.lock.write().map_err(|_| CredentialError::Poisoned)?;
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(CredentialError::Parse(e)) => {
                // A damaged file may still hold the token; drop it wholesale
                warn!(path = %self.path.display(), error = %e, "Removing unreadable credential file");
                std::fs::remove_file(&self.path)?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if entries.remove(CREDENTIAL_KEY).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// OS keychain entry.
pub struct KeyringCredentialStore {
    entry: Entry,
}

impl KeyringCredentialStore {
    pub fn new() -> Result<Self, CredentialError> {
        let entry = Entry::new(SERVICE_NAME, CREDENTIAL_KEY)?;
        Ok(Self { entry })
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self) -> Result<Option<String>, CredentialError> {
        match self.entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, token: &str) -> Result<(), CredentialError> {
        self.entry.set_password(token)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), CredentialError> {
        match self.entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => {
                debug!("No keychain credential to delete");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_overwrite_and_remove() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.get().unwrap(), None);

        store.set("first").unwrap();
        store.set("second").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("second"));

        store.remove().unwrap();
        assert_eq!(store.get().unwrap(), None);
        // Removing twice is fine
        store.remove().unwrap();
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileCredentialStore::new(dir.path());
        assert_eq!(store.get().unwrap(), None);
        store.set("abc").unwrap();

        let reopened = FileCredentialStore::new(dir.path());
        assert_eq!(reopened.get().unwrap().as_deref(), Some("abc"));

        let raw = std::fs::read_to_string(reopened.path()).unwrap();
        assert!(raw.contains(CREDENTIAL_KEY));

        reopened.remove().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_file_store_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = FileCredentialStore::at(path.clone());
        store.set("abc").unwrap();
        store.remove().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("theme"));
        assert!(!raw.contains(CREDENTIAL_KEY));
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CREDENTIAL_FILE);
        std::fs::write(&path, "not json").unwrap();

        let store = FileCredentialStore::at(path);
        assert!(matches!(store.get(), Err(CredentialError::Parse(_))));
    }

    #[test]
    fn test_file_store_recovers_from_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CREDENTIAL_FILE);
        std::fs::write(&path, r#"{"accessTok"#).unwrap();

        let store = FileCredentialStore::at(path.clone());
        store.set("fresh").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("fresh"));

        std::fs::write(&path, r#"{"accessTok"#).unwrap();
        store.remove().unwrap();
        assert!(!path.exists());
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_file_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        store.set("one").unwrap();
        store.set("two").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(CREDENTIAL_FILE)]);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CREDENTIAL_FILE);
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileCredentialStore::at(path.clone());
        store.set("secret").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
