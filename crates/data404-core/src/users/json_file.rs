//! Flat JSON file backend: one document mapping username to record.
//!
//! Every call re-reads the whole file, and every `put` rewrites it through a
//! sibling temp file plus rename so a crash mid-write leaves either the old
//! or the new document on disk, never a truncated one.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::CoreError;

use super::backend::UserBackend;
use super::types::{StoredUser, UserRecord};

type StoreDocument = BTreeMap<String, StoredUser>;

pub struct JsonFileBackend {
    path: PathBuf,
    // Serializes the read-modify-write inside `put`.
    write_lock: Mutex<()>,
}

impl JsonFileBackend {
    /// Open the store at `path`, creating it (and missing parent
    /// directories) as an empty document when absent. An existing file must
    /// parse.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            write_atomically(&path, b"{}\n")?;
            tracing::info!(path = %path.display(), "created empty user store");
        }

        let backend = Self {
            path,
            write_lock: Mutex::new(()),
        };
        let count = backend.load()?.len();
        tracing::debug!(path = %backend.path.display(), users = count, "user store opened");
        Ok(backend)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreDocument, CoreError> {
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(StoreDocument::new());
        }
        serde_json::from_str(&content).map_err(|e| CoreError::StoreParse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn save(&self, document: &StoreDocument) -> Result<(), CoreError> {
        let mut content = serde_json::to_string_pretty(document)
            .map_err(|e| CoreError::StoreEncode(e.to_string()))?;
        content.push('\n');
        write_atomically(&self.path, content.as_bytes())
    }
}

impl UserBackend for JsonFileBackend {
    fn get(&self, username: &str) -> Result<Option<UserRecord>, CoreError> {
        let mut document = self.load()?;
        Ok(document
            .remove(username)
            .map(|stored| stored.into_record(username.to_string())))
    }

    fn put(&self, record: UserRecord) -> Result<(), CoreError> {
        let _guard = self.write_lock.lock().map_err(|_| CoreError::LockPoisoned)?;
        let mut document = self.load()?;
        document.insert(record.username.clone(), StoredUser::from(record));
        self.save(&document)
    }

    fn scan(&self) -> Result<Vec<UserRecord>, CoreError> {
        Ok(self
            .load()?
            .into_iter()
            .map(|(username, stored)| stored.into_record(username))
            .collect())
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let tmp = temp_path_for(path);
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("users.json"));
    name.push(".tmp");
    path.with_file_name(name)
}
