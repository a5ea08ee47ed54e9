//! Flat JSON document store
//!
//! All slots live in one JSON object on disk. Every write rewrites the
//! document through a sibling temp file and a rename, so readers never see a
//! half-written file.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hauth_core::KeyValueStore;
use hauth_domain::Result;
use parking_lot::Mutex;

use crate::errors::InfraError;

type Document = BTreeMap<String, String>;

/// [`KeyValueStore`] backed by a single JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Document> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(err) => return Err(InfraError::from(err).into()),
        };

        if contents.trim().is_empty() {
            return Ok(Document::new());
        }

        serde_json::from_str(&contents).map_err(|err| InfraError::from(err).into())
    }

    fn write_document(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(InfraError::from)?;
        }

        let json = serde_json::to_string_pretty(document).map_err(InfraError::from)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(InfraError::from)?;
        fs::rename(&tmp, &self.path).map_err(InfraError::from)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Document)) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut document = self.read_document()?;
        apply(&mut document);
        self.write_document(&document)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_document()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|document| {
            document.insert(key.to_string(), value.to_string());
        })?;
        tracing::trace!(key, path = %self.path.display(), "storage.slot_written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|document| {
            document.remove(key);
        })
    }
}
