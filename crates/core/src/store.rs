use crate::traits::KeyValueStore;
use crate::StorageError;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

/// Key-value slots for one backend origin, kept in a single JSON object file.
///
/// The whole file is rewritten on every `set`, through a temp file renamed over
/// the old one.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    slots: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let slots = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|error| {
                warn!(path = %path.display(), %error, "state file is unreadable, starting empty");
                BTreeMap::new()
            }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(error) => return Err(error.into()),
        };

        Ok(Self { path, slots })
    }

    pub fn for_origin(state_dir: &Path, origin: &str) -> Result<Self, StorageError> {
        Self::open(state_dir.join(origin_file_name(origin)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value);

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let bytes = serde_json::to_vec_pretty(&self.slots)?;
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(&bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|error| error.error)?;
        Ok(())
    }
}

pub fn origin_file_name(origin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(origin.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{}.json", &digest[..16])
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_survives_reopen() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;

        let mut store = FileStore::for_origin(dir.path(), "http://localhost:5000")?;
        store.set("searchQueryHistory", r#"["movie"]"#.to_string())?;

        let reopened = FileStore::for_origin(dir.path(), "http://localhost:5000")?;
        assert_eq!(
            reopened.get("searchQueryHistory")?,
            Some(r#"["movie"]"#.to_string())
        );
        Ok(())
    }

    #[test]
    fn origins_do_not_share_slots() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;

        let mut local = FileStore::for_origin(dir.path(), "http://localhost:5000")?;
        local.set("searchQueryHistory", "[]".to_string())?;

        let other = FileStore::for_origin(dir.path(), "http://search.example:8080")?;
        assert_eq!(other.get("searchQueryHistory")?, None);
        assert_ne!(local.path(), other.path());
        Ok(())
    }

    #[test]
    fn missing_file_opens_empty() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = FileStore::open(dir.path().join("nested").join("state.json"))?;
        assert_eq!(store.get("anything")?, None);
        Ok(())
    }

    #[test]
    fn truncated_file_opens_empty() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let mut store = FileStore::for_origin(dir.path(), "http://localhost:5000")?;
        store.set("searchQueryHistory", r#"["movie","dinosaur planet"]"#.to_string())?;

        let written = fs::read(store.path())?;
        fs::write(store.path(), &written[..written.len() / 2])?;

        let mut reopened = FileStore::for_origin(dir.path(), "http://localhost:5000")?;
        assert_eq!(reopened.get("searchQueryHistory")?, None);

        reopened.set("searchQueryHistory", r#"["cse"]"#.to_string())?;
        let recovered = FileStore::for_origin(dir.path(), "http://localhost:5000")?;
        assert_eq!(
            recovered.get("searchQueryHistory")?,
            Some(r#"["cse"]"#.to_string())
        );
        Ok(())
    }

    #[test]
    fn rewrite_leaves_no_staging_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let mut store = FileStore::open(dir.path().join("state.json"))?;
        store.set("a", "1".to_string())?;
        store.set("b", "2".to_string())?;

        let names: Vec<_> = fs::read_dir(dir.path())?
            .map(|entry| entry.map(|entry| entry.file_name()))
            .collect::<Result<_, _>>()?;
        assert_eq!(names, vec![std::ffi::OsString::from("state.json")]);
        Ok(())
    }
}
