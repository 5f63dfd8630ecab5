use crate::config::app_file_path;
use crate::error::AppError;
use crate::sync::{ChangeFeed, ChangeNotifier, KeyValueStore, change_channel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "store.json";
const STORE_ENV_VAR: &str = "UPKEEP_STORE_PATH";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredEntries {
    schema_version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    app_file_path(STORE_ENV_VAR, STORE_FILE_NAME)
}

/// Key-value store kept in one JSON file. Other processes writing the same
/// file show up as external changes on [`KeyValueStore::synchronize`].
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    last_seen: Option<String>,
    notifiers: Vec<ChangeNotifier>,
}

impl FileStore {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let last_seen = read_raw(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            last_seen,
            notifiers: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(&self) -> Result<StoredEntries, AppError> {
        match read_raw(&self.path)? {
            Some(content) => decode(&content).map_err(|err| {
                AppError::invalid_data(format!("{}: {}", self.path.display(), err.message()))
            }),
            None => Ok(StoredEntries {
                schema_version: SCHEMA_VERSION,
                entries: BTreeMap::new(),
            }),
        }
    }

    fn save_entries(&mut self, stored: &StoredEntries) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(stored)?;
        std::fs::write(&self.path, &content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)?;
        }

        self.last_seen = Some(content);
        Ok(())
    }
}

fn read_raw(path: &Path) -> Result<Option<String>, AppError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    Ok(Some(content))
}

fn decode(content: &str) -> Result<StoredEntries, AppError> {
    let stored: StoredEntries = serde_json::from_str(content)?;
    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }
    Ok(stored)
}

impl KeyValueStore for FileStore {
    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<(), AppError> {
        let value = String::from_utf8(value)
            .map_err(|_| AppError::invalid_input(format!("{key}: value is not UTF-8")))?;

        let mut stored = self.load_entries()?;
        stored.schema_version = SCHEMA_VERSION;
        stored.entries.insert(key.to_string(), value);
        self.save_entries(&stored)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let stored = self.load_entries()?;
        Ok(stored.entries.get(key).map(|value| value.clone().into_bytes()))
    }

    fn synchronize(&mut self) -> Result<(), AppError> {
        let current = read_raw(&self.path)?;
        if current == self.last_seen {
            return Ok(());
        }

        debug!(path = %self.path.display(), "store file changed on disk");
        self.last_seen = current;
        self.notifiers.retain(ChangeNotifier::notify);
        Ok(())
    }

    fn subscribe(&mut self) -> ChangeFeed {
        let (notifier, feed) = change_channel();
        self.notifiers.push(notifier);
        feed
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStore, SCHEMA_VERSION};
    use crate::sync::KeyValueStore;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("upkeep-{nanos}-{file_name}"))
    }

    #[test]
    fn set_and_get_round_trip() {
        let path = temp_path("store.json");
        let mut store = FileStore::open(&path).unwrap();

        store.set("selectedYear", b"2024".to_vec()).unwrap();
        let reopened = FileStore::open(&path).unwrap();
        let value = reopened.get("selectedYear").unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(value, Some(b"2024".to_vec()));
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let path = temp_path("missing-store.json");
        let store = FileStore::open(&path).unwrap();

        assert_eq!(store.get("taskProgress").unwrap(), None);
    }

    #[test]
    fn synchronize_announces_writes_from_other_handles() {
        let path = temp_path("shared-store.json");
        let mut first = FileStore::open(&path).unwrap();
        let feed = first.subscribe();
        first.set("selectedYear", b"2024".to_vec()).unwrap();

        first.synchronize().unwrap();
        assert!(feed.try_next().is_none());

        let mut second = FileStore::open(&path).unwrap();
        second.set("selectedYear", b"2025".to_vec()).unwrap();
        first.synchronize().unwrap();
        fs::remove_file(&path).ok();

        assert!(feed.try_next().is_some());
        assert!(feed.try_next().is_none());
    }

    #[test]
    fn schema_version_must_match() {
        let path = temp_path("bad-schema.json");
        let bad = format!(
            "{{\n  \"schema_version\": {},\n  \"entries\": {{}}\n}}",
            SCHEMA_VERSION + 1
        );
        fs::write(&path, bad).unwrap();

        let store = FileStore::open(&path).unwrap();
        let err = store.get("selectedYear").unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn corrupt_file_error_names_the_path() {
        let path = temp_path("corrupt-store.json");
        fs::write(&path, "{ not json").unwrap();
        let mut store = FileStore::open(&path).unwrap();

        let err = store.set("selectedYear", b"2024".to_vec()).unwrap_err();
        let content = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
        assert!(err.message().contains(&path.display().to_string()));
        assert_eq!(content, "{ not json");
    }

    #[test]
    fn rejects_non_utf8_values() {
        let path = temp_path("binary.json");
        let mut store = FileStore::open(&path).unwrap();

        let err = store.set("taskProgress", vec![0xff, 0xfe]).unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert!(!path.exists());
    }
}
