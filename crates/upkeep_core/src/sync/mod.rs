//! Bridges the progress ledger to an external key-value store.
//!
//! Every save writes the whole snapshot under three fixed keys and every load
//! replaces the matching in-memory structure wholesale, so the most recent
//! successful save wins per key.

mod file_store;
mod memory_store;

pub use file_store::{FileStore, store_path};
pub use memory_store::{MemoryStore, SharedCloud};

use crate::error::AppError;
use crate::ledger::ProgressLedger;
use crate::model::{CustomTaskRecord, ProgressRecord, validate_year};
use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, warn};

pub const TASK_PROGRESS_KEY: &str = "taskProgress";
pub const CUSTOM_TASKS_KEY: &str = "customTasks";
pub const SELECTED_YEAR_KEY: &str = "selectedYear";

pub trait KeyValueStore {
    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<(), AppError>;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// Forces a round-trip with the backing store. Remote changes found here
    /// are announced through the change feed, not applied.
    fn synchronize(&mut self) -> Result<(), AppError>;

    /// Feed of "changed externally" notifications. They carry no diff.
    fn subscribe(&mut self) -> ChangeFeed;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalChange;

/// Sending half of a change feed. Safe to move to whatever thread the
/// transport calls back on.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: Sender<ExternalChange>,
}

impl ChangeNotifier {
    /// Returns false once the owning feed is gone.
    pub fn notify(&self) -> bool {
        self.sender.send(ExternalChange).is_ok()
    }
}

/// Receiving half of a change feed, drained on the ledger owner's context.
#[derive(Debug)]
pub struct ChangeFeed {
    receiver: Receiver<ExternalChange>,
}

impl ChangeFeed {
    pub fn try_next(&self) -> Option<ExternalChange> {
        self.receiver.try_recv().ok()
    }
}

pub fn change_channel() -> (ChangeNotifier, ChangeFeed) {
    let (sender, receiver) = mpsc::channel();
    (ChangeNotifier { sender }, ChangeFeed { receiver })
}

#[derive(Debug)]
pub struct LoadFailure {
    pub key: &'static str,
    pub error: AppError,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub applied: Vec<&'static str>,
    pub missing: Vec<&'static str>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    fn fail(&mut self, key: &'static str, error: AppError) {
        warn!(key, error = %error, "ignoring undecodable sync entry");
        self.failures.push(LoadFailure { key, error });
    }
}

pub struct SyncMediator<K> {
    store: K,
    feed: ChangeFeed,
}

impl<K: KeyValueStore> SyncMediator<K> {
    pub fn new(mut store: K) -> Self {
        let feed = store.subscribe();
        Self { store, feed }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut K {
        &mut self.store
    }

    pub fn save(&mut self, ledger: &ProgressLedger) -> Result<(), AppError> {
        let progress = serde_json::to_vec(ledger.progress_entries())?;
        let custom = serde_json::to_vec(&ledger.custom_records())?;
        let year = serde_json::to_vec(&ledger.selected_year())?;

        self.store.set(TASK_PROGRESS_KEY, progress)?;
        self.store.set(CUSTOM_TASKS_KEY, custom)?;
        self.store.set(SELECTED_YEAR_KEY, year)?;
        debug!(
            records = ledger.progress_entries().len(),
            custom_tasks = ledger.custom_records().len(),
            selected_year = ledger.selected_year(),
            "saved ledger snapshot"
        );
        Ok(())
    }

    /// Replaces each in-memory structure whose key decodes. Missing or
    /// malformed keys leave the current value in place.
    pub fn load(&self, ledger: &mut ProgressLedger) -> LoadReport {
        let mut report = LoadReport::default();

        match self.read::<BTreeMap<String, ProgressRecord>>(TASK_PROGRESS_KEY) {
            Ok(Some(progress)) => {
                ledger.replace_progress(progress);
                report.applied.push(TASK_PROGRESS_KEY);
            }
            Ok(None) => report.missing.push(TASK_PROGRESS_KEY),
            Err(err) => report.fail(TASK_PROGRESS_KEY, err),
        }

        match self.read::<Vec<CustomTaskRecord>>(CUSTOM_TASKS_KEY) {
            Ok(Some(records)) => {
                ledger.replace_custom_tasks(records);
                report.applied.push(CUSTOM_TASKS_KEY);
            }
            Ok(None) => report.missing.push(CUSTOM_TASKS_KEY),
            Err(err) => report.fail(CUSTOM_TASKS_KEY, err),
        }

        match self
            .read::<i32>(SELECTED_YEAR_KEY)
            .and_then(|year| year.map(validate_year).transpose())
        {
            Ok(Some(year)) => match ledger.set_selected_year(year) {
                Ok(()) => report.applied.push(SELECTED_YEAR_KEY),
                Err(err) => report.fail(SELECTED_YEAR_KEY, err),
            },
            Ok(None) => report.missing.push(SELECTED_YEAR_KEY),
            Err(err) => report.fail(SELECTED_YEAR_KEY, err),
        }

        debug!(
            applied = report.applied.len(),
            missing = report.missing.len(),
            failed = report.failures.len(),
            "loaded ledger snapshot"
        );
        report
    }

    fn read<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let Some(bytes) = self.store.get(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_slice(&bytes)
            .map_err(|err| AppError::invalid_data(format!("{key}: {err}")))?;
        Ok(Some(value))
    }

    pub fn synchronize(&mut self) -> Result<(), AppError> {
        self.store.synchronize()
    }

    /// Next queued external change, if any.
    pub fn next_change(&self) -> Option<ExternalChange> {
        self.feed.try_next()
    }
}
