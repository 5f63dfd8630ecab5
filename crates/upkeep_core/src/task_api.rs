//! Entry points wiring the core to per-user files: the JSON key-value store,
//! the installed-reminder file and the config file.

use crate::config::config_path;
use crate::error::AppError;
use crate::model::{Task, catalog};
use crate::notify::{
    ConfigPermissions, FileReminderSink, FireOutcome, Notifier, notifier_from_env,
    reminders_path,
};
use crate::reminders::{PermissionSource, ReminderOutcome, ReminderRequest, ReminderSynchronizer};
use crate::store::HomeStore;
use crate::sync::{FileStore, LoadReport, store_path};
use std::path::Path;
use time::PrimitiveDateTime;

pub type FileHomeStore = HomeStore<FileStore>;

pub fn open_store(default_year: i32) -> Result<FileHomeStore, AppError> {
    let path = store_path()?;
    let (store, _) = open_store_with_path(&path, default_year)?;
    Ok(store)
}

fn open_store_with_path(
    path: &Path,
    default_year: i32,
) -> Result<(FileHomeStore, LoadReport), AppError> {
    let file_store = FileStore::open(path)?;
    Ok(HomeStore::open(file_store, catalog(), default_year))
}

/// Asks for reminder permission if the user was never asked, then replaces
/// the installed reminders with the expansion of `tasks`.
pub fn sync_reminders(tasks: &[Task]) -> Result<ReminderOutcome, AppError> {
    let permissions = ConfigPermissions::new(&config_path()?);
    let sink = FileReminderSink::new(&reminders_path()?);
    sync_reminders_with(sink, &permissions, tasks)
}

fn sync_reminders_with(
    sink: FileReminderSink,
    permissions: &dyn PermissionSource,
    tasks: &[Task],
) -> Result<ReminderOutcome, AppError> {
    permissions.request_authorization();
    ReminderSynchronizer::new(sink).synchronize(tasks, permissions)
}

pub fn installed_reminders() -> Result<Vec<ReminderRequest>, AppError> {
    FileReminderSink::new(&reminders_path()?).installed()
}

pub fn fire_due_reminders(now: PrimitiveDateTime) -> Result<FireOutcome, AppError> {
    let notifier = notifier_from_env()?;
    fire_due_reminders_with(&reminders_path()?, now, notifier.as_ref())
}

fn fire_due_reminders_with(
    path: &Path,
    now: PrimitiveDateTime,
    notifier: &dyn Notifier,
) -> Result<FireOutcome, AppError> {
    FileReminderSink::new(path).fire_due(now, notifier)
}
