use crate::config::app_file_path;
use crate::error::AppError;
use crate::notify::{Notifier, activation_argument};
use crate::reminders::{ReminderFailure, ReminderRequest, ReminderSink};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::PrimitiveDateTime;

pub const SCHEMA_VERSION: u32 = 1;
const REMINDERS_FILE_NAME: &str = "reminders.json";
const REMINDERS_ENV_VAR: &str = "UPKEEP_REMINDERS_PATH";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredReminders {
    schema_version: u32,
    #[serde(default)]
    requests: Vec<ReminderRequest>,
}

pub fn reminders_path() -> Result<PathBuf, AppError> {
    app_file_path(REMINDERS_ENV_VAR, REMINDERS_FILE_NAME)
}

#[derive(Debug, Default)]
pub struct FireOutcome {
    pub fired: Vec<ReminderRequest>,
    pub failures: Vec<ReminderFailure>,
}

/// Reminder sink persisting installed requests to a JSON file. A periodic
/// `fire_due` call (cron, systemd timer, task scheduler) shows the ones whose
/// trigger matches the current hour.
#[derive(Debug, Clone)]
pub struct FileReminderSink {
    path: PathBuf,
}

impl FileReminderSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn installed(&self) -> Result<Vec<ReminderRequest>, AppError> {
        Ok(self.load()?.requests)
    }

    pub fn fire_due(
        &self,
        now: PrimitiveDateTime,
        notifier: &dyn Notifier,
    ) -> Result<FireOutcome, AppError> {
        let mut outcome = FireOutcome::default();

        for request in self.installed()? {
            if !request.trigger.matches(now.month(), now.day(), now.hour()) {
                continue;
            }

            let action = activation_argument(&request.task_id);
            match notifier.notify_with_action(&request, &action) {
                Ok(()) => outcome.fired.push(request),
                Err(error) => outcome.failures.push(ReminderFailure {
                    identifier: request.identifier.clone(),
                    error,
                }),
            }
        }

        Ok(outcome)
    }

    fn load(&self) -> Result<StoredReminders, AppError> {
        if !self.path.exists() {
            return Ok(StoredReminders {
                schema_version: SCHEMA_VERSION,
                requests: Vec::new(),
            });
        }

        let content = std::fs::read_to_string(&self.path)?;
        let stored: StoredReminders = serde_json::from_str(&content)?;
        if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
            return Err(AppError::invalid_data("schema_version mismatch"));
        }
        Ok(stored)
    }

    fn save(&self, requests: Vec<ReminderRequest>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredReminders {
            schema_version: SCHEMA_VERSION,
            requests,
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;
        Ok(())
    }
}

impl ReminderSink for FileReminderSink {
    fn install(&mut self, request: &ReminderRequest) -> Result<(), AppError> {
        let mut requests = self.load()?.requests;
        requests.retain(|existing| existing.identifier != request.identifier);
        requests.push(request.clone());
        self.save(requests)
    }

    fn clear_all(&mut self) -> Result<(), AppError> {
        self.save(Vec::new())
    }
}
