use crate::error::AppError;
use crate::model::Task;
use crate::recurrence::{TriggerSpec, triggers};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authorization {
    Authorized,
    Provisional,
    Denied,
    NotDetermined,
}

impl Authorization {
    pub fn allows_reminders(self) -> bool {
        matches!(self, Authorization::Authorized | Authorization::Provisional)
    }
}

pub trait PermissionSource {
    fn current_authorization(&self) -> Authorization;

    /// Fire-and-forget; the outcome shows up in later
    /// [`PermissionSource::current_authorization`] calls.
    fn request_authorization(&self);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub identifier: String,
    pub task_id: String,
    pub title: String,
    pub body: String,
    pub trigger: TriggerSpec,
}

pub trait ReminderSink {
    fn install(&mut self, request: &ReminderRequest) -> Result<(), AppError>;

    fn clear_all(&mut self) -> Result<(), AppError>;
}

/// One request per `(task, trigger)` pair, identified as `<task-id>-<index>`.
/// Tasks without triggers contribute nothing.
pub fn reminder_requests(tasks: &[Task]) -> Vec<ReminderRequest> {
    tasks
        .iter()
        .flat_map(|task| {
            triggers(task.schedule)
                .into_iter()
                .enumerate()
                .map(move |(index, trigger)| ReminderRequest {
                    identifier: format!("{}-{}", task.id, index),
                    task_id: task.id.clone(),
                    title: task.title.clone(),
                    body: task.detail.clone(),
                    trigger,
                })
        })
        .collect()
}

#[derive(Debug)]
pub struct ReminderFailure {
    pub identifier: String,
    pub error: AppError,
}

#[derive(Debug, Default)]
pub struct ReminderOutcome {
    /// Set when the permission gate stopped the pass.
    pub skipped: Option<Authorization>,
    pub installed: Vec<String>,
    pub failures: Vec<ReminderFailure>,
}

/// Keeps a sink's installed set equal to the expansion of a task list.
pub struct ReminderSynchronizer<S> {
    sink: Mutex<S>,
}

impl<S: ReminderSink> ReminderSynchronizer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Clear-then-install under one lock, so passes never interleave.
    pub fn synchronize(
        &self,
        tasks: &[Task],
        permissions: &dyn PermissionSource,
    ) -> Result<ReminderOutcome, AppError> {
        let authorization = permissions.current_authorization();
        if !authorization.allows_reminders() {
            debug!(?authorization, "reminder sync skipped");
            return Ok(ReminderOutcome {
                skipped: Some(authorization),
                ..ReminderOutcome::default()
            });
        }

        let mut sink = self
            .sink
            .lock()
            .map_err(|_| AppError::io("reminder sink lock poisoned"))?;
        sink.clear_all()?;

        let mut outcome = ReminderOutcome::default();
        for request in reminder_requests(tasks) {
            match sink.install(&request) {
                Ok(()) => outcome.installed.push(request.identifier),
                Err(error) => {
                    warn!(identifier = %request.identifier, error = %error, "reminder install failed");
                    outcome.failures.push(ReminderFailure {
                        identifier: request.identifier,
                        error,
                    });
                }
            }
        }

        info!(
            installed = outcome.installed.len(),
            failed = outcome.failures.len(),
            "reminders synchronized"
        );
        Ok(outcome)
    }

    pub fn into_sink(self) -> Result<S, AppError> {
        self.sink
            .into_inner()
            .map_err(|_| AppError::io("reminder sink lock poisoned"))
    }
}
