use crate::model::Task;
use crate::model::month_number;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::Month;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Complete")]
    Complete,
}

impl TaskStatus {
    pub fn display_name(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not Started",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Complete => "Complete",
        }
    }
}

/// Status, spend and note for one occurrence of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub note: String,
}

/// One `(task, year, month)` occurrence. Rendered as `<task-id>-<year>-<month>`
/// in the persisted progress blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccurrenceKey {
    pub task_id: String,
    pub year: i32,
    pub month: Month,
}

impl OccurrenceKey {
    pub fn new(task: &Task, year: i32, month: Month) -> Self {
        Self {
            task_id: task.id.clone(),
            year,
            month,
        }
    }

    /// Splits from the right so task ids containing `-` survive.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.rsplitn(3, '-');
        let month = parts.next()?.parse::<u8>().ok()?;
        let year = parts.next()?.parse::<i32>().ok()?;
        let task_id = parts.next()?;
        if task_id.is_empty() {
            return None;
        }

        Some(Self {
            task_id: task_id.to_string(),
            year,
            month: Month::try_from(month).ok()?,
        })
    }
}

impl fmt::Display for OccurrenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.task_id, self.year, u8::from(self.month))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTaskRecord {
    #[serde(with = "month_number")]
    pub month: Month,
    pub task: Task,
}
