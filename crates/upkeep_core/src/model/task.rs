use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub detail: String,
    pub schedule: Cadence,
}

impl Task {
    pub fn new(id: &str, title: &str, detail: &str, schedule: Cadence) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            detail: detail.to_string(),
            schedule,
        }
    }
}

/// Recurrence category of a task. `Custom` tasks are bound to a single
/// calendar month by the user and never auto-scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cadence {
    Monthly,
    Quarterly,
    Seasonal,
    Annual,
    Spring,
    Summer,
    Fall,
    Winter,
    Custom,
}

impl Cadence {
    pub const ALL: [Cadence; 9] = [
        Cadence::Monthly,
        Cadence::Quarterly,
        Cadence::Seasonal,
        Cadence::Annual,
        Cadence::Spring,
        Cadence::Summer,
        Cadence::Fall,
        Cadence::Winter,
        Cadence::Custom,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Cadence::Monthly => "Monthly",
            Cadence::Quarterly => "Quarterly",
            Cadence::Seasonal => "Seasonal",
            Cadence::Annual => "Annual",
            Cadence::Spring => "Spring",
            Cadence::Summer => "Summer",
            Cadence::Fall => "Fall",
            Cadence::Winter => "Winter",
            Cadence::Custom => "Custom",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Cadence {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Cadence::ALL
            .into_iter()
            .find(|cadence| cadence.display_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::invalid_input(format!("unknown cadence '{wanted}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::{Cadence, Task};

    #[test]
    fn cadence_parses_case_insensitively() {
        assert_eq!(" quarterly ".parse::<Cadence>().unwrap(), Cadence::Quarterly);
        assert_eq!("WINTER".parse::<Cadence>().unwrap(), Cadence::Winter);
        assert_eq!(
            "biweekly".parse::<Cadence>().unwrap_err().code(),
            "invalid_input"
        );
    }

    #[test]
    fn task_serializes_cadence_by_display_name() {
        let task = Task::new("gutters", "Clean gutters", "", Cadence::Fall);
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["schedule"], "Fall");
        assert_eq!(json["id"], "gutters");
    }

    #[test]
    fn task_without_detail_defaults_to_empty() {
        let task: Task =
            serde_json::from_str(r#"{"id":"x","title":"Paint fence","schedule":"Custom"}"#)
                .unwrap();

        assert_eq!(task.detail, "");
        assert_eq!(task.schedule, Cadence::Custom);
    }
}
