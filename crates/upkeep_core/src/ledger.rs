use crate::error::AppError;
use crate::model::{
    ALL_MONTHS, Cadence, CustomTaskRecord, OccurrenceKey, ProgressRecord, Task, TaskStatus,
    validate_year,
};
use crate::recurrence::due_in;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use time::Month;

pub const FIRST_TRACKED_YEAR: i32 = 2024;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_TEXT_CHARS: usize = 2000;

/// Occurrence-scoped progress plus the user's custom tasks.
///
/// Every aggregate is recomputed from the stored records on each call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressLedger {
    catalog: Vec<Task>,
    progress: BTreeMap<String, ProgressRecord>,
    custom_tasks: BTreeMap<u8, Vec<Task>>,
    selected_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthEntry {
    pub task: Task,
    pub progress: ProgressRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u8,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub is_month_complete: bool,
    pub completed_cost: Decimal,
    pub month_cost: Decimal,
    pub tasks: Vec<MonthEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub completed_count: usize,
    pub completed_cost: Decimal,
    pub year_progress: f64,
    pub months: Vec<MonthSummary>,
}

impl ProgressLedger {
    pub fn new(catalog: Vec<Task>, selected_year: i32) -> Self {
        Self {
            catalog,
            progress: BTreeMap::new(),
            custom_tasks: BTreeMap::new(),
            selected_year,
        }
    }

    pub fn catalog(&self) -> &[Task] {
        &self.catalog
    }

    pub fn selected_year(&self) -> i32 {
        self.selected_year
    }

    pub fn set_selected_year(&mut self, year: i32) -> Result<(), AppError> {
        self.selected_year = validate_year(year)?;
        Ok(())
    }

    pub fn get(&self, task: &Task, year: i32, month: Month) -> ProgressRecord {
        let key = OccurrenceKey::new(task, year, month).to_string();
        self.progress.get(&key).cloned().unwrap_or_default()
    }

    pub fn set_status(
        &mut self,
        task: &Task,
        status: TaskStatus,
        year: i32,
        month: Month,
    ) -> Result<ProgressRecord, AppError> {
        self.update(task, year, month, |record| record.status = status)
    }

    pub fn set_cost(
        &mut self,
        task: &Task,
        cost: Option<Decimal>,
        year: i32,
        month: Month,
    ) -> Result<ProgressRecord, AppError> {
        if let Some(amount) = cost
            && amount.is_sign_negative()
            && !amount.is_zero()
        {
            return Err(AppError::invalid_input("cost must not be negative"));
        }

        self.update(task, year, month, |record| record.cost = cost)
    }

    pub fn set_note(
        &mut self,
        task: &Task,
        note: &str,
        year: i32,
        month: Month,
    ) -> Result<ProgressRecord, AppError> {
        if note.chars().count() > MAX_TEXT_CHARS {
            return Err(AppError::invalid_input(format!(
                "note must be at most {MAX_TEXT_CHARS} characters"
            )));
        }

        self.update(task, year, month, |record| record.note = note.to_string())
    }

    fn update<F>(
        &mut self,
        task: &Task,
        year: i32,
        month: Month,
        patch: F,
    ) -> Result<ProgressRecord, AppError>
    where
        F: FnOnce(&mut ProgressRecord),
    {
        let year = validate_year(year)?;
        let key = OccurrenceKey::new(task, year, month).to_string();
        let mut current = self.progress.get(&key).cloned().unwrap_or_default();
        patch(&mut current);
        self.progress.insert(key, current.clone());
        Ok(current)
    }

    /// Catalog tasks due in `month`, followed by that month's custom tasks.
    pub fn tasks_in(&self, month: Month) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .catalog
            .iter()
            .filter(|task| due_in(task.schedule, month))
            .cloned()
            .collect();
        tasks.extend(self.custom_tasks(month).iter().cloned());
        tasks
    }

    pub fn custom_tasks(&self, month: Month) -> &[Task] {
        self.custom_tasks
            .get(&u8::from(month))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.catalog
            .iter()
            .chain(self.custom_tasks.values().flatten())
            .find(|task| task.id == id)
    }

    pub fn add_custom_task(
        &mut self,
        month: Month,
        title: &str,
        detail: &str,
    ) -> Result<Task, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::invalid_input("title is required"));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(AppError::invalid_input(format!(
                "title must be at most {MAX_TITLE_CHARS} characters"
            )));
        }
        if detail.chars().count() > MAX_TEXT_CHARS {
            return Err(AppError::invalid_input(format!(
                "detail must be at most {MAX_TEXT_CHARS} characters"
            )));
        }

        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            detail: detail.trim().to_string(),
            schedule: Cadence::Custom,
        };
        self.custom_tasks
            .entry(u8::from(month))
            .or_default()
            .push(task.clone());
        Ok(task)
    }

    /// Catalog grouped by cadence, in cadence declaration order.
    pub fn grouped_tasks(&self) -> BTreeMap<Cadence, Vec<Task>> {
        let mut grouped: BTreeMap<Cadence, Vec<Task>> = BTreeMap::new();
        for task in &self.catalog {
            grouped.entry(task.schedule).or_default().push(task.clone());
        }
        grouped
    }

    pub fn cadences(&self) -> Vec<Cadence> {
        self.grouped_tasks().into_keys().collect()
    }

    pub fn is_month_complete(&self, month: Month, year: i32) -> bool {
        let due = self.tasks_in(month);
        !due.is_empty()
            && due
                .iter()
                .all(|task| self.get(task, year, month).status == TaskStatus::Complete)
    }

    pub fn month_cost(&self, month: Month, year: i32) -> Decimal {
        self.tasks_in(month)
            .iter()
            .filter_map(|task| self.get(task, year, month).cost)
            .sum()
    }

    pub fn completed_count(&self, year: i32) -> usize {
        self.completed_in(year).count()
    }

    pub fn total_completed_cost(&self, year: i32) -> Decimal {
        self.completed_in(year)
            .filter_map(|record| record.cost)
            .sum()
    }

    fn completed_in(&self, year: i32) -> impl Iterator<Item = &ProgressRecord> {
        self.progress.iter().filter_map(move |(key, record)| {
            let key = OccurrenceKey::parse(key)?;
            (key.year == year && record.status == TaskStatus::Complete).then_some(record)
        })
    }

    /// Share of months with something due that are fully complete.
    pub fn year_progress(&self, year: i32) -> f64 {
        let months_with_tasks: Vec<Month> = ALL_MONTHS
            .into_iter()
            .filter(|month| !self.tasks_in(*month).is_empty())
            .collect();
        if months_with_tasks.is_empty() {
            return 0.0;
        }

        let completed = months_with_tasks
            .iter()
            .filter(|month| self.is_month_complete(**month, year))
            .count();
        let ratio = completed as f64 / months_with_tasks.len() as f64;
        ratio.clamp(0.0, 1.0)
    }

    pub fn month_summary(&self, month: Month, year: i32) -> MonthSummary {
        let tasks: Vec<MonthEntry> = self
            .tasks_in(month)
            .into_iter()
            .map(|task| {
                let progress = self.get(&task, year, month);
                MonthEntry { task, progress }
            })
            .collect();

        let completed: Vec<&MonthEntry> = tasks
            .iter()
            .filter(|entry| entry.progress.status == TaskStatus::Complete)
            .collect();
        let completed_cost = completed
            .iter()
            .filter_map(|entry| entry.progress.cost)
            .sum();
        let month_cost = tasks.iter().filter_map(|entry| entry.progress.cost).sum();

        MonthSummary {
            year,
            month: u8::from(month),
            total_tasks: tasks.len(),
            completed_tasks: completed.len(),
            is_month_complete: !tasks.is_empty() && completed.len() == tasks.len(),
            completed_cost,
            month_cost,
            tasks,
        }
    }

    pub fn year_summary(&self, year: i32) -> YearSummary {
        YearSummary {
            year,
            completed_count: self.completed_count(year),
            completed_cost: self.total_completed_cost(year),
            year_progress: self.year_progress(year),
            months: ALL_MONTHS
                .into_iter()
                .map(|month| self.month_summary(month, year))
                .collect(),
        }
    }

    pub fn progress_entries(&self) -> &BTreeMap<String, ProgressRecord> {
        &self.progress
    }

    pub fn replace_progress(&mut self, progress: BTreeMap<String, ProgressRecord>) {
        self.progress = progress;
    }

    /// Custom tasks flattened to `{month, task}` records, months ascending.
    pub fn custom_records(&self) -> Vec<CustomTaskRecord> {
        self.custom_tasks
            .iter()
            .flat_map(|(month, tasks)| {
                tasks.iter().filter_map(move |task| {
                    Some(CustomTaskRecord {
                        month: Month::try_from(*month).ok()?,
                        task: task.clone(),
                    })
                })
            })
            .collect()
    }

    pub fn replace_custom_tasks(&mut self, records: Vec<CustomTaskRecord>) {
        let mut custom_tasks: BTreeMap<u8, Vec<Task>> = BTreeMap::new();
        for record in records {
            custom_tasks
                .entry(u8::from(record.month))
                .or_default()
                .push(record.task);
        }
        self.custom_tasks = custom_tasks;
    }
}

pub fn available_years(current_year: i32) -> Vec<i32> {
    (FIRST_TRACKED_YEAR..=current_year.max(FIRST_TRACKED_YEAR)).collect()
}
