use crate::error::AppError;
use crate::ledger::ProgressLedger;
use crate::model::{ProgressRecord, Task, TaskStatus};
use crate::sync::{KeyValueStore, LoadReport, SyncMediator};
use rust_decimal::Decimal;
use time::Month;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    LocalEdit,
    ExternalReplace,
}

type Observer = Box<dyn FnMut(StoreEvent)>;

/// Owns the ledger and its sync mediator. All mutation goes through
/// `&mut self`, which keeps read-modify-write on one context; every edit is
/// saved before observers hear about it.
pub struct HomeStore<K> {
    ledger: ProgressLedger,
    sync: SyncMediator<K>,
    observers: Vec<Observer>,
}

impl<K: KeyValueStore> HomeStore<K> {
    /// Builds the store and applies whatever the backing store already holds.
    pub fn open(store: K, catalog: Vec<Task>, default_year: i32) -> (Self, LoadReport) {
        let mut ledger = ProgressLedger::new(catalog, default_year);
        let sync = SyncMediator::new(store);
        let report = sync.load(&mut ledger);
        (
            Self {
                ledger,
                sync,
                observers: Vec::new(),
            },
            report,
        )
    }

    pub fn ledger(&self) -> &ProgressLedger {
        &self.ledger
    }

    pub fn backing_store(&self) -> &K {
        self.sync.store()
    }

    pub fn on_change<F>(&mut self, observer: F)
    where
        F: FnMut(StoreEvent) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn task(&self, id: &str) -> Result<Task, AppError> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("task id is required"));
        }
        self.ledger
            .find_task(trimmed)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("task '{trimmed}' not found")))
    }

    pub fn set_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
        year: i32,
        month: Month,
    ) -> Result<ProgressRecord, AppError> {
        let task = self.task(task_id)?;
        let record = self.ledger.set_status(&task, status, year, month)?;
        self.persist()?;
        Ok(record)
    }

    pub fn set_cost(
        &mut self,
        task_id: &str,
        cost: Option<Decimal>,
        year: i32,
        month: Month,
    ) -> Result<ProgressRecord, AppError> {
        let task = self.task(task_id)?;
        let record = self.ledger.set_cost(&task, cost, year, month)?;
        self.persist()?;
        Ok(record)
    }

    pub fn set_note(
        &mut self,
        task_id: &str,
        note: &str,
        year: i32,
        month: Month,
    ) -> Result<ProgressRecord, AppError> {
        let task = self.task(task_id)?;
        let record = self.ledger.set_note(&task, note, year, month)?;
        self.persist()?;
        Ok(record)
    }

    pub fn add_custom_task(
        &mut self,
        month: Month,
        title: &str,
        detail: &str,
    ) -> Result<Task, AppError> {
        let task = self.ledger.add_custom_task(month, title, detail)?;
        self.persist()?;
        Ok(task)
    }

    pub fn set_selected_year(&mut self, year: i32) -> Result<(), AppError> {
        self.ledger.set_selected_year(year)?;
        self.persist()
    }

    /// Applies every queued external change in arrival order, one full load
    /// each.
    pub fn pump_external_changes(&mut self) -> Vec<LoadReport> {
        let mut reports = Vec::new();
        while self.sync.next_change().is_some() {
            reports.push(self.sync.load(&mut self.ledger));
            self.emit(StoreEvent::ExternalReplace);
        }
        if !reports.is_empty() {
            debug!(count = reports.len(), "applied external changes");
        }
        reports
    }

    pub fn synchronize(&mut self) -> Result<Vec<LoadReport>, AppError> {
        self.sync.synchronize()?;
        Ok(self.pump_external_changes())
    }

    fn persist(&mut self) -> Result<(), AppError> {
        self.sync.save(&self.ledger)?;
        self.emit(StoreEvent::LocalEdit);
        Ok(())
    }

    fn emit(&mut self, event: StoreEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }
}
