use std::error::Error;
use std::fmt;

use tracing::{debug, warn};

use crate::domain::record::{total_time, Record};
use crate::store::RecordStore;

/// Owns the in-memory record list and keeps it in step with the store.
///
/// The list only changes after the store confirms an operation. Listing
/// replaces the whole list; create appends the row the store returned;
/// update swaps every entry carrying the same id; delete filters by id.
pub struct Tracker<S> {
    store: S,
    records: Vec<Record>,
    loading: bool,
    editing: Option<Record>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    DeleteFailed { id: String },
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::DeleteFailed { .. } => write!(f, "deletion failed"),
        }
    }
}

impl Error for TrackerError {}

impl<S: RecordStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            records: Vec::new(),
            loading: false,
            editing: None,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn editing(&self) -> Option<&Record> {
        self.editing.as_ref()
    }

    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn total_time(&self) -> f64 {
        total_time(&self.records)
    }

    pub async fn load(&mut self) {
        self.loading = true;
        let records = self.store.list_all().await;
        debug!(count = records.len(), "loaded records");
        self.records = records;
        self.loading = false;
    }

    pub async fn submit_create(&mut self, title: &str, time: f64) -> Option<Record> {
        let created = self.store.insert(title, time).await?;
        self.records.push(created.clone());
        Some(created)
    }

    pub async fn submit_update(&mut self, id: &str, title: &str, time: f64) -> Option<Record> {
        let updated = self.store.update(id, title, time).await?;
        for record in self.records.iter_mut().filter(|record| record.id == id) {
            *record = updated.clone();
        }
        Some(updated)
    }

    pub async fn remove(&mut self, id: &str) -> Result<(), TrackerError> {
        if !self.store.delete(id).await {
            warn!(id, "store refused deletion");
            return Err(TrackerError::DeleteFailed { id: id.to_string() });
        }
        self.records.retain(|record| record.id != id);
        Ok(())
    }

    pub fn select_add(&mut self) {
        self.editing = None;
    }

    pub fn select_edit(&mut self, record: Record) {
        self.editing = Some(record);
    }

    pub fn clear_selection(&mut self) {
        self.editing = None;
    }

    /// Routes to update when a record is selected for editing, otherwise to
    /// create. The selection is cleared only once the store has saved, so a
    /// retry of the same form repeats the same operation.
    pub async fn submit(&mut self, title: &str, time: f64) -> Option<Record> {
        let outcome = match self.editing.as_ref().map(|record| record.id.clone()) {
            Some(id) => self.submit_update(&id, title, time).await,
            None => self.submit_create(title, time).await,
        };
        if outcome.is_some() {
            self.clear_selection();
        }
        outcome
    }
}
