use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{RecordBackend, StoreError};
use crate::domain::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Insert,
    Update,
    Delete,
}

/// In-process table with per-operation failure switches. Titles are trimmed
/// on write so tests can tell stored values from submitted ones.
#[derive(Default)]
pub struct MemoryBackend {
    rows: Mutex<Vec<Record>>,
    next_id: AtomicU64,
    failing: Mutex<HashSet<Op>>,
}

impl MemoryBackend {
    pub fn with_rows(rows: Vec<Record>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().expect("failure set lock").insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.failing.lock().expect("failure set lock").remove(&op);
    }

    pub fn rows(&self) -> Vec<Record> {
        self.rows.lock().expect("rows lock").clone()
    }

    fn check(&self, op: Op) -> Result<(), StoreError> {
        if self.failing.lock().expect("failure set lock").contains(&op) {
            return Err(StoreError::Status {
                status: 503,
                body: format!("{op:?} unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        self.check(Op::List)?;
        Ok(self.rows())
    }

    async fn insert(&self, title: &str, time: f64) -> Result<Record, StoreError> {
        self.check(Op::Insert)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = Record::new(format!("mem-{id}"), title.trim(), time);
        self.rows.lock().expect("rows lock").push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, title: &str, time: f64) -> Result<Record, StoreError> {
        self.check(Op::Update)?;
        let mut rows = self.rows.lock().expect("rows lock");
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        row.title = title.trim().to_string();
        row.time = time;
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.check(Op::Delete)?;
        self.rows.lock().expect("rows lock").retain(|row| row.id != id);
        Ok(())
    }
}

#[async_trait]
impl RecordBackend for Arc<MemoryBackend> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        (**self).list_all().await
    }

    async fn insert(&self, title: &str, time: f64) -> Result<Record, StoreError> {
        (**self).insert(title, time).await
    }

    async fn update(&self, id: &str, title: &str, time: f64) -> Result<Record, StoreError> {
        (**self).update(id, title, time).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}
