//! The boundary between the tracker and wherever records actually live.
//!
//! Backends implement [`RecordBackend`] and report every failure.
//! [`StoreClient`] sits in front of a backend, logs those failures and
//! reduces them to the sentinels of [`RecordStore`]: an empty listing,
//! `None`, or `false`.

use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use tracing::error;

use crate::domain::record::Record;

#[cfg(test)]
pub mod memory;
pub mod rest;
pub mod sqlite;


#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_all(&self) -> Vec<Record>;
    async fn insert(&self, title: &str, time: f64) -> Option<Record>;
    async fn update(&self, id: &str, title: &str, time: f64) -> Option<Record>;
    async fn delete(&self, id: &str) -> bool;
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    async fn list_all(&self) -> Vec<Record> {
        (**self).list_all().await
    }

    async fn insert(&self, title: &str, time: f64) -> Option<Record> {
        (**self).insert(title, time).await
    }

    async fn update(&self, id: &str, title: &str, time: f64) -> Option<Record> {
        (**self).update(id, title, time).await
    }

    async fn delete(&self, id: &str) -> bool {
        (**self).delete(id).await
    }
}

#[async_trait]
pub trait RecordBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn list_all(&self) -> Result<Vec<Record>, StoreError>;
    async fn insert(&self, title: &str, time: f64) -> Result<Record, StoreError>;
    async fn update(&self, id: &str, title: &str, time: f64) -> Result<Record, StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

pub struct StoreClient {
    backend: Box<dyn RecordBackend>,
}

impl StoreClient {
    pub fn new(backend: Box<dyn RecordBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

#[async_trait]
impl RecordStore for StoreClient {
    async fn list_all(&self) -> Vec<Record> {
        match self.backend.list_all().await {
            Ok(records) => records,
            Err(err) => {
                error!(backend = self.backend.name(), error = %err, "error fetching records");
                Vec::new()
            }
        }
    }

    async fn insert(&self, title: &str, time: f64) -> Option<Record> {
        match self.backend.insert(title, time).await {
            Ok(record) => Some(record),
            Err(err) => {
                error!(backend = self.backend.name(), error = %err, "error inserting record");
                None
            }
        }
    }

    async fn update(&self, id: &str, title: &str, time: f64) -> Option<Record> {
        match self.backend.update(id, title, time).await {
            Ok(record) => Some(record),
            Err(err) => {
                error!(backend = self.backend.name(), id, error = %err, "error updating record");
                None
            }
        }
    }

    async fn delete(&self, id: &str) -> bool {
        match self.backend.delete(id).await {
            Ok(()) => true,
            Err(err) => {
                error!(backend = self.backend.name(), id, error = %err, "error deleting record");
                false
            }
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Http(reqwest::Error),
    Status { status: u16, body: String },
    Decode(serde_json::Error),
    Db(rusqlite::Error),
    NotFound(String),
    Task(tokio::task::JoinError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Http(err) => write!(f, "HTTP error: {}", err),
            StoreError::Status { status, body } => {
                if body.trim().is_empty() {
                    write!(f, "backend responded with status {}", status)
                } else {
                    write!(f, "backend responded with status {}: {}", status, body.trim())
                }
            }
            StoreError::Decode(err) => write!(f, "invalid record payload: {}", err),
            StoreError::Db(err) => write!(f, "database error: {}", err),
            StoreError::NotFound(id) => write!(f, "record '{}' not found", id),
            StoreError::Task(err) => write!(f, "storage task failed: {}", err),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Http(err) => Some(err),
            StoreError::Status { .. } => None,
            StoreError::Decode(err) => Some(err),
            StoreError::Db(err) => Some(err),
            StoreError::NotFound(_) => None,
            StoreError::Task(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(value: reqwest::Error) -> Self {
        StoreError::Http(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Decode(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        StoreError::Db(value)
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(value: tokio::task::JoinError) -> Self {
        StoreError::Task(value)
    }
}
