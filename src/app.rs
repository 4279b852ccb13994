use std::error::Error;
use std::fmt;

use tracing::{info, warn};

use crate::config::{BackendConfig, ConfigError};
use crate::domain::record::Record;
use crate::form::{FieldError, RecordForm, SubmitOutcome, NOT_SAVED_MESSAGE};
use crate::store::rest::RestBackend;
use crate::store::sqlite::SqliteBackend;
use crate::store::{RecordBackend, RecordStore, StoreClient, StoreError};
use crate::tracker::{Tracker, TrackerError};

/// Command-level entry points. Each one drives the tracker the way a
/// person would: pick add or edit, fill the form, submit.
pub struct App<S = StoreClient> {
    tracker: Tracker<S>,
}

impl App<StoreClient> {
    pub fn open(config: &BackendConfig) -> Result<Self, AppError> {
        let backend: Box<dyn RecordBackend> = match config {
            BackendConfig::Sqlite { path } => {
                ensure_parent_dir(path)?;
                Box::new(SqliteBackend::open(path)?)
            }
            BackendConfig::Rest(rest) => Box::new(RestBackend::new(rest)?),
        };
        let client = StoreClient::new(backend);
        info!(backend = client.backend_name(), "opened record store");
        Ok(Self::with_store(client))
    }
}

impl<S: RecordStore> App<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            tracker: Tracker::new(store),
        }
    }

    pub fn tracker(&self) -> &Tracker<S> {
        &self.tracker
    }

    pub async fn load(&mut self) {
        self.tracker.load().await;
    }

    pub async fn add(&mut self, title: &str, time: &str) -> Result<Record, AppError> {
        self.tracker.select_add();
        let mut form = RecordForm::for_selection(None);
        form.set_title(title);
        form.set_time(time);
        self.submit(form).await
    }

    pub async fn edit(
        &mut self,
        id: &str,
        title: Option<&str>,
        time: Option<&str>,
    ) -> Result<Record, AppError> {
        if title.is_none() && time.is_none() {
            return Err(AppError::InvalidArgument(
                "no changes provided; pass --title and/or --time".to_string(),
            ));
        }
        let record = self
            .tracker
            .find(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        let mut form = RecordForm::for_selection(Some(&record));
        self.tracker.select_edit(record);
        if let Some(title) = title {
            form.set_title(title);
        }
        if let Some(time) = time {
            form.set_time(time);
        }
        self.submit(form).await
    }

    pub async fn remove(&mut self, id: &str) -> Result<(), AppError> {
        if self.tracker.find(id).is_none() {
            return Err(AppError::NotFound(id.to_string()));
        }
        match self.tracker.remove(id).await {
            Ok(()) => {
                info!(id, "deleted record");
                Ok(())
            }
            Err(err) => {
                let TrackerError::DeleteFailed { id } = &err;
                warn!(id = %id, "record kept after refused deletion");
                Err(err.into())
            }
        }
    }

    async fn submit(&mut self, mut form: RecordForm) -> Result<Record, AppError> {
        match form.submit(&mut self.tracker).await {
            SubmitOutcome::Saved(record) => {
                info!(id = %record.id, "saved record");
                Ok(record)
            }
            SubmitOutcome::Invalid(errors) => {
                // Validation failures never reach the tracker, so the
                // selection has to be dropped here, like closing the dialog.
                self.tracker.clear_selection();
                Err(AppError::Invalid(errors))
            }
            SubmitOutcome::NotSaved => {
                warn!(
                    editing = self.tracker.editing().map(|record| record.id.as_str()),
                    title = form.title(),
                    time = form.time(),
                    state = ?form.state(),
                    "store did not save the record"
                );
                // A command never retries, so the form is abandoned here.
                self.tracker.clear_selection();
                Err(AppError::NotSaved)
            }
        }
    }
}

fn ensure_parent_dir(path: &str) -> Result<(), AppError> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[derive(Debug)]
pub enum AppError {
    Io(std::io::Error),
    Config(ConfigError),
    Store(StoreError),
    Tracker(TrackerError),
    Invalid(Vec<FieldError>),
    NotSaved,
    NotFound(String),
    InvalidArgument(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::Config(err) => write!(f, "{}", err),
            AppError::Store(err) => write!(f, "unable to open record store: {}", err),
            AppError::Tracker(err) => write!(f, "{}", err),
            AppError::Invalid(errors) => {
                let joined = errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "invalid input: {}", joined)
            }
            AppError::NotSaved => write!(f, "{}", NOT_SAVED_MESSAGE),
            AppError::NotFound(id) => write!(f, "record '{}' not found", id),
            AppError::InvalidArgument(message) => write!(f, "{}", message),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            AppError::Config(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Tracker(err) => Some(err),
            AppError::Invalid(_) => None,
            AppError::NotSaved => None,
            AppError::NotFound(_) => None,
            AppError::InvalidArgument(_) => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        AppError::Config(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        AppError::Store(value)
    }
}

impl From<TrackerError> for AppError {
    fn from(value: TrackerError) -> Self {
        AppError::Tracker(value)
    }
}
