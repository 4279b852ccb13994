//! Input capture in front of the tracker. Validation happens here; the
//! tracker trusts whatever reaches it.

use std::fmt;

use crate::domain::record::Record;
use crate::store::RecordStore;
use crate::tracker::Tracker;

pub const DEFAULT_TIME_INPUT: &str = "0";
pub const NOT_SAVED_MESSAGE: &str = "record was not saved";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Title,
    Time,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.field {
            Field::Title => "title",
            Field::Time => "time",
        };
        write!(f, "{}: {}", name, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordInput {
    pub title: String,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved(Record),
    Invalid(Vec<FieldError>),
    NotSaved,
}

#[derive(Debug, Clone)]
pub struct RecordForm {
    title: String,
    time: String,
    state: FormState,
}

impl Default for RecordForm {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordForm {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            time: DEFAULT_TIME_INPUT.to_string(),
            state: FormState::Idle,
        }
    }

    /// Pre-fills from the record selected for editing, or starts blank.
    pub fn for_selection(editing: Option<&Record>) -> Self {
        match editing {
            Some(record) => Self {
                title: record.title.clone(),
                time: record.time.to_string(),
                state: FormState::Idle,
            },
            None => Self::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_time(&mut self, time: impl Into<String>) {
        self.time = time.into();
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn validate(&self) -> Result<RecordInput, Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(FieldError {
                field: Field::Title,
                message: "title is required",
            });
        }

        let time = match parse_time(&self.time) {
            Ok(time) => Some(time),
            Err(message) => {
                errors.push(FieldError {
                    field: Field::Time,
                    message,
                });
                None
            }
        };

        match time {
            Some(time) if errors.is_empty() => Ok(RecordInput {
                title: self.title.clone(),
                time,
            }),
            _ => Err(errors),
        }
    }

    pub async fn submit<S: RecordStore>(&mut self, tracker: &mut Tracker<S>) -> SubmitOutcome {
        let input = match self.validate() {
            Ok(input) => input,
            Err(errors) => {
                self.state = FormState::Error(
                    errors
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; "),
                );
                return SubmitOutcome::Invalid(errors);
            }
        };

        self.state = FormState::Submitting;
        match tracker.submit(&input.title, input.time).await {
            Some(record) => {
                self.reset();
                SubmitOutcome::Saved(record)
            }
            None => {
                self.state = FormState::Error(NOT_SAVED_MESSAGE.to_string());
                SubmitOutcome::NotSaved
            }
        }
    }
}

fn parse_time(raw: &str) -> Result<f64, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("time is required");
    }
    let time = trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or("time must be a number")?;
    if time < 0.0 {
        return Err("time must be 0 or greater");
    }
    // "-0" parses to negative zero, which would display with its sign.
    Ok(time + 0.0)
}
