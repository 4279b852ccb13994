use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

pub const DURATION_SUFFIX: &str = "時間";

/// One study-time entry. `id` always comes from the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    pub time: f64,
}

impl Record {
    pub fn new(id: impl Into<String>, title: impl Into<String>, time: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            time,
        }
    }
}

pub fn format_duration(time: f64) -> String {
    format!("{time}{DURATION_SUFFIX}")
}

pub fn total_time(records: &[Record]) -> f64 {
    records.iter().fold(0.0, |sum, record| sum + record.time)
}

// Hosted tables frequently use bigint identity columns, so ids may arrive as
// JSON numbers.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl Visitor<'_> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or integer record id")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
