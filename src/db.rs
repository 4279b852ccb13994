use std::time::Duration;

use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Result};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::record::Record;

pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS study_record (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    time REAL NOT NULL,
    created_at TEXT NOT NULL
);
"#;

pub fn open_connection(path: &str) -> Result<Connection> {
    let mut conn = Connection::open(path)?;
    configure_for_speed(&conn)?;
    bootstrap_schema(&mut conn)?;
    Ok(conn)
}

fn configure_for_speed(conn: &Connection) -> Result<()> {
    conn.pragma_update(None::<DatabaseName>, "journal_mode", "WAL")?;
    conn.pragma_update(None::<DatabaseName>, "synchronous", "NORMAL")?;
    conn.pragma_update(None::<DatabaseName>, "temp_store", "MEMORY")?;
    conn.pragma_update(None::<DatabaseName>, "busy_timeout", 5000i64)?;
    conn.busy_timeout(Duration::from_millis(5000))?;
    Ok(())
}

fn bootstrap_schema(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute(
        r#"
INSERT INTO meta (key, value)
VALUES ('schema_version', ?1)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#,
        params![SCHEMA_VERSION.to_string()],
    )?;
    tx.commit()
}

pub fn now_utc_rfc3339() -> String {
    // Rfc3339 only fails for offsets/years it cannot represent; now_utc is
    // always representable.
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

pub fn record_exists(conn: &Connection, id: &str) -> Result<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM study_record WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub fn insert_record(
    conn: &Connection,
    id: &str,
    title: &str,
    time: f64,
    created_at: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO study_record (id, title, time, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, title, time, created_at],
    )?;
    Ok(())
}

/// Returns the number of rows touched (0 or 1).
pub fn update_record(conn: &Connection, id: &str, title: &str, time: f64) -> Result<usize> {
    conn.execute(
        "UPDATE study_record SET title = ?2, time = ?3 WHERE id = ?1",
        params![id, title, time],
    )
}

pub fn delete_record(conn: &Connection, id: &str) -> Result<usize> {
    conn.execute("DELETE FROM study_record WHERE id = ?1", params![id])
}

pub fn get_record(conn: &Connection, id: &str) -> Result<Option<Record>> {
    conn.query_row(
        "SELECT id, title, time FROM study_record WHERE id = ?1",
        params![id],
        |row| {
            Ok(Record::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get(2)?,
            ))
        },
    )
    .optional()
}

pub fn list_records(conn: &Connection) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare("SELECT id, title, time FROM study_record ORDER BY seq ASC")?;

    let mut rows = stmt.query([])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(Record::new(
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get(2)?,
        ));
    }

    Ok(result)
}

pub fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}
