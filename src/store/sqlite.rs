use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::Connection;
use tracing::debug;

use super::{RecordBackend, StoreError};
use crate::db;
use crate::domain::record::Record;
use crate::record_id::generate_record_id;

/// Local table backend. Each call runs on the blocking pool.
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = db::open_connection(path)?;
        let schema = db::get_meta(&conn, "schema_version")?;
        debug!(path, schema = schema.as_deref().unwrap_or("unknown"), "opened sqlite store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || work(&lock(&conn))).await?
    }
}

fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    // A panic mid-statement leaves SQLite itself consistent.
    conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn stored_row(conn: &Connection, id: &str) -> Result<Record, StoreError> {
    db::get_record(conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
}

#[async_trait]
impl RecordBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        self.with_conn(|conn| Ok(db::list_records(conn)?)).await
    }

    async fn insert(&self, title: &str, time: f64) -> Result<Record, StoreError> {
        let title = title.to_string();
        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            let id = generate_record_id(|candidate| {
                db::record_exists(&tx, candidate).unwrap_or(true)
            });
            db::insert_record(&tx, &id, &title, time, &db::now_utc_rfc3339())?;
            let record = stored_row(&tx, &id)?;
            tx.commit()?;
            Ok(record)
        })
        .await
    }

    async fn update(&self, id: &str, title: &str, time: f64) -> Result<Record, StoreError> {
        let id = id.to_string();
        let title = title.to_string();
        self.with_conn(move |conn| {
            if db::update_record(conn, &id, &title, time)? == 0 {
                return Err(StoreError::NotFound(id));
            }
            stored_row(conn, &id)
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        // Zero matching rows is still a successful delete.
        self.with_conn(move |conn| {
            db::delete_record(conn, &id)?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::SqliteBackend;
    use crate::domain::record::Record;
    use crate::store::{RecordBackend, StoreError};

    fn unique_db_path() -> String {
        std::env::temp_dir()
            .join(format!("studylog-sqlite-backend-{}.sqlite", Uuid::now_v7()))
            .display()
            .to_string()
    }

    fn cleanup_db_files(path: &str) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{path}{suffix}"));
        }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_lists_in_insertion_order() {
        let path = unique_db_path();
        let backend = SqliteBackend::open(&path).expect("backend should open");

        let first = backend.insert("React", 2.0).await.expect("insert should succeed");
        let second = backend
            .insert("TypeScript", 3.0)
            .await
            .expect("insert should succeed");
        assert!(first.id.starts_with("rec-"));
        assert_ne!(first.id, second.id);
        assert_eq!(first.title, "React");
        assert_eq!(first.time, 2.0);

        let listed = backend.list_all().await.expect("list should succeed");
        assert_eq!(listed, vec![first, second]);

        cleanup_db_files(&path);
    }

    #[tokio::test]
    async fn update_returns_stored_row_and_rejects_unknown_ids() {
        let path = unique_db_path();
        let backend = SqliteBackend::open(&path).expect("backend should open");
        let created = backend.insert("React", 2.0).await.expect("insert should succeed");

        let updated = backend
            .update(&created.id, "JavaScript", 1.0)
            .await
            .expect("update should succeed");
        assert_eq!(updated, Record::new(created.id.clone(), "JavaScript", 1.0));

        let missing = backend.update("rec-missing", "x", 1.0).await;
        assert!(matches!(missing, Err(StoreError::NotFound(id)) if id == "rec-missing"));

        cleanup_db_files(&path);
    }

    #[tokio::test]
    async fn delete_removes_rows_and_tolerates_absent_ids() {
        let path = unique_db_path();
        let backend = SqliteBackend::open(&path).expect("backend should open");
        let created = backend.insert("React", 2.0).await.expect("insert should succeed");

        backend.delete(&created.id).await.expect("delete should succeed");
        backend
            .delete(&created.id)
            .await
            .expect("second delete should also succeed");
        assert!(backend
            .list_all()
            .await
            .expect("list should succeed")
            .is_empty());

        cleanup_db_files(&path);
    }

    #[tokio::test]
    async fn rows_survive_reopening_the_database() {
        let path = unique_db_path();
        let created = {
            let backend = SqliteBackend::open(&path).expect("backend should open");
            backend.insert("Rust", 4.5).await.expect("insert should succeed")
        };

        let reopened = SqliteBackend::open(&path).expect("backend should reopen");
        assert_eq!(
            reopened.list_all().await.expect("list should succeed"),
            vec![created]
        );

        cleanup_db_files(&path);
    }
}
