//! Status table access.

use std::path::Path;

use rusqlite::{params_from_iter, OptionalExtension};
use tokio::sync::mpsc;
use tokio_rusqlite::Connection;
use tracing::{debug, error, info};

use relwatch_status::{Cell, Column, DbMessage, StatusFields};

use crate::error::PersistenceError;
use crate::schema::init_schema;

#[cfg(test)]
#[path = "database_tests.rs"]
mod tests;

const SELECT_COLUMNS: &str = "id, latest_version, latest_version_timestamp, deployed_version, \
                              deployed_version_timestamp, approved_version";

/// SQLite store of service status.
pub struct StatusDatabase {
    conn: Connection,
}

impl StatusDatabase {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    /// Open (or create) a file-backed database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PersistenceError::Connection(e.to_string()))?;
        }
        let conn = Connection::open(path)
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, PersistenceError> {
        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Update the row of `service_id`, inserting it when missing.
    ///
    /// Column names come from [`Column::as_str`] and every value is bound.
    /// When a column appears twice the last value wins. No cells is a no-op.
    pub async fn upsert(&self, service_id: &str, cells: &[Cell]) -> Result<(), PersistenceError> {
        let mut merged: Vec<(Column, String)> = Vec::with_capacity(cells.len());
        for cell in cells {
            match merged.iter_mut().find(|(column, _)| *column == cell.column) {
                Some(existing) => existing.1 = cell.value.clone(),
                None => merged.push((cell.column, cell.value.clone())),
            }
        }
        if merged.is_empty() {
            return Ok(());
        }

        let assignments = merged
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column.as_str(), i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let update = format!(
            "UPDATE status SET {assignments} WHERE id = ?{}",
            merged.len() + 1
        );

        let columns = merged
            .iter()
            .map(|(column, _)| column.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=merged.len() + 1)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let insert = format!("INSERT INTO status ({columns}, id) VALUES ({placeholders})");

        let mut values: Vec<String> = merged.into_iter().map(|(_, value)| value).collect();
        values.push(service_id.to_string());

        let inserted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let updated = tx.execute(&update, params_from_iter(values.iter()))?;
                if updated == 0 {
                    tx.execute(&insert, params_from_iter(values.iter()))?;
                }
                tx.commit()?;
                Ok(updated == 0)
            })
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        debug!(service = service_id, inserted, "Status saved");
        Ok(())
    }

    /// Stored status of one service.
    pub async fn load(&self, service_id: &str) -> Result<Option<StatusFields>, PersistenceError> {
        let id = service_id.to_string();
        self.conn
            .call(move |conn| {
                let row = conn
                    .query_row(
                        &format!("SELECT {SELECT_COLUMNS} FROM status WHERE id = ?1"),
                        [&id],
                        read_row,
                    )
                    .optional()?;
                Ok(row.map(|(_, fields)| fields))
            })
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))
    }

    /// Stored status of every service, ordered by id.
    pub async fn load_all(&self) -> Result<Vec<(String, StatusFields)>, PersistenceError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!("SELECT {SELECT_COLUMNS} FROM status ORDER BY id"))?;
                let rows = stmt
                    .query_map([], read_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))
    }

    /// Remove the row of a service.
    pub async fn delete(&self, service_id: &str) -> Result<(), PersistenceError> {
        let id = service_id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM status WHERE id = ?1", [&id])?;
                Ok(())
            })
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))
    }

    /// Consume the persist sink until every sender is gone.
    ///
    /// A failed write is logged and dropped.
    pub async fn run(&self, mut rx: mpsc::Receiver<DbMessage>) {
        info!("Database handler started");
        while let Some(message) = rx.recv().await {
            if let Err(e) = self.upsert(&message.service_id, &message.cells).await {
                error!(service = %message.service_id, error = %e, "Failed to save status");
            }
        }
        info!("Database handler stopped");
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, StatusFields)> {
    let text = |i: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(i)?.unwrap_or_default())
    };
    Ok((
        row.get(0)?,
        StatusFields {
            latest_version: text(1)?,
            latest_version_timestamp: text(2)?,
            deployed_version: text(3)?,
            deployed_version_timestamp: text(4)?,
            approved_version: text(5)?,
            last_queried: String::new(),
        },
    ))
}
