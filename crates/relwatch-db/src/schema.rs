//! Database schema management.

use rusqlite::Connection;
use tokio_rusqlite::Error;

/// Initialize the database schema.
pub fn init_schema(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS status (
    id TEXT PRIMARY KEY NOT NULL,
    latest_version TEXT DEFAULT NULL,
    latest_version_timestamp TEXT DEFAULT NULL,
    deployed_version TEXT DEFAULT NULL,
    deployed_version_timestamp TEXT DEFAULT NULL,
    approved_version TEXT DEFAULT NULL
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use relwatch_status::Column;

    #[test]
    fn test_schema_creation() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='status'")
            .unwrap();
        assert!(stmt.exists([]).unwrap());
    }

    #[test]
    fn test_schema_has_every_column() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('status')").unwrap();
        let names: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        for column in Column::ALL {
            assert!(names.iter().any(|n| n == column.as_str()), "{}", column.as_str());
        }
    }
}
