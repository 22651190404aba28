// SQLite query executor
//
// Identifiers are double-quoted, filter values are bound as parameters.

use std::path::Path;
use std::time::Duration;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};

use tablemirror::{FilterClause, QueryExecutor, RowSet, Value};

use crate::error::SourceError;

pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    /// Open a database file read-only.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        if !path.exists() {
            return Err(SourceError::Read {
                path: path.to_path_buf(),
                message: "file not found".into(),
            });
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        log::debug!("opened sqlite database {}", path.display());
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn set_busy_timeout(&self, ms: u64) -> Result<(), SourceError> {
        self.conn.busy_timeout(Duration::from_millis(ms))?;
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// `SELECT * FROM "table" [WHERE "c1" = ?1 AND "c2" = ?2 ...]`
pub fn build_select(table: &str, filter: &[FilterClause]) -> String {
    let mut sql = format!("SELECT * FROM {}", quote_ident(table));
    for (i, clause) in filter.iter().enumerate() {
        sql.push_str(if i == 0 { " WHERE " } else { " AND " });
        sql.push_str(&format!("{} = ?{}", quote_ident(&clause.column), i + 1));
    }
    sql
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(n) => SqlValue::Integer(*n),
        Value::Real(r) => SqlValue::Real(*r),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Date(_) => SqlValue::Text(value.to_string()),
        Value::Blob(b) => SqlValue::Blob(b.clone()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Integer(n),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

impl QueryExecutor for SqliteSource {
    type Error = SourceError;

    fn select(&self, table: &str, filter: &[FilterClause]) -> Result<RowSet, SourceError> {
        let sql = build_select(table, filter);
        log::debug!("sqlite: {sql}");

        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut set = RowSet::new(columns);
        let mut rows = stmt.query(params_from_iter(filter.iter().map(|c| to_sql(&c.value))))?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(from_sql(row.get_ref(i)?));
            }
            set.push(values)?;
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> SqliteSource {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
CREATE TABLE accounts (uid TEXT, amount INTEGER, ratio REAL, status TEXT, note BLOB);
INSERT INTO accounts VALUES ('U1', 100, 0.5, 'active', NULL);
INSERT INTO accounts VALUES ('U2', 200, 1.0, 'closed', x'00ff');
INSERT INTO accounts VALUES ('U3', 300, NULL, 'active', NULL);
"#,
        )
        .unwrap();
        SqliteSource::from_connection(conn)
    }

    fn clause(column: &str, value: Value) -> FilterClause {
        FilterClause {
            column: column.into(),
            value,
        }
    }

    #[test]
    fn select_sql_shape() {
        assert_eq!(build_select("t", &[]), r#"SELECT * FROM "t""#);
        assert_eq!(
            build_select("my table", &[clause("a", Value::Null), clause("b\"x", Value::Null)]),
            r#"SELECT * FROM "my table" WHERE "a" = ?1 AND "b""x" = ?2"#
        );
    }

    #[test]
    fn loads_typed_values_in_column_order() {
        let src = memory_db();
        let rows = src.select("accounts", &[]).unwrap();
        assert_eq!(rows.columns(), ["uid", "amount", "ratio", "status", "note"]);
        assert_eq!(rows.len(), 3);
        let second = &rows.rows()[1];
        assert_eq!(second.get("amount"), Some(&Value::Integer(200)));
        assert_eq!(second.get("ratio"), Some(&Value::Real(1.0)));
        assert_eq!(second.get("note"), Some(&Value::Blob(vec![0x00, 0xff])));
        assert_eq!(rows.rows()[2].get("ratio"), Some(&Value::Null));
    }

    #[test]
    fn filter_values_are_bound() {
        let src = memory_db();
        let rows = src
            .select("accounts", &[clause("status", Value::text("active"))])
            .unwrap();
        assert_eq!(rows.len(), 2);

        // Text literal against an INTEGER column still matches through affinity
        let rows = src
            .select("accounts", &[clause("amount", Value::text("200"))])
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn injection_shaped_value_matches_nothing() {
        let src = memory_db();
        let rows = src
            .select("accounts", &[clause("status", Value::text("active' OR '1'='1"))])
            .unwrap();
        assert!(rows.is_empty());
        // Table still intact
        assert_eq!(src.select("accounts", &[]).unwrap().len(), 3);
    }

    #[test]
    fn unknown_table_is_an_error() {
        let src = memory_db();
        let err = src.select("nope", &[]).unwrap_err();
        assert!(err.to_string().contains("no such table"));
    }
}
