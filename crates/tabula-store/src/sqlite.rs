//! SQLite-backed store

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tabula_core::{
    codec, next_order_index, Column, ColumnId, ColumnPatch, ColumnType, MaterializedRow,
    NewColumn, Row, RowId, StorageForm,
};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{kind, Store};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tbl_columns (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    id          TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    column_type TEXT NOT NULL,
    order_index INTEGER NOT NULL DEFAULT 0,
    settings    TEXT
);
CREATE TABLE IF NOT EXISTS tbl_rows (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    id          TEXT NOT NULL UNIQUE,
    order_index INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS tbl_cells (
    row_id    TEXT NOT NULL REFERENCES tbl_rows(id) ON DELETE CASCADE,
    column_id TEXT NOT NULL REFERENCES tbl_columns(id) ON DELETE CASCADE,
    value     TEXT,
    UNIQUE (row_id, column_id)
);
CREATE INDEX IF NOT EXISTS idx_cells_column_id ON tbl_cells(column_id);
"#;

const COLUMN_FIELDS: &str = "id, name, column_type, order_index, settings, seq";

/// Connection settings for [`SqliteStore`]
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    /// `journal_mode` pragma
    pub journal_mode: String,
    /// `synchronous` pragma
    pub synchronous: String,
    /// How long a write waits on a locked database before failing
    pub busy_timeout: Duration,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Store backed by a SQLite database file
///
/// The schema is created on open. Foreign keys are enforced, so deleting a
/// row or column cascades to its cells.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, &SqliteOptions::default())
    }

    /// Open (or create) a database file
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: &SqliteOptions) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Opening SQLite store at {}", path.display());
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        conn.pragma_update(None, "journal_mode", &options.journal_mode)?;
        conn.pragma_update(None, "synchronous", &options.synchronous)?;
        Self::init(conn, options)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, &SqliteOptions::default())
    }

    fn init(conn: Connection, options: &SqliteOptions) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(options.busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn read_column(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Column, String)> {
    let settings: Option<String> = row.get(4)?;
    let column = Column {
        id: ColumnId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        column_type: ColumnType::Text,
        order_index: row.get(3)?,
        settings: codec::decode_settings(settings.as_deref()),
        created_seq: row.get::<_, i64>(5)? as u64,
    };
    Ok((column, row.get(2)?))
}

/// Resolve the type tag read alongside a column
fn finish_column((mut column, tag): (Column, String)) -> Result<Column> {
    column.column_type = tag
        .parse()
        .map_err(|_| StoreError::Corrupt(format!("column {} has type {tag:?}", column.id)))?;
    Ok(column)
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
    Ok(Row {
        id: RowId::new(row.get::<_, String>(0)?),
        order_index: row.get(1)?,
        created_seq: row.get::<_, i64>(2)? as u64,
    })
}

fn query_column(conn: &Connection, id: &ColumnId) -> Result<Column> {
    let sql = format!("SELECT {COLUMN_FIELDS} FROM tbl_columns WHERE id = ?1");
    conn.query_row(&sql, params![id.as_str()], read_column)
        .optional()?
        .ok_or_else(|| StoreError::not_found(kind::COLUMN, id.as_str()))
        .and_then(finish_column)
}

fn query_row(conn: &Connection, id: &RowId) -> Result<MaterializedRow> {
    let row = conn
        .query_row(
            "SELECT id, order_index, seq FROM tbl_rows WHERE id = ?1",
            params![id.as_str()],
            read_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found(kind::ROW, id.as_str()))?;

    let mut stmt = conn.prepare_cached("SELECT column_id, value FROM tbl_cells WHERE row_id = ?1")?;
    let cells = stmt
        .query_map(params![id.as_str()], |r| {
            Ok((
                ColumnId::new(r.get::<_, String>(0)?),
                StorageForm::from_option(r.get(1)?),
            ))
        })?
        .collect::<rusqlite::Result<_>>()?;
    Ok(MaterializedRow { row, cells })
}

fn insert_row(conn: &Connection, order_index: i64) -> Result<Row> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO tbl_rows (id, order_index) VALUES (?1, ?2)",
        params![id, order_index],
    )?;
    Ok(Row {
        id: RowId::new(id),
        order_index,
        created_seq: conn.last_insert_rowid() as u64,
    })
}

fn max_row_order(conn: &Connection) -> Result<Option<i64>> {
    Ok(conn.query_row("SELECT MAX(order_index) FROM tbl_rows", [], |r| r.get(0))?)
}

fn exists(conn: &Connection, table: &str, id: &str) -> Result<bool> {
    let sql = format!("SELECT 1 FROM {table} WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], |_| Ok(()))
        .optional()?
        .is_some())
}

fn upsert(conn: &Connection, row: &RowId, column: &ColumnId, stored: StorageForm) -> Result<()> {
    conn.prepare_cached(
        "INSERT INTO tbl_cells (row_id, column_id, value) VALUES (?1, ?2, ?3)
         ON CONFLICT (row_id, column_id) DO UPDATE SET value = excluded.value",
    )?
    .execute(params![row.as_str(), column.as_str(), stored.into_option()])?;
    Ok(())
}

fn check_row(conn: &Connection, row: &RowId) -> Result<()> {
    if exists(conn, "tbl_rows", row.as_str())? {
        Ok(())
    } else {
        Err(StoreError::not_found(kind::ROW, row.as_str()))
    }
}

fn check_column(conn: &Connection, column: &ColumnId) -> Result<()> {
    if exists(conn, "tbl_columns", column.as_str())? {
        Ok(())
    } else {
        Err(StoreError::not_found(kind::COLUMN, column.as_str()))
    }
}

impl Store for SqliteStore {
    fn get_columns(&self) -> Result<Vec<Column>> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {COLUMN_FIELDS} FROM tbl_columns ORDER BY order_index, seq");
        let mut stmt = conn.prepare(&sql)?;
        let raw = stmt
            .query_map([], read_column)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raw.into_iter().map(finish_column).collect()
    }

    fn get_column(&self, id: &ColumnId) -> Result<Column> {
        query_column(&self.conn.lock(), id)
    }

    fn create_column(&self, column: NewColumn) -> Result<Column> {
        let conn = self.conn.lock();
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO tbl_columns (id, name, column_type, order_index, settings) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                column.name,
                column.column_type.as_str(),
                column.order_index,
                codec::encode_settings(column.settings.as_ref()),
            ],
        )?;
        Ok(Column {
            id: ColumnId::new(id),
            name: column.name,
            column_type: column.column_type,
            order_index: column.order_index,
            settings: column.settings,
            created_seq: conn.last_insert_rowid() as u64,
        })
    }

    fn update_column(&self, id: &ColumnId, patch: &ColumnPatch) -> Result<Column> {
        let conn = self.conn.lock();
        let mut column = query_column(&conn, id)?;
        patch.apply_to(&mut column);
        conn.execute(
            "UPDATE tbl_columns SET name = ?2, column_type = ?3, order_index = ?4, settings = ?5 WHERE id = ?1",
            params![
                id.as_str(),
                column.name,
                column.column_type.as_str(),
                column.order_index,
                codec::encode_settings(column.settings.as_ref()),
            ],
        )?;
        Ok(column)
    }

    fn delete_column(&self, id: &ColumnId) -> Result<()> {
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM tbl_columns WHERE id = ?1", params![id.as_str()])?;
        if deleted == 0 {
            return Err(StoreError::not_found(kind::COLUMN, id.as_str()));
        }
        Ok(())
    }

    fn get_rows(&self) -> Result<Vec<MaterializedRow>> {
        let conn = self.conn.lock();

        let mut cells: HashMap<String, Vec<(ColumnId, StorageForm)>> = HashMap::new();
        let mut stmt = conn.prepare("SELECT row_id, column_id, value FROM tbl_cells")?;
        let mut results = stmt.query([])?;
        while let Some(r) = results.next()? {
            cells.entry(r.get(0)?).or_default().push((
                ColumnId::new(r.get::<_, String>(1)?),
                StorageForm::from_option(r.get(2)?),
            ));
        }

        let mut stmt = conn.prepare("SELECT id, order_index, seq FROM tbl_rows ORDER BY order_index, seq")?;
        let rows = stmt
            .query_map([], read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows
            .into_iter()
            .map(|row| MaterializedRow {
                cells: cells
                    .remove(row.id.as_str())
                    .map(|c| c.into_iter().collect())
                    .unwrap_or_default(),
                row,
            })
            .collect())
    }

    fn get_row(&self, id: &RowId) -> Result<MaterializedRow> {
        query_row(&self.conn.lock(), id)
    }

    fn create_row(&self, order_index: i64) -> Result<Row> {
        insert_row(&self.conn.lock(), order_index)
    }

    fn delete_row(&self, id: &RowId) -> Result<()> {
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM tbl_rows WHERE id = ?1", params![id.as_str()])?;
        if deleted == 0 {
            return Err(StoreError::not_found(kind::ROW, id.as_str()));
        }
        Ok(())
    }

    fn set_row_order(&self, id: &RowId, order_index: i64) -> Result<()> {
        let conn = self.conn.lock();
        let updated = conn.execute(
            "UPDATE tbl_rows SET order_index = ?2 WHERE id = ?1",
            params![id.as_str(), order_index],
        )?;
        if updated == 0 {
            return Err(StoreError::not_found(kind::ROW, id.as_str()));
        }
        Ok(())
    }

    fn get_cell(&self, row: &RowId, column: &ColumnId) -> Result<Option<StorageForm>> {
        let conn = self.conn.lock();
        check_row(&conn, row)?;
        let value: Option<Option<String>> = conn
            .query_row(
                "SELECT value FROM tbl_cells WHERE row_id = ?1 AND column_id = ?2",
                params![row.as_str(), column.as_str()],
                |r| r.get(0),
            )
            .optional()?;
        Ok(value.map(StorageForm::from_option))
    }

    fn upsert_cell(&self, row: &RowId, column: &ColumnId, stored: StorageForm) -> Result<()> {
        let conn = self.conn.lock();
        check_row(&conn, row)?;
        check_column(&conn, column)?;
        upsert(&conn, row, column, stored)
    }

    fn insert_cells(&self, row: &RowId, cells: Vec<(ColumnId, StorageForm)>) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        check_row(&tx, row)?;
        for (column, stored) in cells {
            check_column(&tx, &column)?;
            upsert(&tx, row, &column, stored)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn duplicate_row(&self, id: &RowId) -> Result<Row> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let source = query_row(&tx, id)?;
        let order_index = next_order_index(max_row_order(&tx)?);
        let row = insert_row(&tx, order_index)?;
        tx.execute(
            "INSERT INTO tbl_cells (row_id, column_id, value)
             SELECT ?2, column_id, value FROM tbl_cells WHERE row_id = ?1",
            params![source.id().as_str(), row.id.as_str()],
        )?;
        tx.commit()?;
        log::debug!("Duplicated row {} as {} ({} cells)", id, row.id, source.cell_count());
        Ok(row)
    }
}
