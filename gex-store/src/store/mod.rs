//! Read-only access to the expression catalog

use std::path::{Path, PathBuf};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags, Row};
use tracing::debug;

use gex_core::{GexError, GexResult};

use crate::sql::SqlArgs;

/// Name of the catalog database inside the data directory
pub const CATALOG_FILE: &str = "gex.db";

const POOL_SIZE: u32 = 8;

/// Handle to the SQLite catalog, opened read-only at construction.
///
/// One store is shared per process and the pool serves concurrent readers.
/// The store never writes to the catalog; the only DDL that runs through it
/// is connection-local TEMP table setup inside resolver transactions, which
/// SQLite permits on read-only databases.
pub struct CatalogStore {
    pool: Pool<SqliteConnectionManager>,
    dir: PathBuf,
}

impl CatalogStore {
    /// Open the catalog under `dir`.
    ///
    /// Fails with `Config` when `dir/gex.db` is missing or unreadable.
    pub fn open(dir: &Path) -> GexResult<CatalogStore> {
        let path = dir.join(CATALOG_FILE);

        if !path.is_file() {
            return Err(GexError::Config(format!(
                "catalog {CATALOG_FILE} not found in data directory"
            )));
        }

        let manager = SqliteConnectionManager::file(&path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX);

        let pool = Pool::builder()
            .max_size(POOL_SIZE)
            .build(manager)
            .map_err(|err| GexError::Config(err.to_string()))?;

        debug!("opened catalog in {}", dir.display());

        Ok(CatalogStore {
            pool,
            dir: dir.to_path_buf(),
        })
    }

    /// Data directory the catalog was opened from. Expression file urls in
    /// the catalog are relative to this directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check out one pooled connection for the duration of `f`.
    ///
    /// Anything that must observe connection-local state, such as the
    /// resolver's TEMP table or an open transaction, runs entirely inside
    /// one such scope so every statement sees the same physical connection.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> GexResult<T>,
    ) -> GexResult<T> {
        let mut conn = self.pool.get()?;
        f(&mut conn)
    }

    /// Run a query and collect the mapped rows.
    pub fn query_rows<T, F>(&self, sql: &str, args: &SqlArgs, map: F) -> GexResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_connection(|conn| query_rows(conn, sql, args, map))
    }

    /// Run a query expected to produce at most one row.
    pub fn query_row_opt<T, F>(&self, sql: &str, args: &SqlArgs, map: F) -> GexResult<Option<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_connection(|conn| query_row_opt(conn, sql, args, map))
    }
}

/// Statement-level helper usable inside a pinned connection scope.
pub fn query_rows<T, F>(
    conn: &Connection,
    sql: &str,
    args: &SqlArgs,
    mut map: F,
) -> GexResult<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let params = args.params();
    let mut rows = stmt.query(params.as_slice())?;

    let mut out = Vec::new();

    while let Some(row) = rows.next()? {
        out.push(map(row)?);
    }

    Ok(out)
}

/// Single-row variant of [`query_rows`]; `None` when no row matched.
pub fn query_row_opt<T, F>(
    conn: &Connection,
    sql: &str,
    args: &SqlArgs,
    mut map: F,
) -> GexResult<Option<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let params = args.params();
    let mut rows = stmt.query(params.as_slice())?;

    match rows.next()? {
        Some(row) => Ok(Some(map(row)?)),
        None => Ok(None),
    }
}
