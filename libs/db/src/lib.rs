//! Database handle shared by the server and the modules.
//!
//! A [`DbHandle`] owns one sqlx pool (SQLite or PostgreSQL) and exposes it as a
//! SeaORM [`DatabaseConnection`]. Modules only ever see the SeaORM side.
//!
//! ```rust,no_run
//! # async fn demo() -> db::Result<()> {
//! use db::{ConnectOpts, DbHandle};
//!
//! let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
//! let conn = db.sea();
//! # let _ = conn;
//! db.close().await;
//! # Ok(())
//! # }
//! ```

pub mod errors;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sea_orm::DatabaseConnection;
#[cfg(feature = "pg")]
use sea_orm::SqlxPostgresConnector;
#[cfg(feature = "sqlite")]
use sea_orm::SqlxSqliteConnector;
#[cfg(feature = "pg")]
use sqlx::postgres::PgPoolOptions;
#[cfg(feature = "sqlite")]
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for the DB handle and helpers.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Invalid SQLite DSN: {0}")]
    InvalidSqliteDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Connection options; each driver applies the subset it supports.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    pub acquire_timeout: Option<Duration>,
    /// SQLite-specific: how long a writer waits on a locked database.
    pub sqlite_busy_timeout: Option<Duration>,
    /// For SQLite file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            acquire_timeout: Some(Duration::from_secs(30)),
            sqlite_busy_timeout: Some(Duration::from_millis(5_000)),
            create_sqlite_dirs: true,
        }
    }
}

/// Main handle.
#[derive(Clone)]
pub struct DbHandle {
    engine: DbEngine,
    dsn: String,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Detect engine by DSN scheme.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(dsn.to_string()))
        }
    }

    /// Connect and build handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        tracing::debug!(?engine, "connecting to database");
        match engine {
            #[cfg(feature = "pg")]
            DbEngine::Postgres => {
                let mut o = PgPoolOptions::new();
                if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                let pool = o.connect(dsn).await?;
                Ok(Self {
                    engine,
                    dsn: dsn.to_string(),
                    sea: SqlxPostgresConnector::from_sqlx_postgres_pool(pool),
                })
            }
            #[cfg(feature = "sqlite")]
            DbEngine::Sqlite => {
                let in_memory = is_memory_dsn(dsn);
                if !in_memory && opts.create_sqlite_dirs {
                    prepare_sqlite_path(dsn)?;
                }

                let mut conn_opts = SqliteConnectOptions::from_str(dsn)?
                    .create_if_missing(true)
                    .foreign_keys(true);
                if let Some(t) = opts.sqlite_busy_timeout {
                    conn_opts = conn_opts.busy_timeout(t);
                }
                if !in_memory {
                    conn_opts = conn_opts
                        .journal_mode(SqliteJournalMode::Wal)
                        .synchronous(SqliteSynchronous::Normal);
                }

                let mut o = SqlitePoolOptions::new();
                if in_memory {
                    // Every connection to :memory: is a separate database; keep exactly one alive.
                    o = o
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None);
                } else if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }

                let pool = o.connect_with(conn_opts).await?;
                Ok(Self {
                    engine,
                    dsn: dsn.to_string(),
                    sea: SqlxSqliteConnector::from_sqlx_sqlite_pool(pool),
                })
            }
            #[cfg(not(feature = "pg"))]
            DbEngine::Postgres => Err(DbError::FeatureDisabled("PostgreSQL feature not enabled")),
            #[cfg(not(feature = "sqlite"))]
            DbEngine::Sqlite => Err(DbError::FeatureDisabled("SQLite feature not enabled")),
        }
    }

    /// Graceful pool close.
    pub async fn close(self) {
        if let Err(e) = self.sea.close().await {
            tracing::warn!(error = %e, "failed to close database pool");
        }
    }

    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// Get SeaORM connection (clone; cheap handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }
}

fn is_memory_dsn(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

fn prepare_sqlite_path(dsn: &str) -> Result<()> {
    let raw = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .unwrap_or(dsn);
    if raw.starts_with("file:") {
        return Ok(());
    }
    let path = raw.split_once('?').map(|(p, _)| p).unwrap_or(raw);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Rewrite a `sqlite://` DSN so relative paths land under `base_dir`.
///
/// In-memory DSNs are normalized to `sqlite::memory:`; query strings are kept.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if is_memory_dsn(dsn) {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| DbError::InvalidSqliteDsn(format!("must start with sqlite:// (got: {dsn})")))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };
    if path_str.is_empty() {
        return Err(DbError::InvalidSqliteDsn("empty path".into()));
    }

    let mut p = PathBuf::from(path_str);
    if p.is_relative() {
        p = base_dir.join(p);
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Statement};

    #[test]
    fn backend_detection() {
        assert_eq!(DbHandle::detect("sqlite://test.db").unwrap(), DbEngine::Sqlite);
        assert_eq!(DbHandle::detect("sqlite::memory:").unwrap(), DbEngine::Sqlite);
        assert_eq!(
            DbHandle::detect("postgres://localhost/test").unwrap(),
            DbEngine::Postgres
        );
        assert!(matches!(
            DbHandle::detect("mysql://localhost/test"),
            Err(DbError::UnknownDsn(_))
        ));
    }

    #[test]
    fn relative_sqlite_path_is_anchored() {
        let base = Path::new("/srv/evently");
        let dsn = absolutize_sqlite_dsn("sqlite://database/evently.db?mode=rwc", base).unwrap();
        assert_eq!(dsn, "sqlite:///srv/evently/database/evently.db?mode=rwc");
    }

    #[test]
    fn memory_dsn_is_normalized() {
        let base = Path::new("/tmp");
        assert_eq!(
            absolutize_sqlite_dsn("sqlite://:memory:", base).unwrap(),
            "sqlite::memory:"
        );
        assert!(absolutize_sqlite_dsn("postgres://x", base).is_err());
        assert!(absolutize_sqlite_dsn("sqlite://", base).is_err());
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn sqlite_memory_connection() -> Result<()> {
        let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
        assert_eq!(db.engine(), DbEngine::Sqlite);
        let conn = db.sea();
        conn.execute(Statement::from_string(
            conn.get_database_backend(),
            "CREATE TABLE t (id INTEGER PRIMARY KEY)",
        ))
        .await?;
        // Same in-memory database is visible through a second handle clone.
        db.sea()
            .execute(Statement::from_string(
                conn.get_database_backend(),
                "INSERT INTO t (id) VALUES (1)",
            ))
            .await?;
        db.close().await;
        Ok(())
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn sqlite_file_creates_parent_dirs() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let dsn = absolutize_sqlite_dsn("sqlite://nested/data/app.db", tmp.path())?;
        let db = DbHandle::connect(&dsn, ConnectOpts::default()).await?;
        assert!(tmp.path().join("nested/data/app.db").exists());
        db.close().await;
        Ok(())
    }
}
