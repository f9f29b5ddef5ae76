//! Database Connection Management
//!
//! Opens the libsql database file and creates the schema on startup.
//!
//! # Schema
//!
//! - `problems` - one row per problem, keyed by slug. `examples` and `hints`
//!   hold JSON arrays of strings, `content_format` records how the rich-text
//!   columns are encoded (NULL for rows written before the column existed)
//! - `tags` - uniquely named labels, `name` backed by a UNIQUE index
//! - `problem_tags` - `(problem_id, tag_id)` associations. There is no foreign
//!   key to `tags`: deleting a tag leaves its association rows behind
//!
//! Tables are created with `CREATE TABLE IF NOT EXISTS`; there are no
//! migrations.
//!
//! # Connections
//!
//! Use [`DatabaseService::connect_with_timeout`] in async code. Every
//! connection it hands out waits up to 5 seconds on a locked database
//! instead of failing with `SQLITE_BUSY`.

use crate::db::error::DatabaseError;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;

/// Database service for managing the libsql connection and schema
///
/// # Examples
///
/// ```no_run
/// use problem_admin_core::db::DatabaseService;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db_path = PathBuf::from("/path/to/problems.db");
///     let db_service = DatabaseService::new(db_path).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

impl DatabaseService {
    /// Open (or create) the database at `db_path` and initialize the schema
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if:
    /// - Parent directory cannot be created
    /// - Database connection fails
    /// - Schema initialization fails
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        let is_new_database = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.initialize_schema(is_new_database).await?;

        tracing::info!("Database ready at {}", service.db_path.display());

        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so they go through query() rather than
    /// execute().
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Create tables and indexes; safe to call on an existing database
    async fn initialize_schema(&self, is_new_database: bool) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        let statements = [
            (
                "problems table",
                "CREATE TABLE IF NOT EXISTS problems (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    examples TEXT NOT NULL DEFAULT '[]',
                    requirements TEXT NOT NULL DEFAULT '',
                    theory TEXT NOT NULL DEFAULT '',
                    hints TEXT NOT NULL DEFAULT '[]',
                    constraints TEXT NOT NULL DEFAULT '',
                    difficulty TEXT NOT NULL DEFAULT 'easy',
                    runner_template TEXT NOT NULL DEFAULT '',
                    content_format TEXT,
                    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                )",
            ),
            (
                "tags table",
                "CREATE TABLE IF NOT EXISTS tags (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                )",
            ),
            (
                "problem_tags table",
                "CREATE TABLE IF NOT EXISTS problem_tags (
                    problem_id TEXT NOT NULL,
                    tag_id TEXT NOT NULL,
                    PRIMARY KEY (problem_id, tag_id)
                )",
            ),
            (
                "index 'idx_tags_name'",
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_tags_name ON tags(name)",
            ),
            (
                "index 'idx_problem_tags_tag'",
                "CREATE INDEX IF NOT EXISTS idx_problem_tags_tag ON problem_tags(tag_id)",
            ),
        ];

        for (what, sql) in statements {
            conn.execute(sql, ()).await.map_err(|e| {
                DatabaseError::initialization_failed(format!("Failed to create {}: {}", what, e))
            })?;
        }

        // Flush the fresh schema out of the WAL so other connections see it
        if is_new_database {
            self.execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
                .await?;
        }

        Ok(())
    }

    /// Get a raw connection
    ///
    /// Prefer [`connect_with_timeout`](Self::connect_with_timeout) in async
    /// code.
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get a connection with a 5 second busy timeout
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;

        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;

        Ok(conn)
    }
}
