use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

use super::types::DatabaseError;

// ============================================================================
// Driver
// ============================================================================

/// Closed set of supported storage backends.
///
/// Configuration selects the backend by tag; an unknown tag fails with
/// [`DatabaseError::UnsupportedDriver`] rather than a generic error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Driver {
    #[default]
    Sqlite,
}

impl FromStr for Driver {
    type Err = DatabaseError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "sqlite" => Ok(Driver::Sqlite),
            other => Err(DatabaseError::UnsupportedDriver(other.to_string())),
        }
    }
}

// ============================================================================
// Database
// ============================================================================

/// Handle to the feed store.
///
/// The pool is capped at a single connection: SQLite is single-writer and
/// every store operation in this crate is expected to run serialized
/// through one exclusive connection per process.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open a database connection and run migrations.
    ///
    /// The database file is created with mode 0600 if absent, and 0600 is
    /// re-applied unconditionally on every open, zeroing any broader
    /// group/other bits a pre-existing file may carry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InstanceLocked` if another process has the
    /// database locked (SQLITE_BUSY, SQLITE_LOCKED, SQLITE_CANTOPEN).
    /// Returns `DatabaseError::Migration` or `DatabaseError::Other` for
    /// everything else.
    pub async fn open(path: &str) -> Result<Self, DatabaseError> {
        let url = format!("sqlite:{}?mode=rwc", path);

        // Fix file permissions BEFORE pool creation so there is no window
        // where the file exists with default umask permissions
        #[cfg(unix)]
        if path != ":memory:" {
            use std::os::unix::fs::PermissionsExt;
            let db_path = std::path::Path::new(path);
            if !db_path.exists() {
                // Pre-create with mode(0o600) set at creation time, which
                // avoids a window between create and chmod
                use std::os::unix::fs::OpenOptionsExt;
                let _file = std::fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .mode(0o600)
                    .open(db_path)
                    .ok(); // If creation fails, SQLite reports the error at connect_with
            }
            if db_path.exists() {
                let perms = std::fs::Permissions::from_mode(0o600);
                if let Err(e) = std::fs::set_permissions(path, perms) {
                    tracing::warn!(path = %path, error = %e, "Failed to set database file permissions");
                }
            }
        }

        // busy_timeout=5000: SQLite waits up to 5 seconds for locks to
        // release before returning SQLITE_BUSY
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(DatabaseError::from_sqlx)?
            .pragma("busy_timeout", "5000");
        // One exclusive connection per process; callers serialize through it
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        let db = Self { pool };
        db.migrate().await.map_err(|e| {
            // Migration errors can also be lock-related
            let error_string = e.to_string().to_lowercase();
            if error_string.contains("database is locked")
                || error_string.contains("database table is locked")
                || error_string.contains("sqlite_busy")
                || error_string.contains("sqlite_locked")
            {
                DatabaseError::InstanceLocked
            } else {
                DatabaseError::Migration(e.to_string())
            }
        })?;
        Ok(db)
    }

    /// Run schema migrations atomically within a transaction.
    ///
    /// The column order of `rss_feeds` is a contract: rows are mapped
    /// positionally in `list_feed_records`, so columns must never be
    /// reordered or inserted in the middle.
    ///
    /// All statements use `IF NOT EXISTS` for idempotency; re-running on an
    /// existing database is a no-op.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Positional contract:
        //   0 = id
        //   1 = name
        //   2 = proper_name
        //   3 = url
        //   4 = update_interval
        //   5 = date_added
        //   6 = last_updated
        //   7 = entries
        //   8 = context
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rss_feeds (
                id INTEGER PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                proper_name TEXT NOT NULL,
                url TEXT NOT NULL,
                update_interval INTEGER NOT NULL DEFAULT 0,
                date_added INTEGER NOT NULL DEFAULT 0,
                last_updated INTEGER NOT NULL DEFAULT 0,
                entries TEXT NOT NULL DEFAULT '[]',
                context TEXT NOT NULL DEFAULT '{}'
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = Database::open(":memory:").await.unwrap();
        // Migration must be idempotent: run it again on the same pool
        db.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn test_driver_parse() {
        assert_eq!("sqlite".parse::<Driver>().unwrap(), Driver::Sqlite);

        let err = "postgres".parse::<Driver>().unwrap_err();
        assert!(err.to_string().contains("postgres"));
        match err {
            DatabaseError::UnsupportedDriver(tag) => assert_eq!(tag, "postgres"),
            other => panic!("expected UnsupportedDriver, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_new_database_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = std::env::temp_dir().join("gather_db_test_create");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feeds.db");
        std::fs::remove_file(&path).ok();

        let _db = Database::open(path.to_str().unwrap()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_broad_permissions_are_tightened_on_open() {
        use std::os::unix::fs::PermissionsExt;

        let dir = std::env::temp_dir().join("gather_db_test_chmod");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feeds.db");
        std::fs::remove_file(&path).ok();

        // First open creates the file, then loosen it behind our back
        let _db = Database::open(path.to_str().unwrap()).await.unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let _db = Database::open(path.to_str().unwrap()).await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600, "0600 is re-applied on every open");

        std::fs::remove_dir_all(&dir).ok();
    }
}
