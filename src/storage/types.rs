use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Storage-layer errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Configured storage driver is not in the supported set
    #[error("invalid database driver '{0}'")]
    UnsupportedDriver(String),

    /// Another process has the database locked
    #[error("Another instance of gather appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if a sqlx error indicates database locking
    ///
    /// SQLITE_BUSY (5): database is locked
    /// SQLITE_LOCKED (6): database table is locked
    /// SQLITE_CANTOPEN (14): unable to open database file
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let error_string = err.to_string().to_lowercase();

        if error_string.contains("database is locked")
            || error_string.contains("database table is locked")
            || error_string.contains("sqlite_busy")
            || error_string.contains("sqlite_locked")
            || error_string.contains("unable to open database file")
        {
            return DatabaseError::InstanceLocked;
        }

        DatabaseError::Other(err)
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// One row of the `rss_feeds` table.
///
/// `id` is 0 until the store assigns a value at insert time. `entries` and
/// `context` hold serialized JSON that is opaque to the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRecord {
    pub id: i64,
    pub name: String,
    pub proper_name: String,
    pub url: String,
    /// Refresh interval in seconds; 0 = unset
    pub update_interval: i64,
    /// Unix timestamp, set at insert time
    pub date_added: i64,
    /// Unix timestamp, set at insert time
    pub last_updated: i64,
    pub entries: String,
    pub context: String,
}

impl Default for FeedRecord {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            proper_name: String::new(),
            url: String::new(),
            update_interval: 0,
            date_added: 0,
            last_updated: 0,
            entries: "[]".to_string(),
            context: "{}".to_string(),
        }
    }
}
