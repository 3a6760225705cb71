//! Feed entities: a validated source description plus the operations to
//! persist, retrieve, and refresh it.

pub mod parser;
pub mod validate;

use crate::fetch::{self, FetchError, FetchResponse};
use crate::storage::{Database, FeedRecord};
use parser::ParseError;
use thiserror::Error;

/// Which field of a feed failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedField {
    Name,
    ProperName,
    Url,
}

impl std::fmt::Display for FeedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedField::Name => f.write_str("name"),
            FeedField::ProperName => f.write_str("proper name"),
            FeedField::Url => f.write_str("URL"),
        }
    }
}

/// Errors raised by feed lifecycle operations.
///
/// All of these propagate to the immediate caller; nothing is retried or
/// swallowed at this layer.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A field failed character-set validation before construction.
    #[error("invalid feed {field} '{value}'")]
    Validation { field: FeedField, value: String },
    /// A store operation failed; the in-memory record is unchanged.
    #[error("feed {operation} failed: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
    /// The operation exists on the interface but has no implementation yet.
    #[error("Feed::{method}() is not implemented")]
    NotImplemented { method: &'static str },
    /// Refresh failed while fetching the document.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Refresh failed while parsing the fetched document.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A validated feed and its persistence operations.
///
/// Construction via [`Feed::new`] validates every field before the record
/// exists — there is no partially-constructed state. Rows read back from
/// the store go through [`Feed::from_record`], which trusts them and skips
/// the character-set checks (deliberate asymmetry: the store is the
/// authority for data it already holds).
#[derive(Debug, Clone)]
pub struct Feed {
    record: FeedRecord,
}

impl Feed {
    /// Construct a feed from user-supplied fields.
    ///
    /// Fails on the first invalid field, naming it. On success the record
    /// carries defaults: id 0 (unset until inserted), update_interval 0,
    /// both timestamps 0, entries `[]`, context `{}`.
    pub fn new(name: &str, proper_name: &str, url: &str) -> Result<Self, FeedError> {
        if !validate::valid_name(name) {
            return Err(FeedError::Validation {
                field: FeedField::Name,
                value: name.to_string(),
            });
        }
        if !validate::valid_proper_name(proper_name) {
            return Err(FeedError::Validation {
                field: FeedField::ProperName,
                value: proper_name.to_string(),
            });
        }
        if !validate::valid_url(url) {
            return Err(FeedError::Validation {
                field: FeedField::Url,
                value: url.to_string(),
            });
        }

        Ok(Self {
            record: FeedRecord {
                name: name.to_string(),
                proper_name: proper_name.to_string(),
                url: url.to_string(),
                ..FeedRecord::default()
            },
        })
    }

    /// Wrap a record read from the store, bypassing validation.
    pub fn from_record(record: FeedRecord) -> Self {
        Self { record }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> i64 {
        self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn proper_name(&self) -> &str {
        &self.record.proper_name
    }

    pub fn url(&self) -> &str {
        &self.record.url
    }

    /// Refresh interval in seconds; 0 means unset.
    pub fn update_interval(&self) -> i64 {
        self.record.update_interval
    }

    pub fn set_update_interval(&mut self, seconds: i64) {
        self.record.update_interval = seconds;
    }

    pub fn date_added(&self) -> i64 {
        self.record.date_added
    }

    pub fn last_updated(&self) -> i64 {
        self.record.last_updated
    }

    /// Serialized entry sequence, `[]` when never refreshed.
    pub fn entries(&self) -> &str {
        &self.record.entries
    }

    /// Serialized key/value context, `{}` by default. Opaque at this layer.
    pub fn context(&self) -> &str {
        &self.record.context
    }

    pub fn record(&self) -> &FeedRecord {
        &self.record
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// List every feed in the store.
    ///
    /// An empty table yields an empty Vec, not an error. Rows are trusted
    /// and mapped positionally (see the schema contract in `storage`).
    pub async fn list(db: &Database) -> Result<Vec<Feed>, FeedError> {
        let records = db.list_feed_records().await.map_err(|source| {
            FeedError::Store {
                operation: "list",
                source,
            }
        })?;
        Ok(records.into_iter().map(Feed::from_record).collect())
    }

    /// Insert this feed, stamping both timestamps with the current time.
    pub async fn insert(&mut self, db: &Database) -> Result<(), FeedError> {
        self.insert_at(db, chrono::Utc::now().timestamp()).await
    }

    /// Insert this feed with an explicit clock value.
    ///
    /// `date_added` and `last_updated` are both set to `now`; the insert is
    /// committed before this returns. On success the store-assigned id is
    /// written back onto the record. On failure the record — including its
    /// unset id — is left untouched.
    pub async fn insert_at(&mut self, db: &Database, now: i64) -> Result<(), FeedError> {
        let id = db
            .insert_feed_record(&self.record, now)
            .await
            .map_err(|source| FeedError::Store {
                operation: "insert",
                source,
            })?;

        self.record.id = id;
        self.record.date_added = now;
        self.record.last_updated = now;

        tracing::info!(id = id, name = %self.record.name, "feed inserted");
        Ok(())
    }

    /// Not implemented yet; fails explicitly rather than silently no-opping.
    pub async fn update(&self, _db: &Database) -> Result<(), FeedError> {
        Err(FeedError::NotImplemented { method: "update" })
    }

    /// Not implemented yet; fails explicitly rather than silently no-opping.
    pub async fn delete(&self, _db: &Database) -> Result<(), FeedError> {
        Err(FeedError::NotImplemented { method: "delete" })
    }

    /// Fetch and parse the feed document, writing the resulting entries and
    /// refresh time back onto this entity (in-memory only — persisting a
    /// refreshed feed needs `update`, which does not exist yet).
    pub async fn refresh(
        &mut self,
        client: &reqwest::Client,
    ) -> Result<FetchResponse, FeedError> {
        self.refresh_at(client, chrono::Utc::now().timestamp()).await
    }

    /// [`Feed::refresh`] with an explicit clock value.
    pub async fn refresh_at(
        &mut self,
        client: &reqwest::Client,
        now: i64,
    ) -> Result<FetchResponse, FeedError> {
        // Advertise gzip; fetch::decode handles whatever comes back
        let headers = vec![("Accept-Encoding".to_string(), "gzip".to_string())];
        let response = fetch::fetch(client, &self.record.url, Some(&headers)).await?;

        let entries = parser::parse_entries(&response.content)?;
        // Entries are opaque past this point; the record stores them serialized
        self.record.entries =
            serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string());
        self.record.last_updated = now;

        tracing::info!(
            name = %self.record.name,
            entries = entries.len(),
            fingerprint = %response.content_hash,
            "feed refreshed"
        );
        Ok(response)
    }
}
