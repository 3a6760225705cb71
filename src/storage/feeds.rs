use sqlx::{QueryBuilder, Row};

use super::db::Database;
use super::types::FeedRecord;

impl Database {
    // ========================================================================
    // Feed Operations
    // ========================================================================

    /// Read every row of `rss_feeds`, mapped positionally.
    ///
    /// Column order (0=id .. 8=context) is fixed by the schema contract in
    /// `migrate`; this mapper relies on it instead of column names.
    pub async fn list_feed_records(&self) -> Result<Vec<FeedRecord>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM rss_feeds")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(FeedRecord {
                    id: row.try_get(0)?,
                    name: row.try_get(1)?,
                    proper_name: row.try_get(2)?,
                    url: row.try_get(3)?,
                    update_interval: row.try_get(4)?,
                    date_added: row.try_get(5)?,
                    last_updated: row.try_get(6)?,
                    entries: row.try_get(7)?,
                    context: row.try_get(8)?,
                })
            })
            .collect()
    }

    /// Insert a feed record, stamping both timestamp columns with `now`.
    ///
    /// `update_interval`, `entries`, and `context` come from the column
    /// defaults (0, '[]', '{}'). The transaction is committed before this
    /// returns — every successful insert is durable immediately. Returns
    /// the store-assigned row id.
    pub async fn insert_feed_record(
        &self,
        record: &FeedRecord,
        now: i64,
    ) -> Result<i64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
            "INSERT INTO rss_feeds (name, proper_name, url, date_added, last_updated) ",
        );
        builder.push_values(std::iter::once(record), |mut b, record| {
            b.push_bind(&record.name)
                .push_bind(&record.proper_name)
                .push_bind(&record.url)
                .push_bind(now)
                .push_bind(now);
        });

        let result = builder.build().execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(result.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn test_record(name: &str) -> FeedRecord {
        FeedRecord {
            name: name.to_string(),
            proper_name: "Test Feed".to_string(),
            url: format!("https://{}.example.com/rss.xml", name),
            ..FeedRecord::default()
        }
    }

    #[tokio::test]
    async fn test_empty_table_lists_empty() {
        let db = test_db().await;
        assert!(db.list_feed_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let db = test_db().await;
        let id1 = db.insert_feed_record(&test_record("one"), 100).await.unwrap();
        let id2 = db.insert_feed_record(&test_record("two"), 100).await.unwrap();
        assert_eq!(id1, 1);
        assert_eq!(id2, 2);
    }

    #[tokio::test]
    async fn test_unlisted_columns_take_schema_defaults() {
        let db = test_db().await;
        db.insert_feed_record(&test_record("one"), 1_700_000_000)
            .await
            .unwrap();

        let records = db.list_feed_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].update_interval, 0);
        assert_eq!(records[0].entries, "[]");
        assert_eq!(records[0].context, "{}");
        assert_eq!(records[0].date_added, 1_700_000_000);
        assert_eq!(records[0].last_updated, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected() {
        let db = test_db().await;
        db.insert_feed_record(&test_record("one"), 100).await.unwrap();
        assert!(db.insert_feed_record(&test_record("one"), 200).await.is_err());
    }
}
