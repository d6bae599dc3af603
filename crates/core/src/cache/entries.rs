//! Entry CRUD inside a bucket.
//!
//! Entries are keyed by [`AssetRequest::cache_key`] and hold a complete
//! response (status line, headers, body).

use super::connection::CacheDb;
use crate::{AssetRequest, AssetResponse, Error};
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

impl CacheDb {
    /// Store a response for a request, replacing any previous entry.
    ///
    /// Returns false without writing if the bucket does not exist, so a store
    /// that races a bucket deletion cannot bring the bucket back.
    pub async fn put_entry(
        &self, bucket: &str, request: &AssetRequest, response: &AssetResponse,
    ) -> Result<bool, Error> {
        let bucket = bucket.to_string();
        let key = request.cache_key();
        let method = request.method.clone();
        let url = request.url.to_string();
        let status = response.status;
        let status_text = response.status_text.clone();
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let body = response.body.to_vec();
        let now = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "INSERT INTO cache_entries (
                        bucket, key, method, url, status, status_text, headers_json, body, stored_at
                    )
                    SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9
                    WHERE EXISTS (SELECT 1 FROM cache_buckets WHERE name = ?1)
                    ON CONFLICT(bucket, key) DO UPDATE SET
                        status = excluded.status,
                        status_text = excluded.status_text,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![&bucket, &key, &method, &url, status, &status_text, &headers_json, &body, &now],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the stored response for a request.
    ///
    /// Returns None if the bucket has no entry for it (or does not exist).
    pub async fn match_entry(&self, bucket: &str, request: &AssetRequest) -> Result<Option<AssetResponse>, Error> {
        let bucket = bucket.to_string();
        let key = request.cache_key();
        self.conn
            .call(move |conn| -> Result<Option<AssetResponse>, Error> {
                let row = conn.query_row(
                    "SELECT status, status_text, headers_json, body
                     FROM cache_entries WHERE bucket = ?1 AND key = ?2",
                    params![bucket, key],
                    |row| {
                        Ok((
                            row.get::<_, u16>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, Vec<u8>>(3)?,
                        ))
                    },
                );

                match row {
                    Ok((status, status_text, headers_json, body)) => {
                        let headers = serde_json::from_str(&headers_json)
                            .map_err(|e| Error::CorruptEntry(format!("headers for {key}: {e}")))?;
                        Ok(Some(AssetResponse { status, status_text, headers, body: Bytes::from(body) }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    pub async fn entry_count(&self, bucket: &str) -> Result<u64, Error> {
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_entries WHERE bucket = ?1", params![bucket], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// URLs of every entry in a bucket, in insertion order.
    pub async fn entry_urls(&self, bucket: &str) -> Result<Vec<String>, Error> {
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt =
                    conn.prepare("SELECT url FROM cache_entries WHERE bucket = ?1 ORDER BY rowid ASC")?;
                let urls = stmt
                    .query_map(params![bucket], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }
}
