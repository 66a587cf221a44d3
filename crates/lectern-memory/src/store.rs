// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed vector store with BLOB embeddings and JSON metadata.
//!
//! Similarity is computed in process: every candidate row is decoded and
//! ranked by cosine similarity. Suited to archives of thousands of sections,
//! not millions.

use std::path::Path;

use async_trait::async_trait;
use lectern_core::{
    AdapterType, HealthStatus, LecternError, Metadata, MetadataFilter, PluginAdapter, VectorMatch,
    VectorRecord, VectorStoreAdapter,
};
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use crate::types::{blob_to_vec, cosine_similarity, vec_to_blob};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS vectors (
    id TEXT PRIMARY KEY NOT NULL,
    text TEXT NOT NULL,
    embedding BLOB NOT NULL,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);";

fn storage_err(e: tokio_rusqlite::Error) -> LecternError {
    LecternError::Storage {
        source: Box::new(e),
    }
}

/// Persistent vector store in a single SQLite table.
pub struct SqliteVectorStore {
    conn: Connection,
}

/// A row as read from SQLite, before metadata is decoded.
type RawRow = (String, String, Vec<u8>, String);

impl SqliteVectorStore {
    /// Opens (or creates) the database at `path`, creating parent directories.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, LecternError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LecternError::Storage {
                    source: Box::new(e),
                })?;
        }
        let conn = Connection::open(path).await.map_err(|e| storage_err(e.into()))?;
        let store = Self::with_connection(conn).await?;
        info!(path = %path.display(), "vector store opened");
        Ok(store)
    }

    /// Opens a private in-memory database.
    pub async fn open_in_memory() -> Result<Self, LecternError> {
        let conn = Connection::open_in_memory().await.map_err(|e| storage_err(e.into()))?;
        Self::with_connection(conn).await
    }

    /// Wraps an existing connection, creating the table if needed.
    pub async fn with_connection(conn: Connection) -> Result<Self, LecternError> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(storage_err)?;
        Ok(Self { conn })
    }

    /// Removes a record. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> Result<bool, LecternError> {
        let id = id.to_string();
        let removed = self
            .conn
            .call(move |conn| {
                let n = conn.execute("DELETE FROM vectors WHERE id = ?1", rusqlite::params![id])?;
                Ok(n)
            })
            .await
            .map_err(storage_err)?;
        Ok(removed > 0)
    }

    async fn load_rows(&self) -> Result<Vec<RawRow>, LecternError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT id, text, embedding, metadata FROM vectors")?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                    })?
                    .collect::<Result<Vec<RawRow>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(storage_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteVectorStore {
    fn name(&self) -> &str {
        "sqlite-vectors"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorStore
    }

    async fn health_check(&self) -> Result<HealthStatus, LecternError> {
        match self.count().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), LecternError> {
        debug!("vector store shutting down");
        Ok(())
    }
}

#[async_trait]
impl VectorStoreAdapter for SqliteVectorStore {
    async fn upsert(&self, record: VectorRecord) -> Result<(), LecternError> {
        let metadata = serde_json::to_string(&record.metadata)?;
        let blob = vec_to_blob(&record.embedding);
        let VectorRecord { id, text, .. } = record;
        debug!(id = %id, dims = blob.len() / 4, "upserting vector");

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO vectors (id, text, embedding, metadata) VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(id) DO UPDATE SET text = excluded.text, embedding = excluded.embedding, metadata = excluded.metadata",
                    rusqlite::params![id, text, blob, metadata],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    async fn query(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<VectorMatch>, LecternError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for (id, text, blob, metadata_json) in self.load_rows().await? {
            let metadata: Metadata = serde_json::from_str(&metadata_json)?;
            if filter.is_some_and(|f| !f.matches(&metadata)) {
                continue;
            }
            let similarity = cosine_similarity(embedding, &blob_to_vec(&blob));
            matches.push(VectorMatch {
                id,
                text,
                metadata,
                similarity,
            });
        }

        matches.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(k);
        Ok(matches)
    }

    async fn count(&self) -> Result<usize, LecternError> {
        let n: i64 = self
            .conn
            .call(|conn| {
                let n = conn.query_row("SELECT COUNT(*) FROM vectors", [], |row| row.get(0))?;
                Ok(n)
            })
            .await
            .map_err(storage_err)?;
        Ok(usize::try_from(n).unwrap_or(0))
    }
}
