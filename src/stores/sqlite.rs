//! SQLite chunk store with vector search via the `sqlite-vec` extension.

use std::mem::transmute;
use std::os::raw::c_char;
use std::path::Path;
use std::sync::Once;

use async_trait::async_trait;
use tokio_rusqlite::{Connection, ffi};
use tracing::debug;

use super::{Backend, ChunkRecord};
use crate::types::RagError;

/// Chunk rows live in a plain `chunks` table; their vectors live in a
/// `chunks_embeddings` vec0 virtual table joined by rowid.
#[derive(Clone)]
pub struct SqliteChunkStore {
    conn: Connection,
    dims: usize,
}

impl SqliteChunkStore {
    /// Opens (or creates) the store at `path` for vectors of width `dims`.
    ///
    /// Fails with [`RagError::Storage`] when the file cannot be opened, the
    /// `sqlite-vec` extension is unavailable, or the schema cannot be
    /// created — callers treat that as the open-error signal for the
    /// rebuild fallback.
    pub async fn open(path: impl AsRef<Path>, dims: usize) -> Result<Self, RagError> {
        Self::register_sqlite_vec()?;
        let conn = Connection::open(path)
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;

        // Probe the extension before touching the schema.
        conn.call(|conn| {
            conn.query_row("select vec_version()", [], |row| row.get::<_, String>(0))
                .map(|_| ())
                .map_err(tokio_rusqlite::Error::Rusqlite)
        })
        .await
        .map_err(|err| RagError::Storage(err.to_string()))?;

        conn.call(move |conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS chunks (
                    id TEXT PRIMARY KEY,
                    source TEXT,
                    chunk_index INTEGER,
                    page INTEGER,
                    content TEXT
                )",
                [],
            )?;
            conn.execute(
                "CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source)",
                [],
            )?;
            conn.execute(
                &format!(
                    "CREATE VIRTUAL TABLE IF NOT EXISTS chunks_embeddings
                     USING vec0(embedding float[{dims}])"
                ),
                [],
            )?;
            Ok(())
        })
        .await
        .map_err(|err| RagError::Storage(err.to_string()))?;

        Ok(Self { conn, dims })
    }

    /// Vector width this store was opened with.
    pub fn dims(&self) -> usize {
        self.dims
    }

    fn register_sqlite_vec() -> Result<(), RagError> {
        use std::sync::Mutex;

        static INIT: Once = Once::new();
        static INIT_RESULT: Mutex<Option<Result<(), String>>> = Mutex::new(None);

        INIT.call_once(|| {
            let result = unsafe {
                type SqliteExtensionInit = unsafe extern "C" fn(
                    *mut ffi::sqlite3,
                    *mut *mut c_char,
                    *const ffi::sqlite3_api_routines,
                ) -> i32;

                let init: unsafe extern "C" fn() = sqlite_vec::sqlite3_vec_init;
                let init_fn: SqliteExtensionInit =
                    transmute::<unsafe extern "C" fn(), SqliteExtensionInit>(init);
                let rc = ffi::sqlite3_auto_extension(Some(init_fn));
                if rc != 0 {
                    Err(format!(
                        "failed to register sqlite-vec extension (code {rc})"
                    ))
                } else {
                    Ok(())
                }
            };
            *INIT_RESULT.lock().expect("init result mutex poisoned") = Some(result);
        });

        INIT_RESULT
            .lock()
            .expect("init result mutex poisoned")
            .clone()
            .expect("init was called but result not set")
            .map_err(RagError::Storage)
    }
}

#[async_trait]
impl Backend for SqliteChunkStore {
    async fn insert_chunks(&self, chunks: Vec<ChunkRecord>) -> Result<(), RagError> {
        if chunks.is_empty() {
            return Ok(());
        }
        let dims = self.dims;
        let mut rows = Vec::with_capacity(chunks.len());
        for record in chunks {
            let Some(embedding) = record.embedding else {
                return Err(RagError::Storage(format!(
                    "chunk {} has no embedding",
                    record.id
                )));
            };
            if embedding.len() != dims {
                return Err(RagError::Storage(format!(
                    "chunk {} embedding has {} dims, store expects {dims}",
                    record.id,
                    embedding.len()
                )));
            }
            let embedding_json = serde_json::to_string(&embedding)
                .map_err(|err| RagError::Storage(err.to_string()))?;
            rows.push((
                record.id,
                record.source,
                record.chunk_index as i64,
                record.page as i64,
                record.content,
                embedding_json,
            ));
        }

        let inserted = rows.len();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for (id, source, chunk_index, page, content, embedding_json) in rows {
                    tx.execute(
                        "INSERT INTO chunks (id, source, chunk_index, page, content)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        (id, source, chunk_index, page, content),
                    )?;
                    let rowid = tx.last_insert_rowid();
                    tx.execute(
                        "INSERT INTO chunks_embeddings (rowid, embedding) VALUES (?1, ?2)",
                        (rowid, embedding_json),
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(|err| RagError::Storage(err.to_string()))?;

        debug!(inserted, "chunks persisted");
        Ok(())
    }

    async fn search_similar(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<(ChunkRecord, f32)>, RagError> {
        if query_embedding.len() != self.dims {
            return Err(RagError::Storage(format!(
                "query embedding has {} dims, store expects {}",
                query_embedding.len(),
                self.dims
            )));
        }
        let embedding_json = serde_json::to_string(query_embedding)
            .map_err(|err| RagError::Storage(err.to_string()))?;

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT c.id, c.source, c.chunk_index, c.page, c.content,
                            vec_distance_cosine(e.embedding, vec_f32(?1)) AS distance
                     FROM chunks c
                     JOIN chunks_embeddings e ON e.rowid = c.rowid
                     ORDER BY distance ASC
                     LIMIT {top_k}"
                ))?;

                let rows = stmt.query_map([&embedding_json], |row| {
                    let record = ChunkRecord {
                        id: row.get(0)?,
                        source: row.get(1)?,
                        chunk_index: row.get::<_, i64>(2)? as usize,
                        page: row.get::<_, i64>(3)? as usize,
                        content: row.get(4)?,
                        embedding: None,
                    };
                    let distance: f32 = row.get(5)?;
                    Ok((record, 1.0 - distance))
                })?;

                let mut results = Vec::new();
                for row in rows {
                    results.push(row?);
                }
                Ok(results)
            })
            .await
            .map_err(|err| RagError::Storage(err.to_string()))
    }

    async fn count(&self) -> Result<usize, RagError> {
        self.conn
            .call(|conn| {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
            .map_err(|err| RagError::Storage(err.to_string()))
    }
}
