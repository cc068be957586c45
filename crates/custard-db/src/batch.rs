//! Chunked fan-out over store identifiers.
//!
//! Scope reads bind the whole id list into one `ANY($1)` parameter. Large
//! scopes are split so no single statement exceeds the configured size, the
//! chunks run concurrently, and the successes are concatenated in chunk
//! order. A failed chunk is logged and skipped; it never fails the whole read.

use std::fmt::Display;
use std::future::Future;

use futures::future::join_all;

/// Rows gathered from every chunk that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedRows<T> {
    pub rows: Vec<T>,
    pub failed_chunks: usize,
}

impl<T> Default for ChunkedRows<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            failed_chunks: 0,
        }
    }
}

/// Split `ids` into chunks of at most `chunk_size` and run `fetch` on each.
///
/// A `chunk_size` of zero is treated as one. Retrying a failed chunk is left
/// to the caller.
pub async fn fetch_chunked<T, E, F, Fut>(ids: &[String], chunk_size: usize, fetch: F) -> ChunkedRows<T>
where
    F: Fn(Vec<String>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
    E: Display,
{
    if ids.is_empty() {
        return ChunkedRows::default();
    }

    let chunk_size = chunk_size.max(1);
    let results = join_all(ids.chunks(chunk_size).map(|chunk| fetch(chunk.to_vec()))).await;

    let mut merged = ChunkedRows::default();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(rows) => merged.rows.extend(rows),
            Err(e) => {
                tracing::warn!(chunk = index, chunk_size, error = %e, "chunked read failed; skipping chunk");
                merged.failed_chunks += 1;
            }
        }
    }
    merged
}
