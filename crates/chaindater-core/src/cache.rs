//! Memoizing fetch layer — each height crosses the network at most once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::client::ChainClient;
use crate::error::FetchError;
use crate::types::Block;

/// Wraps a [`ChainClient`] with a per-height block cache and a request
/// counter.
///
/// The cache is append-only for the lifetime of the fetcher: block data for a
/// given height is immutable, so entries are never evicted or invalidated.
/// "Latest" fetches always go to the network (the head moves), but the block
/// they return is stored under the height the node reports, so later lookups
/// of that height are free.
pub struct CachedFetcher<C> {
    client: C,
    blocks: Mutex<HashMap<u64, Block>>,
    requests: AtomicU64,
}

impl<C: ChainClient> CachedFetcher<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            blocks: Mutex::new(HashMap::new()),
            requests: AtomicU64::new(0),
        }
    }

    /// Fetch the block at `height` (or the chain head when `None`), serving
    /// from the cache when possible.
    pub async fn block(&self, height: Option<u64>) -> Result<Block, FetchError> {
        if let Some(h) = height {
            if let Some(block) = self.blocks.lock().unwrap().get(&h) {
                tracing::trace!(height = h, "cache hit");
                return Ok(*block);
            }
        }

        let block = self.client.fetch_block(height).await?;
        self.requests.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(
            height = block.height,
            time = %block.time,
            requested = ?height,
            "fetched block"
        );

        // Concurrent fetches of the same height are idempotent; first insert
        // wins and both callers see identical data.
        let mut blocks = self.blocks.lock().unwrap();
        Ok(*blocks.entry(block.height).or_insert(block))
    }

    /// Total number of fetches that reached the network (cache hits excluded).
    /// Monotonically non-decreasing.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}
