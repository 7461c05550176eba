//! Chain boundaries — genesis, head, and the average inter-block time.

use serde::{Deserialize, Serialize};

use crate::cache::CachedFetcher;
use crate::client::ChainClient;
use crate::error::FetchError;
use crate::types::Block;

/// The known extent of the chain at resolution time.
///
/// Resolved on demand and passed by value into the search, so the search
/// never observes a half-initialized state. Becomes stale when the real head
/// advances; the caller opts into a refresh per query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainBoundaries {
    /// The genesis block (height 1).
    pub first: Block,
    /// The chain head at resolution time.
    pub latest: Block,
    /// Average milliseconds per block across the whole chain. At least
    /// 1 ms — a single-block chain has no span to divide by and degenerates
    /// to the nominal rate.
    pub avg_block_time_ms: f64,
}

impl ChainBoundaries {
    /// Fetch genesis and head through the cache and derive the average rate.
    ///
    /// Genesis is usually already cached after the first resolution, so a
    /// refresh normally costs a single network fetch (the head).
    pub(crate) async fn resolve<C: ChainClient>(
        fetcher: &CachedFetcher<C>,
    ) -> Result<Self, FetchError> {
        let first = fetcher.block(Some(1)).await?;
        let latest = fetcher.block(None).await?;

        let span = latest.height.saturating_sub(first.height);
        let avg_block_time_ms = if span == 0 {
            1.0
        } else {
            first.millis_until(latest.time) as f64 / span as f64
        };

        tracing::debug!(
            first = first.height,
            latest = latest.height,
            avg_block_time_ms,
            "resolved chain boundaries"
        );

        Ok(Self {
            first,
            latest,
            avg_block_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedChain {
        /// Millisecond timestamps, index 0 = height 1.
        times: Vec<i64>,
    }

    #[async_trait]
    impl ChainClient for FixedChain {
        async fn fetch_block(&self, height: Option<u64>) -> Result<Block, FetchError> {
            let h = height.unwrap_or(self.times.len() as u64);
            match self.times.get(h.wrapping_sub(1) as usize) {
                Some(&ms) => Ok(Block::from_timestamp_millis(h, ms).unwrap()),
                None => Err(FetchError::MissingBlock { height: h }),
            }
        }
    }

    #[tokio::test]
    async fn average_rate_over_span() {
        let chain = FixedChain {
            times: vec![0, 10_000, 20_000, 30_000, 40_000],
        };
        let fetcher = CachedFetcher::new(chain);
        let bounds = ChainBoundaries::resolve(&fetcher).await.unwrap();
        assert_eq!(bounds.first.height, 1);
        assert_eq!(bounds.latest.height, 5);
        assert_eq!(bounds.avg_block_time_ms, 10_000.0);
        // Two fetches: genesis and head.
        assert_eq!(fetcher.requests(), 2);
    }

    #[tokio::test]
    async fn single_block_chain_uses_nominal_rate() {
        let fetcher = CachedFetcher::new(FixedChain { times: vec![5_000] });
        let bounds = ChainBoundaries::resolve(&fetcher).await.unwrap();
        assert_eq!(bounds.first, bounds.latest);
        assert_eq!(bounds.avg_block_time_ms, 1.0);
    }
}
