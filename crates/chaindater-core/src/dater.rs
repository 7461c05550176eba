//! The predictive search — adaptive interpolation over the chain's timeline.
//!
//! # How a query runs
//!
//! 1. Resolve (or reuse) the chain boundaries: genesis, head, average rate.
//! 2. Dates outside `[genesis.time, head.time)` short-circuit to a boundary
//!    block; no search is needed.
//! 3. Linear interpolation against the chain-wide rate picks the first
//!    candidate height.
//! 4. The refinement loop probes candidates until one brackets the target:
//!    each step sizes its jump from the spacing of the last two probes, so
//!    the step adapts to local block-time variance.
//!
//! Every probe goes through the block cache, and each query tracks which
//! heights it has already proposed so candidate advancement can never stall
//! on a repeat.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::boundaries::ChainBoundaries;
use crate::cache::CachedFetcher;
use crate::client::ChainClient;
use crate::error::FetchError;
use crate::types::{Block, Bound};

/// Finds the block whose timestamp most tightly bounds a target date, using
/// as few network fetches as the chain's regularity allows.
///
/// One dater maintains one session: a shared block cache, a request counter,
/// and the most recently resolved [`ChainBoundaries`]. Concurrent queries on
/// the same dater share the cache but keep independent search state.
pub struct BlockDater<C> {
    fetcher: CachedFetcher<C>,
    boundaries: Mutex<Option<ChainBoundaries>>,
}

impl<C: ChainClient> BlockDater<C> {
    pub fn new(client: C) -> Self {
        Self {
            fetcher: CachedFetcher::new(client),
            boundaries: Mutex::new(None),
        }
    }

    /// The earliest block whose timestamp is at or after `date`.
    pub async fn block_after(&self, date: DateTime<Utc>) -> Result<Block, FetchError> {
        self.block_by_date(date, Bound::AtOrAfter, false).await
    }

    /// The latest block whose timestamp is strictly before `date`.
    pub async fn block_before(&self, date: DateTime<Utc>) -> Result<Block, FetchError> {
        self.block_by_date(date, Bound::Before, false).await
    }

    /// Find the block that most tightly bounds `date` per `bound`.
    ///
    /// Boundaries are resolved on first use and reused afterwards; pass
    /// `refresh = true` to re-probe the chain head first (the cached
    /// boundaries go stale whenever the real head advances).
    ///
    /// Dates before genesis return the genesis block; dates at or after the
    /// (resolved) head return the head. Any [`FetchError`] from the client
    /// aborts the query.
    pub async fn block_by_date(
        &self,
        date: DateTime<Utc>,
        bound: Bound,
        refresh: bool,
    ) -> Result<Block, FetchError> {
        let bounds = self.ensure_boundaries(refresh).await?;

        // No block precedes genesis, so a Before query at the genesis
        // timestamp has no satisfying block; the genesis block is the
        // tightest answer, same as for dates strictly before it. Without
        // this the refinement loop would have nothing to converge on.
        let no_predecessor = bound == Bound::Before && date == bounds.first.time;
        if date < bounds.first.time || no_predecessor {
            return Ok(bounds.first);
        }
        if date >= bounds.latest.time {
            return Ok(bounds.latest);
        }

        // Heights already proposed by this query. Scoped to this call, so
        // concurrent queries cannot disturb each other's bookkeeping.
        let mut visited = HashSet::new();

        let offset_ms = bounds.first.millis_until(date) as f64;
        let predicted_height = (offset_ms / nonzero_rate(bounds.avg_block_time_ms)).ceil() as u64;
        let predicted_height = predicted_height.clamp(1, bounds.latest.height);
        visited.insert(predicted_height);

        tracing::debug!(
            target = %date,
            bound = %bound,
            predicted = predicted_height,
            "starting block search"
        );

        let predicted = self.fetcher.block(Some(predicted_height)).await?;
        self.refine(
            date,
            predicted,
            bound,
            bounds.avg_block_time_ms,
            bounds.latest.height,
            &mut visited,
        )
        .await
    }

    /// Total number of fetches that reached the chain client (cache hits
    /// excluded). Monotonically non-decreasing.
    pub fn requests(&self) -> u64 {
        self.fetcher.requests()
    }

    /// The currently held boundaries, if any query has resolved them yet.
    pub async fn boundaries(&self) -> Option<ChainBoundaries> {
        *self.boundaries.lock().await
    }

    /// Return valid boundaries, resolving them when absent or on request.
    ///
    /// The lock is held across resolution so concurrent first queries
    /// coalesce into one pair of boundary fetches.
    async fn ensure_boundaries(&self, refresh: bool) -> Result<ChainBoundaries, FetchError> {
        let mut slot = self.boundaries.lock().await;
        if let Some(bounds) = *slot {
            if !refresh {
                return Ok(bounds);
            }
        }
        let resolved = ChainBoundaries::resolve(&self.fetcher).await?;
        *slot = Some(resolved);
        Ok(resolved)
    }

    /// Probe candidates until one brackets the target date.
    ///
    /// `block_time_ms` starts at the chain-wide average and is re-estimated
    /// after every probe from the two most recent blocks seen.
    async fn refine(
        &self,
        date: DateTime<Utc>,
        mut predicted: Block,
        bound: Bound,
        mut block_time_ms: f64,
        latest_height: u64,
        visited: &mut HashSet<u64>,
    ) -> Result<Block, FetchError> {
        loop {
            if self.brackets(date, predicted, bound).await? {
                tracing::debug!(height = predicted.height, bound = %bound, "search converged");
                return Ok(predicted);
            }

            let difference_ms = predicted.millis_until(date);
            let mut skip = (difference_ms as f64 / nonzero_rate(block_time_ms)).ceil() as i64;
            if skip == 0 {
                // Sub-rate gap still needs a move; step one block toward the
                // target.
                skip = if difference_ms < 0 { -1 } else { 1 };
            }

            let next_height = place_candidate(predicted.height, skip, latest_height, visited);
            let candidate = self.fetcher.block(Some(next_height)).await?;

            // Local spacing of the last two probes beats the chain-wide
            // average on irregular chains.
            let delta_height = candidate.height.abs_diff(predicted.height);
            if delta_height != 0 {
                block_time_ms =
                    candidate.millis_until(predicted.time).abs() as f64 / delta_height as f64;
            }

            tracing::debug!(
                from = predicted.height,
                to = candidate.height,
                block_time_ms,
                "refined candidate"
            );
            predicted = candidate;
        }
    }

    /// Bracket test: does `candidate` tightly bound `date` on the requested
    /// side? Fetches one adjacent block, and only when the candidate sits on
    /// the correct side of the target.
    async fn brackets(
        &self,
        date: DateTime<Utc>,
        candidate: Block,
        bound: Bound,
    ) -> Result<bool, FetchError> {
        match bound {
            Bound::AtOrAfter => {
                if candidate.time < date {
                    return Ok(false);
                }
                if candidate.height == 1 {
                    // Genesis has no predecessor to compare against.
                    return Ok(true);
                }
                let previous = self.fetcher.block(Some(candidate.height - 1)).await?;
                Ok(previous.time < date)
            }
            Bound::Before => {
                if candidate.time >= date {
                    return Ok(false);
                }
                let next = self.fetcher.block(Some(candidate.height + 1)).await?;
                Ok(next.time >= date)
            }
        }
    }
}

/// Substitute a nominal 1 ms rate for a degenerate zero so step computation
/// stays defined.
fn nonzero_rate(rate_ms: f64) -> f64 {
    if rate_ms == 0.0 {
        1.0
    } else {
        rate_ms
    }
}

/// Place the next candidate at `current + skip`, clamped to `[1, latest]`,
/// skipping heights this query has already proposed.
///
/// While the candidate is already visited, the skip widens away from zero and
/// the candidate is recomputed from the same `current`, so the proposal
/// sequence strictly expands. If widening is pinned against a range edge, the
/// placement scans linearly inward instead. Either way the returned height is
/// fresh, which makes the refinement loop's progress unconditional.
fn place_candidate(current: u64, skip: i64, latest: u64, visited: &mut HashSet<u64>) -> u64 {
    let clamp = |skip: i64| current.saturating_add_signed(skip).clamp(1, latest);

    let mut skip = skip;
    let mut candidate = clamp(skip);
    while visited.contains(&candidate) {
        skip = if skip >= 0 { skip + 1 } else { skip - 1 };
        let widened = clamp(skip);
        if widened == candidate {
            // Pinned at height 1 or at the head; widening no longer moves the
            // candidate. Walk back toward the interior for a fresh height.
            let step: i64 = if skip >= 0 { -1 } else { 1 };
            while visited.contains(&candidate) {
                let moved = candidate.saturating_add_signed(step).clamp(1, latest);
                if moved == candidate {
                    break; // every height in range has been probed
                }
                candidate = moved;
            }
            break;
        }
        candidate = widened;
    }

    visited.insert(candidate);
    candidate
}
