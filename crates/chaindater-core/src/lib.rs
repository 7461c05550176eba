//! chaindater-core — locate the block closest to a target date with a
//! minimal number of remote fetches.
//!
//! # Architecture
//!
//! ```text
//! BlockDater (query entry, predictive search)
//!     ├── ChainBoundaries  (genesis + head + average block time)
//!     ├── CachedFetcher    (height → block memoization, request counter)
//!     └── ChainClient      (injected "fetch by height or latest" capability)
//! ```
//!
//! The search interpolates a candidate height from the chain's average block
//! time, then refines it against observed block spacing until the candidate
//! brackets the target date. Every fetched block is memoized for the lifetime
//! of the dater, and each query tracks its own probed heights so refinement
//! can never stall.

pub mod boundaries;
pub mod cache;
pub mod client;
pub mod dater;
pub mod error;
pub mod types;

pub use boundaries::ChainBoundaries;
pub use cache::CachedFetcher;
pub use client::ChainClient;
pub use dater::BlockDater;
pub use error::FetchError;
pub use types::{Block, Bound};
