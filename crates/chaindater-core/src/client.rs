//! The `ChainClient` trait — the single external collaborator.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::Block;

/// Capability to fetch one block from a remote chain node.
///
/// This is the only point where the search touches the network. Transport
/// concerns (connection setup, authentication, transport-level retries,
/// header deserialization) live behind implementations of this trait.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so one dater can serve concurrent
/// queries across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn ChainClient>`.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Fetch the block at `height`, or the current chain head when `height`
    /// is `None`.
    ///
    /// Fails with [`FetchError`] when the network call fails, the node has no
    /// block at that height, or the height is out of range.
    async fn fetch_block(&self, height: Option<u64>) -> Result<Block, FetchError>;
}

#[async_trait]
impl<T: ChainClient + ?Sized> ChainClient for std::sync::Arc<T> {
    async fn fetch_block(&self, height: Option<u64>) -> Result<Block, FetchError> {
        (**self).fetch_block(height).await
    }
}
