//! Sources of pool snapshots.
//!
//! Quoting never touches the network; a provider is only asked for a
//! [`Pool`] up front. [`StaticProvider`] serves fixtures from memory and
//! `onchain::OnchainContext` reads live state over JSON-RPC.

use crate::error::ProviderError;
use crate::pool::snapshot::Pool;
use crate::FastMap;
use alloy_primitives::{Address, BlockNumber};
use futures::future::{self, try_join_all};
use std::future::Future;

#[cfg(feature = "onchain")]
pub mod onchain;

/// Yields a validated [`Pool`] for an address, optionally pinned to a block.
pub trait PoolStateProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_pool(
        &self,
        pool: Address,
        block: Option<BlockNumber>,
    ) -> impl Future<Output = Result<Pool, Self::Error>> + Send;
}

/// Fetches several pools at the same block concurrently, preserving order.
pub async fn fetch_pools<P>(
    provider: &P,
    pools: &[Address],
    block: Option<BlockNumber>,
) -> Result<Vec<Pool>, P::Error>
where
    P: PoolStateProvider + Sync,
{
    try_join_all(pools.iter().map(|&pool| provider.fetch_pool(pool, block))).await
}

/// In-memory snapshots keyed by pool address. The block argument is ignored.
#[derive(Clone, Debug, Default)]
pub struct StaticProvider {
    pools: FastMap<Address, Pool>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any snapshot already held for `address`.
    pub fn insert(&mut self, address: Address, pool: Pool) -> Option<Pool> {
        self.pools.insert(address, pool)
    }

    pub fn with_pool(mut self, address: Address, pool: Pool) -> Self {
        self.pools.insert(address, pool);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

impl PoolStateProvider for StaticProvider {
    type Error = ProviderError;

    fn fetch_pool(
        &self,
        pool: Address,
        _block: Option<BlockNumber>,
    ) -> impl Future<Output = Result<Pool, Self::Error>> + Send {
        future::ready(
            self.pools
                .get(&pool)
                .cloned()
                .ok_or(ProviderError::UnknownPool(pool)),
        )
    }
}
