use super::PoolStateProvider;
use crate::error::OnchainError;
use crate::pool::events::PoolEvent;
use crate::pool::snapshot::{Pool, PoolSnapshot};
use crate::pool::tick_curve::{TickCurve, TickInfo};
use crate::quote::{self, Direction};
use alloy::primitives::aliases::{U160, U24};
use alloy::primitives::{Address, BlockNumber, LogData, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::Filter;
use alloy::sol;
use alloy::sol_types::SolEvent;
use futures::try_join;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

sol! {
    #[sol(rpc)]
    interface IUniswapV3Pool {
        function slot0() external view returns (
            uint160 sqrtPriceX96,
            int24 tick,
            uint16 observationIndex,
            uint16 observationCardinality,
            uint16 observationCardinalityNext,
            uint8 feeProtocol,
            bool unlocked
        );
        function liquidity() external view returns (uint128);
        function fee() external view returns (uint24);
        function tickSpacing() external view returns (int24);
        function feeGrowthGlobal0X128() external view returns (uint256);
        function feeGrowthGlobal1X128() external view returns (uint256);

        event Mint(
            address sender,
            address indexed owner,
            int24 indexed tickLower,
            int24 indexed tickUpper,
            uint128 amount,
            uint256 amount0,
            uint256 amount1
        );
        event Burn(
            address indexed owner,
            int24 indexed tickLower,
            int24 indexed tickUpper,
            uint128 amount,
            uint256 amount0,
            uint256 amount1
        );
        event Swap(
            address indexed sender,
            address indexed recipient,
            int256 amount0,
            int256 amount1,
            uint160 sqrtPriceX96,
            uint128 liquidity,
            int24 tick
        );
    }
}

sol! {
    struct PopulatedTick {
        int24 tick;
        uint128 liquidityGross;
        int128 liquidityNet;
    }

    #[sol(rpc)]
    interface ITickLens {
        function getAllTicks(address pool) external view returns (PopulatedTick[] memory ticks);
    }
}

sol! {
    #[sol(rpc)]
    interface IQuoter {
        function quoteExactInputSingle(
            address tokenIn,
            address tokenOut,
            uint24 fee,
            uint256 amountIn,
            uint160 sqrtPriceLimitX96
        ) external returns (uint256 amountOut);
    }
}

/// A local exact-input quote next to the deployed quoter's answer for the
/// same pool, amount and block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteCheck {
    pub local_amount_out: U256,
    pub onchain_amount_out: U256,
}

impl QuoteCheck {
    #[inline]
    pub fn matches(&self) -> bool {
        self.local_amount_out == self.onchain_amount_out
    }

    #[inline]
    pub fn difference(&self) -> U256 {
        self.local_amount_out.abs_diff(self.onchain_amount_out)
    }
}

/// Where to read pool state from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnchainConfig {
    pub rpc_url: String,
    pub pool: Address,
    /// Lens contract exposing `getAllTicks(address)` on the same chain.
    pub lens: Address,
    /// Pin reads to this block; latest when unset.
    #[serde(default)]
    pub block_number: Option<BlockNumber>,
}

impl OnchainConfig {
    pub async fn connect(&self) -> Result<OnchainContext<DynProvider>, OnchainError> {
        let provider = ProviderBuilder::new()
            .connect(&self.rpc_url)
            .await
            .map_err(|e| OnchainError::FailedToConnect(e.to_string()))?;
        Ok(OnchainContext::new(Arc::new(provider.erased()), self.lens))
    }
}

/// Reads snapshots, tick curves and the event log over JSON-RPC.
#[derive(Debug)]
pub struct OnchainContext<P> {
    provider: Arc<P>,
    lens: Address,
}

impl<P> Clone for OnchainContext<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            lens: self.lens,
        }
    }
}

impl<P> OnchainContext<P>
where
    P: Provider + Send + Sync + 'static,
{
    pub fn new(provider: Arc<P>, lens: Address) -> Self {
        Self { provider, lens }
    }

    #[inline]
    pub fn lens(&self) -> Address {
        self.lens
    }

    /// Reads the scalar pool state at one block.
    pub async fn fetch_snapshot(
        &self,
        pool: Address,
        block_number: Option<BlockNumber>,
    ) -> Result<PoolSnapshot, OnchainError> {
        let contract = IUniswapV3Pool::new(pool, self.provider.clone());

        macro_rules! read {
            ($call:expr, $err:path) => {{
                let mut call = $call;
                if let Some(bn) = block_number {
                    call = call.block(bn.into());
                }
                async move { call.call().await.map_err(|e| $err(e.to_string())) }
            }};
        }

        let (slot0, liquidity, fee, tick_spacing, growth0, growth1) = try_join!(
            read!(contract.slot0(), OnchainError::FailedToGetSlot0),
            read!(contract.liquidity(), OnchainError::FailedToGetLiquidity),
            read!(contract.fee(), OnchainError::FailedToGetFee),
            read!(contract.tickSpacing(), OnchainError::FailedToGetTickSpacing),
            read!(contract.feeGrowthGlobal0X128(), OnchainError::FailedToGetFeeGrowth),
            read!(contract.feeGrowthGlobal1X128(), OnchainError::FailedToGetFeeGrowth),
        )?;

        let snapshot = PoolSnapshot::new(
            U256::from(slot0.sqrtPriceX96),
            slot0.tick.as_i32(),
            liquidity,
            fee.to::<u32>(),
            tick_spacing.as_i32(),
        )?
        .with_fee_growth(growth0, growth1);

        debug!(
            pool = %pool,
            sqrt_price_x96 = %snapshot.sqrt_price_x96,
            tick = snapshot.tick,
            liquidity = snapshot.liquidity,
            "Fetched pool snapshot"
        );
        Ok(snapshot)
    }

    /// Every initialized tick of `pool`, read through the lens in one call.
    pub async fn fetch_ticks(
        &self,
        pool: Address,
        block_number: Option<BlockNumber>,
    ) -> Result<Vec<TickInfo>, OnchainError> {
        let lens = ITickLens::new(self.lens, self.provider.clone());
        let mut call = lens.getAllTicks(pool);
        if let Some(bn) = block_number {
            call = call.block(bn.into());
        }

        let populated = call
            .call()
            .await
            .map_err(|e| OnchainError::FailedToGetTicks(e.to_string()))?;

        let ticks: Vec<TickInfo> = populated
            .into_iter()
            .map(|t| TickInfo::new(t.tick.as_i32(), t.liquidityNet, t.liquidityGross))
            .collect();
        debug!(pool = %pool, ticks = ticks.len(), "Fetched tick curve");
        Ok(ticks)
    }

    /// Mint, Burn and Swap events of `pool` in the inclusive block range,
    /// in log order, ready for [`crate::PoolTracker::apply_all`].
    pub async fn fetch_pool_events(
        &self,
        pool: Address,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<Vec<PoolEvent>, OnchainError> {
        let filter = Filter::new()
            .address(pool)
            .event_signature(vec![
                IUniswapV3Pool::Mint::SIGNATURE_HASH,
                IUniswapV3Pool::Burn::SIGNATURE_HASH,
                IUniswapV3Pool::Swap::SIGNATURE_HASH,
            ])
            .from_block(from_block)
            .to_block(to_block);

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| OnchainError::FailedToGetLogs(e.to_string()))?;

        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            if let Some(event) = decode_pool_event(log.data())? {
                events.push(event);
            }
        }
        debug!(pool = %pool, from_block, to_block, events = events.len(), "Fetched pool events");
        Ok(events)
    }

    /// `quoteExactInputSingle` on a deployed Uniswap V3 quoter, with no
    /// price limit.
    pub async fn fetch_quoter_amount_out(
        &self,
        quoter: Address,
        token_in: Address,
        token_out: Address,
        fee_pips: u32,
        amount_in: U256,
        block_number: Option<BlockNumber>,
    ) -> Result<U256, OnchainError> {
        let fee = U24::try_from(fee_pips).map_err(|e| OnchainError::FailedToQuote(e.to_string()))?;
        let contract = IQuoter::new(quoter, self.provider.clone());
        let mut call =
            contract.quoteExactInputSingle(token_in, token_out, fee, amount_in, U160::ZERO);
        if let Some(bn) = block_number {
            call = call.block(bn.into());
        }

        call.call()
            .await
            .map_err(|e| OnchainError::FailedToQuote(e.to_string()))
    }

    /// Quotes `amount_in` locally against `pool` and through `quoter`, for
    /// checking a snapshot against the chain it was read from. `pool` should
    /// have been fetched at `block_number`.
    pub async fn cross_check_exact_input(
        &self,
        pool: &Pool,
        quoter: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        block_number: Option<BlockNumber>,
    ) -> Result<QuoteCheck, OnchainError> {
        let direction = Direction::for_pair(token_in, token_out).map_err(crate::error::Error::from)?;
        let local = quote::quote_exact_input(pool, direction, amount_in, None)?;
        let onchain_amount_out = self
            .fetch_quoter_amount_out(
                quoter,
                token_in,
                token_out,
                pool.snapshot().fee_pips,
                amount_in,
                block_number,
            )
            .await?;

        let check = QuoteCheck {
            local_amount_out: local.amount_out,
            onchain_amount_out,
        };
        debug!(
            local = %check.local_amount_out,
            onchain = %check.onchain_amount_out,
            matches = check.matches(),
            "Cross-checked quote"
        );
        Ok(check)
    }
}

impl<P> PoolStateProvider for OnchainContext<P>
where
    P: Provider + Send + Sync + 'static,
{
    type Error = OnchainError;

    fn fetch_pool(
        &self,
        pool: Address,
        block: Option<BlockNumber>,
    ) -> impl Future<Output = Result<Pool, Self::Error>> + Send {
        async move {
            let (snapshot, ticks) =
                try_join!(self.fetch_snapshot(pool, block), self.fetch_ticks(pool, block))?;
            let curve = TickCurve::new(snapshot.tick_spacing, ticks)?;
            Ok(Pool::new(snapshot, curve)?)
        }
    }
}

/// Maps one raw pool log to the event the tracker consumes. Logs with other
/// signatures yield `None`.
pub fn decode_pool_event(data: &LogData) -> Result<Option<PoolEvent>, OnchainError> {
    let Some(topic0) = data.topics().first() else {
        return Ok(None);
    };
    let decode_err = |e: alloy::sol_types::Error| OnchainError::FailedToDecodeLog(e.to_string());

    let event = if *topic0 == IUniswapV3Pool::Mint::SIGNATURE_HASH {
        let mint = IUniswapV3Pool::Mint::decode_log_data(data).map_err(decode_err)?;
        PoolEvent::Mint {
            tick_lower: mint.tickLower.as_i32(),
            tick_upper: mint.tickUpper.as_i32(),
            amount: mint.amount,
        }
    } else if *topic0 == IUniswapV3Pool::Burn::SIGNATURE_HASH {
        let burn = IUniswapV3Pool::Burn::decode_log_data(data).map_err(decode_err)?;
        PoolEvent::Burn {
            tick_lower: burn.tickLower.as_i32(),
            tick_upper: burn.tickUpper.as_i32(),
            amount: burn.amount,
        }
    } else if *topic0 == IUniswapV3Pool::Swap::SIGNATURE_HASH {
        let swap = IUniswapV3Pool::Swap::decode_log_data(data).map_err(decode_err)?;
        PoolEvent::Swap {
            sqrt_price_x96: U256::from(swap.sqrtPriceX96),
            liquidity: swap.liquidity,
            tick: swap.tick.as_i32(),
        }
    } else {
        return Ok(None);
    };
    Ok(Some(event))
}
