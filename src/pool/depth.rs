use crate::error::{CurveError, Error, MathError};
use crate::math::liquidity_math::add_delta;
use crate::math::sqrt_price_math::{get_amount_0_delta, get_amount_1_delta};
use crate::math::tick_math::{MAX_TICK, get_sqrt_ratio_at_tick};
use crate::pool::snapshot::Pool;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tokens held by the liquidity between two consecutive initialized ticks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityRange {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub amount0: U256,
    pub amount1: U256,
}

/// Token totals across every range of the curve.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityDepth {
    pub amount0: U256,
    pub amount1: U256,
}

impl Pool {
    /// Splits the curve into ranges of constant liquidity and prices the
    /// tokens each one holds at the snapshot price, rounding down.
    ///
    /// Ranges below the price hold only token1, ranges above it only token0,
    /// and the range containing it holds both. Liquidity is read off the
    /// curve alone; a running sum that would go negative is corruption. Net
    /// liquidity left over after the last tick extends to `MAX_TICK`.
    pub fn liquidity_ranges(&self) -> Result<Vec<LiquidityRange>, Error> {
        let price = self.snapshot().sqrt_price_x96;
        let ticks: Vec<_> = self.curve().iter().collect();
        let mut ranges = Vec::with_capacity(ticks.len());
        let mut liquidity = 0u128;

        for (i, tick) in ticks.iter().enumerate() {
            liquidity = add_delta(liquidity, tick.liquidity_net).map_err(|e| match e {
                MathError::Underflow => CurveError::LiquidityNetUnderflow(tick.index),
                _ => CurveError::LiquidityNetOverflow(tick.index),
            })?;
            if liquidity == 0 {
                continue;
            }
            let tick_upper = ticks.get(i + 1).map_or(MAX_TICK, |next| next.index);
            if tick_upper == tick.index {
                continue;
            }

            let sqrt_lower = get_sqrt_ratio_at_tick(tick.index)?;
            let sqrt_upper = get_sqrt_ratio_at_tick(tick_upper)?;
            let (amount0, amount1) = if price <= sqrt_lower {
                (
                    get_amount_0_delta(sqrt_lower, sqrt_upper, liquidity, false)?,
                    U256::ZERO,
                )
            } else if price >= sqrt_upper {
                (
                    U256::ZERO,
                    get_amount_1_delta(sqrt_lower, sqrt_upper, liquidity, false)?,
                )
            } else {
                (
                    get_amount_0_delta(price, sqrt_upper, liquidity, false)?,
                    get_amount_1_delta(sqrt_lower, price, liquidity, false)?,
                )
            };

            ranges.push(LiquidityRange {
                tick_lower: tick.index,
                tick_upper,
                liquidity,
                amount0,
                amount1,
            });
        }

        Ok(ranges)
    }

    /// Sum of [`Pool::liquidity_ranges`]. Each side equals what an unbounded
    /// swap could take out of the pool in that token.
    pub fn liquidity_depth(&self) -> Result<LiquidityDepth, Error> {
        let depth = self
            .liquidity_ranges()?
            .iter()
            .try_fold(LiquidityDepth::default(), |acc, range| {
                Some(LiquidityDepth {
                    amount0: acc.amount0.checked_add(range.amount0)?,
                    amount1: acc.amount1.checked_add(range.amount1)?,
                })
            })
            .ok_or(MathError::Overflow)?;

        debug!(
            amount0 = %depth.amount0,
            amount1 = %depth.amount1,
            "liquidity depth"
        );
        Ok(depth)
    }
}
