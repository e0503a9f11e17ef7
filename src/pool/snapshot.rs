use crate::error::{CurveError, Error, StateError};
use crate::math::tick_math::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use crate::pool::tick_curve::TickCurve;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot0 {
    pub sqrt_price_x96: U256,
    pub tick: i32,
}

/// Pool state a quote starts from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Current sqrt price, Q64.96.
    pub sqrt_price_x96: U256,
    pub tick: i32,
    /// Liquidity in range at `tick`.
    pub liquidity: u128,
    /// Swap fee in hundredths of a basis point.
    pub fee_pips: u32,
    pub tick_spacing: i32,
    /// Fee growth accumulators per unit of liquidity, Q128.128.
    #[serde(default)]
    pub fee_growth_global_0_x128: U256,
    #[serde(default)]
    pub fee_growth_global_1_x128: U256,
}

impl PoolSnapshot {
    pub fn new(
        sqrt_price_x96: U256,
        tick: i32,
        liquidity: u128,
        fee_pips: u32,
        tick_spacing: i32,
    ) -> Result<Self, Error> {
        let snapshot = Self {
            sqrt_price_x96,
            tick,
            liquidity,
            fee_pips,
            tick_spacing,
            fee_growth_global_0_x128: U256::ZERO,
            fee_growth_global_1_x128: U256::ZERO,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn with_fee_growth(mut self, global_0_x128: U256, global_1_x128: U256) -> Self {
        self.fee_growth_global_0_x128 = global_0_x128;
        self.fee_growth_global_1_x128 = global_1_x128;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.fee_pips >= 1_000_000 {
            return Err(StateError::InvalidFee(self.fee_pips).into());
        }
        if self.tick_spacing <= 0 {
            return Err(StateError::InvalidTickSpacing(self.tick_spacing).into());
        }
        if !(MIN_TICK..=MAX_TICK).contains(&self.tick) {
            return Err(StateError::TickOutOfBounds.into());
        }
        if self.sqrt_price_x96 < MIN_SQRT_RATIO || self.sqrt_price_x96 >= MAX_SQRT_RATIO {
            return Err(StateError::SqrtPriceOutOfBounds.into());
        }
        Ok(())
    }

    #[inline]
    pub fn slot0(&self) -> Slot0 {
        Slot0 {
            sqrt_price_x96: self.sqrt_price_x96,
            tick: self.tick,
        }
    }

    /// Accumulator of the token paid in for the given direction.
    #[inline]
    pub(crate) fn fee_growth_global_x128(&self, zero_for_one: bool) -> U256 {
        if zero_for_one {
            self.fee_growth_global_0_x128
        } else {
            self.fee_growth_global_1_x128
        }
    }
}

/// A snapshot paired with the tick curve it was captured with.
///
/// Immutable once built; share it by reference across concurrent quotes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PoolRepr", into = "PoolRepr")]
pub struct Pool {
    snapshot: PoolSnapshot,
    curve: TickCurve,
}

#[derive(Clone, Serialize, Deserialize)]
struct PoolRepr {
    snapshot: PoolSnapshot,
    curve: TickCurve,
}

impl TryFrom<PoolRepr> for Pool {
    type Error = Error;

    fn try_from(repr: PoolRepr) -> Result<Self, Self::Error> {
        Pool::new(repr.snapshot, repr.curve)
    }
}

impl From<Pool> for PoolRepr {
    fn from(pool: Pool) -> Self {
        Self {
            snapshot: pool.snapshot,
            curve: pool.curve,
        }
    }
}

impl Pool {
    pub fn new(snapshot: PoolSnapshot, curve: TickCurve) -> Result<Self, Error> {
        snapshot.validate()?;
        if curve.tick_spacing() != snapshot.tick_spacing {
            return Err(CurveError::TickSpacingMismatch {
                curve: curve.tick_spacing(),
                pool: snapshot.tick_spacing,
            }
            .into());
        }
        Ok(Self { snapshot, curve })
    }

    #[inline]
    pub fn snapshot(&self) -> &PoolSnapshot {
        &self.snapshot
    }

    #[inline]
    pub fn curve(&self) -> &TickCurve {
        &self.curve
    }

    pub fn into_parts(self) -> (PoolSnapshot, TickCurve) {
        (self.snapshot, self.curve)
    }
}
