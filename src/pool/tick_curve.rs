use crate::error::{CurveError, Error, StateError};
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
use serde::{Deserialize, Serialize};

/// Liquidity recorded at one initialized tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInfo {
    pub index: i32,
    /// Change in active liquidity when the price crosses this tick upwards.
    pub liquidity_net: i128,
    /// Total liquidity of all positions bounded by this tick.
    pub liquidity_gross: u128,
}

impl TickInfo {
    #[inline]
    pub fn new(index: i32, liquidity_net: i128, liquidity_gross: u128) -> Self {
        Self {
            index,
            liquidity_net,
            liquidity_gross,
        }
    }
}

/// The initialized ticks of a pool, sorted by index.
///
/// Construction validates spacing, ordering and range but accepts curves
/// whose nets do not sum to zero, since a partial snapshot is still a legal
/// input. [`TickCurve::is_balanced`] reports that separately, and the swap
/// engine refuses a cross that would push liquidity below zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TickCurveRepr", into = "TickCurveRepr")]
pub struct TickCurve {
    tick_spacing: i32,
    ticks: Vec<TickInfo>,
}

#[derive(Clone, Serialize, Deserialize)]
struct TickCurveRepr {
    tick_spacing: i32,
    ticks: Vec<TickInfo>,
}

impl TryFrom<TickCurveRepr> for TickCurve {
    type Error = Error;

    fn try_from(repr: TickCurveRepr) -> Result<Self, Self::Error> {
        TickCurve::new(repr.tick_spacing, repr.ticks)
    }
}

impl From<TickCurve> for TickCurveRepr {
    fn from(curve: TickCurve) -> Self {
        Self {
            tick_spacing: curve.tick_spacing,
            ticks: curve.ticks,
        }
    }
}

impl TickCurve {
    pub fn new(tick_spacing: i32, mut ticks: Vec<TickInfo>) -> Result<Self, Error> {
        if tick_spacing <= 0 {
            return Err(StateError::InvalidTickSpacing(tick_spacing).into());
        }

        ticks.sort_unstable_by_key(|t| t.index);

        for tick in &ticks {
            if !(MIN_TICK..=MAX_TICK).contains(&tick.index) {
                return Err(CurveError::TickOutOfBounds(tick.index).into());
            }
            if tick.index % tick_spacing != 0 {
                return Err(CurveError::MisalignedTick {
                    tick: tick.index,
                    tick_spacing,
                }
                .into());
            }
        }
        if let Some(pair) = ticks.windows(2).find(|w| w[0].index == w[1].index) {
            return Err(CurveError::DuplicateTick(pair[0].index).into());
        }

        Ok(Self {
            tick_spacing,
            ticks,
        })
    }

    #[inline]
    pub fn tick_spacing(&self) -> i32 {
        self.tick_spacing
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TickInfo> {
        self.ticks.iter()
    }

    pub fn get(&self, tick: i32) -> Option<&TickInfo> {
        self.ticks
            .binary_search_by_key(&tick, |t| t.index)
            .ok()
            .map(|idx| &self.ticks[idx])
    }

    /// Closest initialized tick at or below `tick` when `lte`, strictly above
    /// it otherwise. With nothing in that direction the matching tick bound
    /// comes back flagged as uninitialized.
    pub fn next_initialized_tick(&self, tick: i32, lte: bool) -> (i32, bool) {
        let idx = self.ticks.partition_point(|t| t.index <= tick);
        if lte {
            match idx.checked_sub(1) {
                Some(prev) => (self.ticks[prev].index, true),
                None => (MIN_TICK, false),
            }
        } else {
            match self.ticks.get(idx) {
                Some(next) => (next.index, true),
                None => (MAX_TICK, false),
            }
        }
    }

    /// Net liquidity delta stored at `tick`, `0` when it is not initialized.
    #[inline]
    pub fn cross_tick(&self, tick: i32) -> i128 {
        self.get(tick).map_or(0, |t| t.liquidity_net)
    }

    /// Sum of all net deltas, `None` if it leaves `i128`.
    pub fn net_liquidity_sum(&self) -> Option<i128> {
        self.ticks
            .iter()
            .try_fold(0i128, |acc, t| acc.checked_add(t.liquidity_net))
    }

    /// Every position that opens also closes.
    pub fn is_balanced(&self) -> bool {
        self.net_liquidity_sum() == Some(0)
    }

    /// Number of initialized ticks in the closed range spanned by `a` and `b`.
    pub fn count_between(&self, a: i32, b: i32) -> usize {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let start = self.ticks.partition_point(|t| t.index < lo);
        let end = self.ticks.partition_point(|t| t.index <= hi);
        end - start
    }

    /// Liquidity in range at `tick` implied by the curve alone: the sum of
    /// nets at or below it. `None` if a prefix goes negative.
    pub fn active_liquidity_at(&self, tick: i32) -> Option<u128> {
        let mut liquidity = 0u128;
        for t in self.ticks.iter().take_while(|t| t.index <= tick) {
            liquidity = crate::math::liquidity_math::add_delta(liquidity, t.liquidity_net).ok()?;
        }
        Some(liquidity)
    }
}
