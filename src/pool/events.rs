use crate::FastMap;
use crate::error::{CurveError, Error, MathError};
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
use crate::pool::snapshot::{Pool, PoolSnapshot};
use crate::pool::tick_curve::{TickCurve, TickInfo};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// The pool log events that change what a quote sees.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    Mint {
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    },
    Burn {
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    },
    Swap {
        sqrt_price_x96: U256,
        liquidity: u128,
        tick: i32,
    },
}

/// Keeps a pool's state current by replaying its events in log order.
///
/// Unlike [`Pool`], the tracker is mutable; [`PoolTracker::freeze`] takes an
/// immutable copy to quote against.
#[derive(Clone, Debug)]
pub struct PoolTracker {
    snapshot: PoolSnapshot,
    ticks: FastMap<i32, TickInfo>,
}

impl From<Pool> for PoolTracker {
    fn from(pool: Pool) -> Self {
        let (snapshot, curve) = pool.into_parts();
        let ticks = curve.iter().map(|t| (t.index, *t)).collect();
        Self { snapshot, ticks }
    }
}

impl PoolTracker {
    /// Starts tracking from a snapshot with no initialized ticks.
    pub fn new(snapshot: PoolSnapshot) -> Result<Self, Error> {
        snapshot.validate()?;
        Ok(Self {
            snapshot,
            ticks: FastMap::default(),
        })
    }

    #[inline]
    pub fn snapshot(&self) -> &PoolSnapshot {
        &self.snapshot
    }

    pub fn tick(&self, index: i32) -> Option<&TickInfo> {
        self.ticks.get(&index)
    }

    pub fn apply_all<'a, I>(&mut self, events: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = &'a PoolEvent>,
    {
        events.into_iter().try_for_each(|event| self.apply(event))
    }

    /// Applies one event. On error the tracker is left unchanged.
    pub fn apply(&mut self, event: &PoolEvent) -> Result<(), Error> {
        match *event {
            PoolEvent::Mint {
                tick_lower,
                tick_upper,
                amount,
            } => self.modify_position(tick_lower, tick_upper, amount, true),
            PoolEvent::Burn {
                tick_lower,
                tick_upper,
                amount,
            } => self.modify_position(tick_lower, tick_upper, amount, false),
            PoolEvent::Swap {
                sqrt_price_x96,
                liquidity,
                tick,
            } => {
                let snapshot = PoolSnapshot {
                    sqrt_price_x96,
                    tick,
                    liquidity,
                    ..self.snapshot
                };
                snapshot.validate()?;
                self.snapshot = snapshot;
                trace!(tick, liquidity, %sqrt_price_x96, "tracked swap");
                Ok(())
            }
        }
    }

    fn check_position(&self, tick_lower: i32, tick_upper: i32) -> Result<(), Error> {
        if tick_lower >= tick_upper {
            return Err(CurveError::InvalidTickRange {
                lower: tick_lower,
                upper: tick_upper,
            }
            .into());
        }
        if tick_lower < MIN_TICK {
            return Err(CurveError::TickOutOfBounds(tick_lower).into());
        }
        if tick_upper > MAX_TICK {
            return Err(CurveError::TickOutOfBounds(tick_upper).into());
        }
        let tick_spacing = self.snapshot.tick_spacing;
        for tick in [tick_lower, tick_upper] {
            if tick % tick_spacing != 0 {
                return Err(CurveError::MisalignedTick { tick, tick_spacing }.into());
            }
        }
        Ok(())
    }

    fn updated_tick(
        &self,
        index: i32,
        amount: u128,
        net_delta: i128,
        add: bool,
    ) -> Result<TickInfo, Error> {
        let current = self
            .ticks
            .get(&index)
            .copied()
            .unwrap_or(TickInfo::new(index, 0, 0));

        let liquidity_gross = if add {
            current
                .liquidity_gross
                .checked_add(amount)
                .ok_or(MathError::Overflow)?
        } else {
            current
                .liquidity_gross
                .checked_sub(amount)
                .ok_or(CurveError::GrossLiquidityUnderflow(index))?
        };
        let liquidity_net = current
            .liquidity_net
            .checked_add(net_delta)
            .ok_or(CurveError::LiquidityNetOverflow(index))?;

        Ok(TickInfo::new(index, liquidity_net, liquidity_gross))
    }

    fn modify_position(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        add: bool,
    ) -> Result<(), Error> {
        self.check_position(tick_lower, tick_upper)?;
        // zero-amount burns are how positions collect fees
        if amount == 0 {
            return Ok(());
        }

        let signed = i128::try_from(amount).map_err(|_| MathError::Overflow)?;
        let delta = if add { signed } else { -signed };

        let lower = self.updated_tick(tick_lower, amount, delta, add)?;
        let upper = self.updated_tick(tick_upper, amount, -delta, add)?;

        let in_range = (tick_lower..tick_upper).contains(&self.snapshot.tick);
        let liquidity = if !in_range {
            self.snapshot.liquidity
        } else if add {
            self.snapshot
                .liquidity
                .checked_add(amount)
                .ok_or(MathError::Overflow)?
        } else {
            self.snapshot
                .liquidity
                .checked_sub(amount)
                .ok_or(CurveError::InRangeLiquidityUnderflow)?
        };

        for tick in [lower, upper] {
            if tick.liquidity_gross == 0 {
                self.ticks.remove(&tick.index);
            } else {
                self.ticks.insert(tick.index, tick);
            }
        }
        self.snapshot.liquidity = liquidity;

        debug!(
            kind = if add { "mint" } else { "burn" },
            tick_lower,
            tick_upper,
            amount,
            in_range,
            liquidity,
            "tracked position change"
        );
        Ok(())
    }

    /// Immutable copy of the current state, ready to quote against.
    pub fn freeze(&self) -> Result<Pool, Error> {
        let curve = TickCurve::new(
            self.snapshot.tick_spacing,
            self.ticks.values().copied().collect(),
        )?;
        Pool::new(self.snapshot, curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::math::tick_math::get_sqrt_ratio_at_tick;
    use crate::pool::swap::SwapParams;
    use alloy_primitives::I256;

    fn tracker() -> PoolTracker {
        let snapshot = PoolSnapshot::new(get_sqrt_ratio_at_tick(0).unwrap(), 0, 0, 3000, 60).unwrap();
        PoolTracker::new(snapshot).unwrap()
    }

    fn mint(tick_lower: i32, tick_upper: i32, amount: u128) -> PoolEvent {
        PoolEvent::Mint {
            tick_lower,
            tick_upper,
            amount,
        }
    }

    fn burn(tick_lower: i32, tick_upper: i32, amount: u128) -> PoolEvent {
        PoolEvent::Burn {
            tick_lower,
            tick_upper,
            amount,
        }
    }

    #[test]
    fn mint_updates_both_ends_and_range_liquidity() {
        let mut tracker = tracker();
        tracker.apply(&mint(-600, 600, 1_000)).unwrap();
        tracker.apply(&mint(600, 1200, 300)).unwrap();

        assert_eq!(tracker.tick(-600), Some(&TickInfo::new(-600, 1_000, 1_000)));
        assert_eq!(tracker.tick(600), Some(&TickInfo::new(600, -700, 1_300)));
        assert_eq!(tracker.tick(1200), Some(&TickInfo::new(1200, -300, 300)));
        // only the first position covers tick 0
        assert_eq!(tracker.snapshot().liquidity, 1_000);
    }

    #[test]
    fn burn_removes_emptied_ticks() {
        let mut tracker = tracker();
        tracker
            .apply_all(&[mint(-600, 600, 1_000), burn(-600, 600, 400)])
            .unwrap();
        assert_eq!(tracker.tick(-600), Some(&TickInfo::new(-600, 600, 600)));
        assert_eq!(tracker.snapshot().liquidity, 600);

        tracker.apply(&burn(-600, 600, 600)).unwrap();
        assert_eq!(tracker.tick(-600), None);
        assert_eq!(tracker.tick(600), None);
        assert_eq!(tracker.snapshot().liquidity, 0);
    }

    #[test]
    fn burn_beyond_gross_is_corruption_and_leaves_state() {
        let mut tracker = tracker();
        tracker.apply(&mint(-600, 600, 1_000)).unwrap();

        let err = tracker.apply(&burn(-600, 600, 1_001)).unwrap_err();
        assert_eq!(err, Error::CurveError(CurveError::GrossLiquidityUnderflow(-600)));
        assert_eq!(err.kind(), ErrorKind::Corruption);
        assert_eq!(tracker.tick(-600), Some(&TickInfo::new(-600, 1_000, 1_000)));
        assert_eq!(tracker.snapshot().liquidity, 1_000);
    }

    #[test]
    fn positions_are_validated() {
        let mut tracker = tracker();

        let err = tracker.apply(&mint(600, -600, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = tracker.apply(&mint(-601, 600, 1)).unwrap_err();
        assert_eq!(
            err,
            Error::CurveError(CurveError::MisalignedTick {
                tick: -601,
                tick_spacing: 60
            })
        );

        let err = tracker.apply(&mint(-600, MAX_TICK + 60, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);

        // a zero burn still has to name a valid range
        tracker.apply(&burn(-600, 600, 0)).unwrap();
        assert!(tracker.apply(&burn(600, 600, 0)).is_err());
    }

    #[test]
    fn swap_event_replaces_price_state() {
        let mut tracker = tracker();
        let price = get_sqrt_ratio_at_tick(-120).unwrap();
        tracker
            .apply(&PoolEvent::Swap {
                sqrt_price_x96: price,
                liquidity: 42,
                tick: -120,
            })
            .unwrap();
        assert_eq!(tracker.snapshot().slot0().sqrt_price_x96, price);
        assert_eq!(tracker.snapshot().tick, -120);
        assert_eq!(tracker.snapshot().liquidity, 42);

        let err = tracker
            .apply(&PoolEvent::Swap {
                sqrt_price_x96: U256::ZERO,
                liquidity: 0,
                tick: 0,
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(tracker.snapshot().tick, -120);
    }

    #[test]
    fn replayed_events_match_a_direct_curve() {
        let mut tracker = tracker();
        tracker
            .apply_all(&[
                mint(-1200, 1200, 5_000_000_000),
                mint(-600, 600, 2_000_000_000),
                mint(-120, 60, 700_000_000),
                burn(-600, 600, 500_000_000),
            ])
            .unwrap();
        let tracked = tracker.freeze().unwrap();

        let direct = Pool::new(
            PoolSnapshot::new(get_sqrt_ratio_at_tick(0).unwrap(), 0, 7_200_000_000, 3000, 60)
                .unwrap(),
            TickCurve::new(
                60,
                vec![
                    TickInfo::new(-1200, 5_000_000_000, 5_000_000_000),
                    TickInfo::new(-600, 1_500_000_000, 1_500_000_000),
                    TickInfo::new(-120, 700_000_000, 700_000_000),
                    TickInfo::new(60, -700_000_000, 700_000_000),
                    TickInfo::new(600, -1_500_000_000, 1_500_000_000),
                    TickInfo::new(1200, -5_000_000_000, 5_000_000_000),
                ],
            )
            .unwrap(),
        )
        .unwrap();

        assert_eq!(tracked, direct);
        assert!(tracked.curve().is_balanced());
        assert_eq!(
            tracked.curve().active_liquidity_at(0),
            Some(tracked.snapshot().liquidity)
        );

        let params = SwapParams::new(
            true,
            I256::from_raw(U256::from(10_000_000u64)),
            get_sqrt_ratio_at_tick(-1200).unwrap(),
        );
        assert_eq!(tracked.swap(params).unwrap(), direct.swap(params).unwrap());
    }

    #[test]
    fn tracker_round_trips_a_pool() {
        let mut tracker = tracker();
        tracker.apply(&mint(-600, 600, 1_000)).unwrap();
        let pool = tracker.freeze().unwrap();

        let again = PoolTracker::from(pool.clone()).freeze().unwrap();
        assert_eq!(again, pool);
    }

    #[test]
    fn events_deserialize_from_json() {
        let json = r#"[
            {"Mint": {"tick_lower": -60, "tick_upper": 60, "amount": 10}},
            {"Burn": {"tick_lower": -60, "tick_upper": 60, "amount": 4}}
        ]"#;
        let events: Vec<PoolEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events, vec![mint(-60, 60, 10), burn(-60, 60, 4)]);

        let mut tracker = tracker();
        tracker.apply_all(&events).unwrap();
        assert_eq!(tracker.snapshot().liquidity, 6);
    }
}
