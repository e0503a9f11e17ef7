use crate::error::{CurveError, Error, MathError, SwapError};
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::{mul_div, mul_div_rounding_up, unlikely};
use crate::math::sqrt_price_math::{get_amount_0_delta, get_amount_1_delta};
use crate::math::swap_math::compute_swap_step;
use crate::math::tick_math::{
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, get_sqrt_ratio_at_tick,
    get_tick_at_sqrt_ratio,
};
use crate::pool::snapshot::Pool;
use crate::{Q128, U256_E6};
use alloy_primitives::{I256, Sign, U256};
use tracing::{debug, trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapParams {
    /// Swap direction: `true` for token0 → token1, `false` for token1 → token0.
    pub zero_for_one: bool,
    /// Signed amount being swapped. Positive means “exact in”, negative means “exact out”.
    pub amount_specified: I256,
    /// Sqrt‑price limit in Q96 that bounds how far the price is allowed to move.
    pub sqrt_price_limit_x96: U256,
}

impl SwapParams {
    #[inline]
    pub fn new(zero_for_one: bool, amount_specified: I256, sqrt_price_limit_x96: U256) -> Self {
        Self {
            zero_for_one,
            amount_specified,
            sqrt_price_limit_x96,
        }
    }
}

/// Outcome of [`Pool::swap`].
///
/// `amount0_delta`/`amount1_delta` are signed from the pool's side: positive
/// flows into the pool. `amount_in`/`amount_out` are the same amounts from
/// the trader's side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapResult {
    pub amount0_delta: I256,
    pub amount1_delta: I256,
    pub amount_in: U256,
    pub amount_out: U256,
    /// Total fee charged in the input token.
    pub fees_paid: U256,
    /// Input-token fee accumulator after the swap.
    pub fee_growth_global_x128: U256,
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub tick: i32,
    pub steps: usize,
    pub ticks_crossed: usize,
}

// the top level state of the swap, discarded once the loop ends
struct SwapState {
    // the amount remaining to be swapped in/out of the input/output asset
    amount_specified_remaining: I256,
    // the amount already swapped out/in of the output/input asset
    amount_calculated: I256,
    sqrt_price_x96: U256,
    // the tick associated with the current price
    tick: i32,
    // fee accumulator of the input token, wraps modulo 2^256
    fee_growth_global_x128: U256,
    // the current liquidity in range
    liquidity: u128,
    fees_paid: U256,
}

#[derive(Default)]
struct StepComputations {
    // the price at the beginning of the step
    sqrt_price_start_x96: U256,
    // the next tick to swap to from the current tick in the swap direction
    tick_next: i32,
    // whether tick_next is initialized or not
    initialized: bool,
    // sqrt(price) for the next tick
    sqrt_price_next_x96: U256,
    amount_in: U256,
    amount_out: U256,
    fee_amount: U256,
}

/// Adds one step's fee, per unit of in-range liquidity, to a Q128.128
/// accumulator. The accumulator wraps like the on-chain `uint256`; with no
/// liquidity in range there is nobody to credit and it stays put.
pub fn accumulate_fee_growth(
    fee_growth_global_x128: U256,
    fee_amount: U256,
    liquidity: u128,
) -> Result<U256, MathError> {
    if liquidity == 0 {
        return Ok(fee_growth_global_x128);
    }
    let growth = mul_div(fee_amount, Q128, U256::from(liquidity))?;
    Ok(fee_growth_global_x128.wrapping_add(growth))
}

#[inline]
fn to_signed(value: U256) -> Result<I256, MathError> {
    I256::checked_from_sign_and_abs(Sign::Positive, value).ok_or(MathError::Overflow)
}

/// Clamps the next tick's price to the limit in the swap direction.
#[inline]
fn step_target(zero_for_one: bool, sqrt_price_next_x96: U256, sqrt_price_limit_x96: U256) -> U256 {
    if zero_for_one {
        sqrt_price_next_x96.max(sqrt_price_limit_x96)
    } else {
        sqrt_price_next_x96.min(sqrt_price_limit_x96)
    }
}

impl Pool {
    /// Cross `tick_next`: apply its net delta (negated when the price moves
    /// down) to `liquidity`.
    fn cross(&self, tick_next: i32, zero_for_one: bool, liquidity: u128) -> Result<u128, Error> {
        let mut liquidity_net = self.curve().cross_tick(tick_next);
        if zero_for_one {
            liquidity_net = liquidity_net
                .checked_neg()
                .ok_or(CurveError::LiquidityNetOverflow(tick_next))?;
        }
        let next = add_delta(liquidity, liquidity_net).map_err(|e| match e {
            MathError::Underflow => CurveError::LiquidityNetUnderflow(tick_next),
            _ => CurveError::LiquidityNetOverflow(tick_next),
        })?;
        debug!(
            tick = tick_next,
            liquidity_net,
            liquidity_before = liquidity,
            liquidity_after = next,
            "crossed tick"
        );
        Ok(next)
    }

    /// Replays a Uniswap V3 swap against this snapshot without mutating it.
    ///
    /// The price walks from the snapshot price toward `sqrt_price_limit_x96`
    /// one liquidity range at a time until either the specified amount is
    /// used up or the limit is reached. A limit equal to the current price
    /// is a no-op and returns zero amounts.
    pub fn swap(&self, params: SwapParams) -> Result<SwapResult, Error> {
        let SwapParams {
            zero_for_one,
            amount_specified,
            sqrt_price_limit_x96,
        } = params;
        let snapshot = self.snapshot();
        let curve = self.curve();

        if unlikely(amount_specified.is_zero()) {
            return Err(SwapError::AmountSpecifiedIsZero.into());
        }

        let mut state = SwapState {
            amount_specified_remaining: amount_specified,
            amount_calculated: I256::ZERO,
            sqrt_price_x96: snapshot.sqrt_price_x96,
            tick: snapshot.tick,
            fee_growth_global_x128: snapshot.fee_growth_global_x128(zero_for_one),
            liquidity: snapshot.liquidity,
            fees_paid: U256::ZERO,
        };

        if sqrt_price_limit_x96 != state.sqrt_price_x96 {
            let limit_in_bounds = if zero_for_one {
                sqrt_price_limit_x96 < state.sqrt_price_x96 && sqrt_price_limit_x96 > MIN_SQRT_RATIO
            } else {
                sqrt_price_limit_x96 > state.sqrt_price_x96 && sqrt_price_limit_x96 < MAX_SQRT_RATIO
            };
            if unlikely(!limit_in_bounds) {
                return Err(SwapError::SqrtPriceLimitOutOfBounds.into());
            }
            if unlikely(curve.is_empty()) {
                return Err(SwapError::EmptyTickCurve.into());
            }
            if state.liquidity == 0 && !curve.next_initialized_tick(state.tick, zero_for_one).1 {
                return Err(SwapError::NoReachableTick.into());
            }
        }

        let exact_input = amount_specified.is_positive();
        // every step but the last crosses an initialized tick
        let max_steps = curve.len() + 1;
        let mut steps = 0usize;
        let mut ticks_crossed = 0usize;

        while state.amount_specified_remaining != I256::ZERO
            && state.sqrt_price_x96 != sqrt_price_limit_x96
        {
            if unlikely(steps == max_steps) {
                return Err(CurveError::IterationLimitExceeded(max_steps).into());
            }
            steps += 1;

            let mut step = StepComputations {
                sqrt_price_start_x96: state.sqrt_price_x96,
                ..Default::default()
            };

            (step.tick_next, step.initialized) =
                curve.next_initialized_tick(state.tick, zero_for_one);
            step.tick_next = step.tick_next.clamp(MIN_TICK, MAX_TICK);
            step.sqrt_price_next_x96 = get_sqrt_ratio_at_tick(step.tick_next)?;

            (
                state.sqrt_price_x96,
                step.amount_in,
                step.amount_out,
                step.fee_amount,
            ) = compute_swap_step(
                state.sqrt_price_x96,
                step_target(zero_for_one, step.sqrt_price_next_x96, sqrt_price_limit_x96),
                state.liquidity,
                state.amount_specified_remaining,
                snapshot.fee_pips,
            )?;

            let paid_in = step
                .amount_in
                .checked_add(step.fee_amount)
                .ok_or(MathError::Overflow)?;
            if exact_input {
                state.amount_specified_remaining = state
                    .amount_specified_remaining
                    .checked_sub(to_signed(paid_in)?)
                    .ok_or(MathError::Underflow)?;
                state.amount_calculated = state
                    .amount_calculated
                    .checked_sub(to_signed(step.amount_out)?)
                    .ok_or(MathError::Underflow)?;
            } else {
                state.amount_specified_remaining = state
                    .amount_specified_remaining
                    .checked_add(to_signed(step.amount_out)?)
                    .ok_or(MathError::Overflow)?;
                state.amount_calculated = state
                    .amount_calculated
                    .checked_add(to_signed(paid_in)?)
                    .ok_or(MathError::Overflow)?;
            }

            state.fees_paid = state
                .fees_paid
                .checked_add(step.fee_amount)
                .ok_or(MathError::Overflow)?;
            state.fee_growth_global_x128 = accumulate_fee_growth(
                state.fee_growth_global_x128,
                step.fee_amount,
                state.liquidity,
            )?;

            trace!(
                step = steps,
                tick_next = step.tick_next,
                initialized = step.initialized,
                sqrt_price_start = %step.sqrt_price_start_x96,
                sqrt_price = %state.sqrt_price_x96,
                amount_in = %step.amount_in,
                amount_out = %step.amount_out,
                fee = %step.fee_amount,
                liquidity = state.liquidity,
                "swap step"
            );

            if state.sqrt_price_x96 == step.sqrt_price_next_x96 {
                if step.initialized {
                    state.liquidity = self.cross(step.tick_next, zero_for_one, state.liquidity)?;
                    ticks_crossed += 1;
                }
                state.tick = if zero_for_one {
                    step.tick_next - 1
                } else {
                    step.tick_next
                };
            } else if state.sqrt_price_x96 != step.sqrt_price_start_x96 {
                state.tick = get_tick_at_sqrt_ratio(state.sqrt_price_x96)?;
            }
        }

        let amount_specified_used = amount_specified
            .checked_sub(state.amount_specified_remaining)
            .ok_or(MathError::Overflow)?;
        let (amount0_delta, amount1_delta) = if zero_for_one == exact_input {
            (amount_specified_used, state.amount_calculated)
        } else {
            (state.amount_calculated, amount_specified_used)
        };
        let (amount_in, amount_out) = if zero_for_one {
            (amount0_delta.unsigned_abs(), amount1_delta.unsigned_abs())
        } else {
            (amount1_delta.unsigned_abs(), amount0_delta.unsigned_abs())
        };

        debug!(
            zero_for_one,
            exact_input,
            %amount_in,
            %amount_out,
            fees_paid = %state.fees_paid,
            steps,
            ticks_crossed,
            tick = state.tick,
            "swap quoted"
        );

        Ok(SwapResult {
            amount0_delta,
            amount1_delta,
            amount_in,
            amount_out,
            fees_paid: state.fees_paid,
            fee_growth_global_x128: state.fee_growth_global_x128,
            sqrt_price_x96: state.sqrt_price_x96,
            liquidity: state.liquidity,
            tick: state.tick,
            steps,
            ticks_crossed,
        })
    }

    /// Largest input, fee included, that the pool can absorb in one
    /// direction before its price reaches the protocol's default limit
    /// (`MIN_SQRT_RATIO + 1` or `MAX_SQRT_RATIO - 1`).
    ///
    /// An exact-input swap of at least this amount against the default limit
    /// consumes exactly this amount. Useful as the upper bound of a search
    /// over input sizes.
    pub fn max_input_amount(&self, zero_for_one: bool) -> Result<U256, Error> {
        let snapshot = self.snapshot();
        let curve = self.curve();
        let fee = U256::from(snapshot.fee_pips);
        let fee_complement = U256_E6 - fee;
        let limit = if zero_for_one {
            MIN_SQRT_RATIO + U256::ONE
        } else {
            MAX_SQRT_RATIO - U256::ONE
        };

        let mut sqrt_price_x96 = snapshot.sqrt_price_x96;
        let mut tick = snapshot.tick;
        let mut liquidity = snapshot.liquidity;
        let mut max_amount = U256::ZERO;
        let max_steps = curve.len() + 1;
        let mut steps = 0usize;

        while sqrt_price_x96 != limit {
            if unlikely(steps == max_steps) {
                return Err(CurveError::IterationLimitExceeded(max_steps).into());
            }
            steps += 1;

            let (tick_next, initialized) = curve.next_initialized_tick(tick, zero_for_one);
            if liquidity == 0 && !initialized {
                break;
            }
            let sqrt_price_next_x96 = get_sqrt_ratio_at_tick(tick_next)?;
            let target = step_target(zero_for_one, sqrt_price_next_x96, limit);

            let amount = if zero_for_one {
                get_amount_0_delta(target, sqrt_price_x96, liquidity, true)?
            } else {
                get_amount_1_delta(sqrt_price_x96, target, liquidity, true)?
            };
            // fee charged the way a step that reaches its target charges it
            let fee_amount = mul_div_rounding_up(amount, fee, fee_complement)?;
            max_amount = max_amount
                .checked_add(amount)
                .and_then(|total| total.checked_add(fee_amount))
                .ok_or(MathError::Overflow)?;

            sqrt_price_x96 = target;
            if target == sqrt_price_next_x96 {
                if initialized {
                    liquidity = self.cross(tick_next, zero_for_one, liquidity)?;
                }
                tick = if zero_for_one { tick_next - 1 } else { tick_next };
            }
        }

        Ok(max_amount)
    }
}
