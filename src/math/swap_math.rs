use crate::U256_E6;
use crate::error::{Error, MathError};
use crate::math::math_helpers::{mul_div, mul_div_rounding_up};
use crate::math::sqrt_price_math::{
    get_amount_0_delta, get_amount_1_delta, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use alloy_primitives::{I256, U256};

/// One swap step within a single liquidity range.
///
/// Moves the price from `sqrt_ratio_current_x96` toward
/// `sqrt_ratio_target_x96`, stopping early if `amount_remaining` runs out.
/// A non-negative `amount_remaining` is an exact-input budget (fee
/// included), a negative one an exact-output request. The direction is
/// implied by the two prices: a target at or below the current price swaps
/// token0 for token1.
///
/// Returns `(sqrt_ratio_next_x96, amount_in, amount_out, fee_amount)`, with
/// `amount_in` net of the fee. The next price always lies in the closed
/// interval between current and target.
pub fn compute_swap_step(
    sqrt_ratio_current_x96: U256,
    sqrt_ratio_target_x96: U256,
    liquidity: u128,
    amount_remaining: I256,
    fee_pips: u32,
) -> Result<(U256, U256, U256, U256), Error> {
    let zero_for_one = sqrt_ratio_current_x96 >= sqrt_ratio_target_x96;
    let exact_in = !amount_remaining.is_negative();
    let remaining_abs = amount_remaining.unsigned_abs();

    let fee = U256::from(fee_pips);
    let fee_complement = U256_E6.checked_sub(fee).ok_or(MathError::Underflow)?;

    let mut amount_in = U256::ZERO;
    let mut amount_out = U256::ZERO;

    let sqrt_ratio_next_x96 = if exact_in {
        let remaining_less_fee = mul_div(remaining_abs, fee_complement, U256_E6)?;
        amount_in = if zero_for_one {
            get_amount_0_delta(sqrt_ratio_target_x96, sqrt_ratio_current_x96, liquidity, true)?
        } else {
            get_amount_1_delta(sqrt_ratio_current_x96, sqrt_ratio_target_x96, liquidity, true)?
        };
        if remaining_less_fee >= amount_in {
            sqrt_ratio_target_x96
        } else {
            get_next_sqrt_price_from_input(
                sqrt_ratio_current_x96,
                liquidity,
                remaining_less_fee,
                zero_for_one,
            )?
        }
    } else {
        amount_out = if zero_for_one {
            get_amount_1_delta(sqrt_ratio_target_x96, sqrt_ratio_current_x96, liquidity, false)?
        } else {
            get_amount_0_delta(sqrt_ratio_current_x96, sqrt_ratio_target_x96, liquidity, false)?
        };
        if remaining_abs >= amount_out {
            sqrt_ratio_target_x96
        } else {
            get_next_sqrt_price_from_output(
                sqrt_ratio_current_x96,
                liquidity,
                remaining_abs,
                zero_for_one,
            )?
        }
    };

    let reached_target = sqrt_ratio_target_x96 == sqrt_ratio_next_x96;

    // amounts computed against the target are reused only when the step
    // actually ended there
    if zero_for_one {
        if !(reached_target && exact_in) {
            amount_in =
                get_amount_0_delta(sqrt_ratio_next_x96, sqrt_ratio_current_x96, liquidity, true)?;
        }
        if !(reached_target && !exact_in) {
            amount_out =
                get_amount_1_delta(sqrt_ratio_next_x96, sqrt_ratio_current_x96, liquidity, false)?;
        }
    } else {
        if !(reached_target && exact_in) {
            amount_in =
                get_amount_1_delta(sqrt_ratio_current_x96, sqrt_ratio_next_x96, liquidity, true)?;
        }
        if !(reached_target && !exact_in) {
            amount_out =
                get_amount_0_delta(sqrt_ratio_current_x96, sqrt_ratio_next_x96, liquidity, false)?;
        }
    }

    if !exact_in && amount_out > remaining_abs {
        amount_out = remaining_abs;
    }

    let fee_amount = if exact_in && !reached_target {
        // whatever is left of the budget is the fee
        remaining_abs
            .checked_sub(amount_in)
            .ok_or(MathError::Underflow)?
    } else {
        mul_div_rounding_up(amount_in, fee, fee_complement)?
    };

    Ok((sqrt_ratio_next_x96, amount_in, amount_out, fee_amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Q96;
    use std::str::FromStr;

    fn u(s: &str) -> U256 {
        U256::from_str(s).unwrap()
    }

    fn i(s: &str) -> I256 {
        I256::from_str(s).unwrap()
    }

    // sqrt(1.01) * 2^96
    fn price_1_01() -> U256 {
        u("79623317895830914510639640423")
    }

    // sqrt(10) * 2^96
    fn price_10() -> U256 {
        u("250541448375047931186413801569")
    }

    const TWO_E18: u128 = 2_000_000_000_000_000_000;

    #[test]
    fn exact_in_capped_at_target() {
        let amount = i("1000000000000000000");
        let (next, amount_in, amount_out, fee) =
            compute_swap_step(Q96, price_1_01(), TWO_E18, amount, 600).unwrap();

        assert_eq!(next, price_1_01());
        assert_eq!(amount_in, u("9975124224178055"));
        assert_eq!(amount_out, u("9925619580021728"));
        assert_eq!(fee, u("5988667735148"));
        assert!(amount_in + fee < amount.into_raw());
    }

    #[test]
    fn exact_in_fully_spent_before_target() {
        let amount = i("1000000000000000000");
        let (next, amount_in, amount_out, fee) =
            compute_swap_step(Q96, price_10(), TWO_E18, amount, 600).unwrap();

        assert_eq!(next, u("118818475322642227089037862318"));
        assert!(next < price_10());
        assert_eq!(amount_in, u("999400000000000000"));
        assert_eq!(amount_out, u("666399946655997866"));
        assert_eq!(fee, u("600000000000000"));
        assert_eq!(amount_in + fee, amount.into_raw());
    }

    #[test]
    fn exact_out_capped_at_target() {
        let amount = i("-1000000000000000000");
        let (next, amount_in, amount_out, fee) =
            compute_swap_step(Q96, price_1_01(), TWO_E18, amount, 600).unwrap();

        assert_eq!(next, price_1_01());
        assert_eq!(amount_in, u("9975124224178055"));
        assert_eq!(amount_out, u("9925619580021728"));
        assert_eq!(fee, u("5988667735148"));
        assert!(amount_out < amount.unsigned_abs());
    }

    #[test]
    fn exact_out_never_exceeds_request() {
        let request = U256::from(1_000_000u64);
        let amount = -I256::from_raw(request);
        let (next, _, amount_out, _) =
            compute_swap_step(Q96, price_10(), TWO_E18, amount, 3000).unwrap();

        assert!(next > Q96 && next < price_10());
        assert_eq!(amount_out, request);
    }

    #[test]
    fn zero_liquidity_jumps_to_target_for_free() {
        for amount in [i("1000"), i("-1000")] {
            let (next, amount_in, amount_out, fee) =
                compute_swap_step(price_10(), Q96, 0, amount, 3000).unwrap();
            assert_eq!(next, Q96);
            assert_eq!(amount_in, U256::ZERO);
            assert_eq!(amount_out, U256::ZERO);
            assert_eq!(fee, U256::ZERO);
        }
    }

    #[test]
    fn one_wei_input_is_eaten_by_fee() {
        // too small to move the price: everything goes to the fee
        let (next, amount_in, amount_out, fee) =
            compute_swap_step(Q96, Q96 - U256::from(1_000_000u64), TWO_E18, i("1"), 3000)
                .unwrap();
        assert_eq!(next, Q96);
        assert_eq!(amount_in, U256::ZERO);
        assert_eq!(amount_out, U256::ZERO);
        assert_eq!(fee, U256::ONE);
    }

    #[test]
    fn price_stays_between_current_and_target() {
        let cases = [
            (Q96, price_10(), i("123456789")),
            (Q96, price_10(), i("-123456789")),
            (price_10(), Q96, i("987654321987654321")),
            (price_10(), Q96, i("-987654321")),
        ];
        for (current, target, amount) in cases {
            let (next, ..) = compute_swap_step(current, target, TWO_E18, amount, 500).unwrap();
            let (lo, hi) = if current < target {
                (current, target)
            } else {
                (target, current)
            };
            assert!(next >= lo && next <= hi);
        }
    }
}
