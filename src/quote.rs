//! Direction-specific quoting on top of [`Pool::swap`].

use crate::error::{Error, SwapError};
use crate::math::math_helpers::mul_div;
use crate::math::tick_math::{MAX_SQRT_RATIO, MIN_SQRT_RATIO};
use crate::pool::snapshot::Pool;
use crate::pool::swap::{SwapParams, SwapResult};
use crate::{U256_1, U256_E4};
use alloy_primitives::{Address, I256, U160, U256};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// token0 in, token1 out; the price falls.
    ZeroForOne,
    /// token1 in, token0 out; the price rises.
    OneForZero,
}

impl Direction {
    #[inline]
    pub fn zero_for_one(self) -> bool {
        matches!(self, Direction::ZeroForOne)
    }

    /// Direction of a trade between two pool tokens, given in any order.
    pub fn for_pair(token_in: Address, token_out: Address) -> Result<Self, SwapError> {
        if token_in == token_out {
            return Err(SwapError::IdenticalTokens);
        }
        let (token0, _) = sort_tokens(token_in, token_out);
        Ok(if token0 == token_in {
            Direction::ZeroForOne
        } else {
            Direction::OneForZero
        })
    }

    /// The loosest limit the protocol accepts: one unit inside the price bounds.
    #[inline]
    pub fn default_sqrt_price_limit(self) -> U256 {
        match self {
            Direction::ZeroForOne => MIN_SQRT_RATIO + U256_1,
            Direction::OneForZero => MAX_SQRT_RATIO - U256_1,
        }
    }
}

#[inline(always)]
fn address_to_u160(address: Address) -> U160 {
    address.into()
}

/// Returns the token pair sorted by numeric address, as used by Uniswap V3.
pub fn sort_tokens(token_a: Address, token_b: Address) -> (Address, Address) {
    if address_to_u160(token_a) < address_to_u160(token_b) {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

/// Price limit `bps` basis points away from `sqrt_price_x96`, against the
/// direction of the trade.
///
/// The bound is applied to the sqrt price, as [`SwapParams`] takes it, and is
/// clamped to the range the swap engine accepts.
pub fn sqrt_price_limit_from_slippage_bps(
    sqrt_price_x96: U256,
    direction: Direction,
    bps: u32,
) -> U256 {
    let bps = U256::from(bps);
    match direction {
        Direction::ZeroForOne => {
            let factor = U256_E4.saturating_sub(bps);
            mul_div(sqrt_price_x96, factor, U256_E4)
                .unwrap_or(U256::ZERO)
                .max(MIN_SQRT_RATIO + U256_1)
        }
        Direction::OneForZero => mul_div(sqrt_price_x96, U256_E4 + bps, U256_E4)
            .unwrap_or(U256::MAX)
            .min(MAX_SQRT_RATIO - U256_1),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub direction: Direction,
    /// Positive for exact input, negative for exact output.
    pub amount_specified: I256,
    pub sqrt_price_limit_x96: U256,
}

impl QuoteRequest {
    pub fn exact_input(
        direction: Direction,
        amount_in: U256,
        sqrt_price_limit_x96: Option<U256>,
    ) -> Result<Self, Error> {
        Ok(Self {
            direction,
            amount_specified: signed_amount(amount_in)?,
            sqrt_price_limit_x96: sqrt_price_limit_x96
                .unwrap_or_else(|| direction.default_sqrt_price_limit()),
        })
    }

    pub fn exact_output(
        direction: Direction,
        amount_out: U256,
        sqrt_price_limit_x96: Option<U256>,
    ) -> Result<Self, Error> {
        Ok(Self {
            direction,
            amount_specified: -signed_amount(amount_out)?,
            sqrt_price_limit_x96: sqrt_price_limit_x96
                .unwrap_or_else(|| direction.default_sqrt_price_limit()),
        })
    }
}

fn signed_amount(amount: U256) -> Result<I256, Error> {
    if amount > I256::MAX.into_raw() {
        return Err(SwapError::AmountTooLarge.into());
    }
    Ok(I256::from_raw(amount))
}

/// What a trader gives and gets, and where the pool ends up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub amount_in: U256,
    pub amount_out: U256,
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub tick: i32,
}

impl From<SwapResult> for Quote {
    fn from(result: SwapResult) -> Self {
        Self {
            amount_in: result.amount_in,
            amount_out: result.amount_out,
            sqrt_price_x96: result.sqrt_price_x96,
            liquidity: result.liquidity,
            tick: result.tick,
        }
    }
}

pub fn quote(pool: &Pool, request: QuoteRequest) -> Result<Quote, Error> {
    pool.swap(SwapParams::new(
        request.direction.zero_for_one(),
        request.amount_specified,
        request.sqrt_price_limit_x96,
    ))
    .map(Quote::from)
}

/// Output for spending exactly `amount_in`, or less if the limit is hit first.
pub fn quote_exact_input(
    pool: &Pool,
    direction: Direction,
    amount_in: U256,
    sqrt_price_limit_x96: Option<U256>,
) -> Result<Quote, Error> {
    quote(
        pool,
        QuoteRequest::exact_input(direction, amount_in, sqrt_price_limit_x96)?,
    )
}

/// Input needed to receive exactly `amount_out`, or less if the limit is hit
/// first.
pub fn quote_exact_output(
    pool: &Pool,
    direction: Direction,
    amount_out: U256,
    sqrt_price_limit_x96: Option<U256>,
) -> Result<Quote, Error> {
    quote(
        pool,
        QuoteRequest::exact_output(direction, amount_out, sqrt_price_limit_x96)?,
    )
}

pub fn quote_exact_input_zero_for_one(
    pool: &Pool,
    amount_in: U256,
    sqrt_price_limit_x96: Option<U256>,
) -> Result<Quote, Error> {
    quote_exact_input(pool, Direction::ZeroForOne, amount_in, sqrt_price_limit_x96)
}

pub fn quote_exact_input_one_for_zero(
    pool: &Pool,
    amount_in: U256,
    sqrt_price_limit_x96: Option<U256>,
) -> Result<Quote, Error> {
    quote_exact_input(pool, Direction::OneForZero, amount_in, sqrt_price_limit_x96)
}

pub fn quote_exact_output_zero_for_one(
    pool: &Pool,
    amount_out: U256,
    sqrt_price_limit_x96: Option<U256>,
) -> Result<Quote, Error> {
    quote_exact_output(pool, Direction::ZeroForOne, amount_out, sqrt_price_limit_x96)
}

pub fn quote_exact_output_one_for_zero(
    pool: &Pool,
    amount_out: U256,
    sqrt_price_limit_x96: Option<U256>,
) -> Result<Quote, Error> {
    quote_exact_output(pool, Direction::OneForZero, amount_out, sqrt_price_limit_x96)
}
