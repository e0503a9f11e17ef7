use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - underflow")]
    Underflow,
    #[error("Math error - division by zero")]
    DivisionByZero,
    #[error("BitMath error - zero input value")]
    ZeroValue,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("State error - sqrtPrice out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("State error - sqrtPrice is 0")]
    SqrtPriceIsZero,
    #[error("State error - sqrtRatio is 0")]
    SqrtRatioIsZero,

    #[error("State error - tick out of bounds")]
    TickOutOfBounds,

    #[error("State error - liquidity is 0")]
    LiquidityIsZero,

    #[error("State error - requested amount exceeds pool reserves")]
    InsufficientReserves,

    #[error("State error - fee of {0} pips is not below 1_000_000")]
    InvalidFee(u32),
    #[error("State error - tick spacing {0} must be positive")]
    InvalidTickSpacing(i32),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SwapError {
    #[error("Swap error - amount specified is 0")]
    AmountSpecifiedIsZero,
    #[error("Swap error - sqrtPriceLimit is on the wrong side of the price or out of bounds")]
    SqrtPriceLimitOutOfBounds,
    #[error("Swap error - amount does not fit in a signed 256-bit integer")]
    AmountTooLarge,
    #[error("Swap error - token in and token out are the same address")]
    IdenticalTokens,
    #[error("Swap error - tick curve is empty")]
    EmptyTickCurve,
    #[error("Swap error - no liquidity in range and no initialized tick in the swap direction")]
    NoReachableTick,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CurveError {
    #[error("Curve error - tick {tick} is not a multiple of tick spacing {tick_spacing}")]
    MisalignedTick { tick: i32, tick_spacing: i32 },
    #[error("Curve error - tick {0} appears more than once")]
    DuplicateTick(i32),
    #[error("Curve error - tick {0} is outside [MIN_TICK, MAX_TICK]")]
    TickOutOfBounds(i32),
    #[error("Curve error - curve spacing {curve} does not match pool spacing {pool}")]
    TickSpacingMismatch { curve: i32, pool: i32 },
    #[error("Curve error - crossing tick {0} drives liquidity below zero")]
    LiquidityNetUnderflow(i32),
    #[error("Curve error - crossing tick {0} overflows liquidity")]
    LiquidityNetOverflow(i32),
    #[error("Curve error - swap did not terminate within {0} steps")]
    IterationLimitExceeded(usize),
    #[error("Curve error - burn at tick {0} exceeds its gross liquidity")]
    GrossLiquidityUnderflow(i32),
    #[error("Curve error - burn exceeds the liquidity in range")]
    InRangeLiquidityUnderflow,
    #[error("Curve error - position range [{lower}, {upper}) is empty")]
    InvalidTickRange { lower: i32, upper: i32 },
}

/// Failure of the in-memory provider.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider error - no snapshot for pool {0}")]
    UnknownPool(alloy_primitives::Address),
}

#[cfg(feature = "onchain")]
#[derive(Debug, Error)]
pub enum OnchainError {
    #[error("Onchain error - failed to connect: {0}")]
    FailedToConnect(String),
    #[error("Onchain error - failed to get slot0: {0}")]
    FailedToGetSlot0(String),
    #[error("Onchain error - failed to get liquidity: {0}")]
    FailedToGetLiquidity(String),
    #[error("Onchain error - failed to get fee: {0}")]
    FailedToGetFee(String),
    #[error("Onchain error - failed to get tick spacing: {0}")]
    FailedToGetTickSpacing(String),
    #[error("Onchain error - failed to get fee growth: {0}")]
    FailedToGetFeeGrowth(String),
    #[error("Onchain error - failed to get ticks from lens: {0}")]
    FailedToGetTicks(String),
    #[error("Onchain error - failed to get logs: {0}")]
    FailedToGetLogs(String),
    #[error("Onchain error - quoter call failed: {0}")]
    FailedToQuote(String),
    #[error("Onchain error - failed to decode log: {0}")]
    FailedToDecodeLog(String),
    #[error("Onchain error - fetched state is unusable: {0}")]
    InvalidState(#[from] Error),
}

/// Coarse classification of [`Error`], for callers that only need to know
/// whether the request, the data or the arithmetic was at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request itself is malformed (zero amount, bad price limit, ...).
    InvalidInput,
    /// A tick or price argument lies outside the protocol bounds.
    OutOfRange,
    /// There is nothing to trade against.
    InsufficientLiquidity,
    /// The snapshot or tick curve violates an invariant.
    Corruption,
    /// An intermediate value does not fit the fixed-point domain.
    Arithmetic,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    MathError(#[from] crate::error::MathError),

    #[error(transparent)]
    StateError(#[from] crate::error::StateError),

    #[error(transparent)]
    SwapError(#[from] crate::error::SwapError),

    #[error(transparent)]
    CurveError(#[from] crate::error::CurveError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MathError(_) => ErrorKind::Arithmetic,
            Error::StateError(err) => match err {
                StateError::SqrtPriceOutOfBounds
                | StateError::SqrtPriceIsZero
                | StateError::SqrtRatioIsZero
                | StateError::TickOutOfBounds => ErrorKind::OutOfRange,
                StateError::LiquidityIsZero | StateError::InsufficientReserves => {
                    ErrorKind::InsufficientLiquidity
                }
                StateError::InvalidFee(_) | StateError::InvalidTickSpacing(_) => {
                    ErrorKind::InvalidInput
                }
            },
            Error::SwapError(err) => match err {
                SwapError::EmptyTickCurve | SwapError::NoReachableTick => {
                    ErrorKind::InsufficientLiquidity
                }
                SwapError::AmountSpecifiedIsZero
                | SwapError::SqrtPriceLimitOutOfBounds
                | SwapError::AmountTooLarge
                | SwapError::IdenticalTokens => ErrorKind::InvalidInput,
            },
            Error::CurveError(err) => match err {
                CurveError::TickOutOfBounds(_) => ErrorKind::OutOfRange,
                CurveError::MisalignedTick { .. } | CurveError::InvalidTickRange { .. } => {
                    ErrorKind::InvalidInput
                }
                _ => ErrorKind::Corruption,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_failure_source() {
        assert_eq!(
            Error::from(SwapError::AmountSpecifiedIsZero).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            Error::from(StateError::TickOutOfBounds).kind(),
            ErrorKind::OutOfRange
        );
        assert_eq!(
            Error::from(SwapError::EmptyTickCurve).kind(),
            ErrorKind::InsufficientLiquidity
        );
        assert_eq!(
            Error::from(CurveError::LiquidityNetUnderflow(60)).kind(),
            ErrorKind::Corruption
        );
        assert_eq!(
            Error::from(CurveError::TickOutOfBounds(900_000)).kind(),
            ErrorKind::OutOfRange
        );
        assert_eq!(
            Error::from(CurveError::InvalidTickRange {
                lower: 60,
                upper: -60
            })
            .kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            Error::from(MathError::Overflow).kind(),
            ErrorKind::Arithmetic
        );
    }

    #[test]
    fn transparent_messages() {
        let err = Error::from(CurveError::MisalignedTick {
            tick: 15,
            tick_spacing: 10,
        });
        assert_eq!(
            err.to_string(),
            "Curve error - tick 15 is not a multiple of tick spacing 10"
        );
    }
}
