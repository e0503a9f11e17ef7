//! Fixed-point primitives shared by the swap engine.
//!
//! Everything here mirrors the Uniswap V3 Solidity libraries (`TickMath`,
//! `SqrtPriceMath`, `SwapMath`, `FullMath`, `LiquidityMath`) bit for bit, on
//! `U256` values with 512-bit intermediates where the Solidity code uses them.

pub mod bit_math;
pub mod liquidity_math;
pub mod math_helpers;
pub mod sqrt_price_math;
pub mod swap_math;
pub mod tick_math;
