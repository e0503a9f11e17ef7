//! Off-chain swap quotes for Uniswap V3-style concentrated liquidity pools.
//!
//! A quote replays the pool's own step-wise swap against a snapshot of its
//! state, so one snapshot fetch replaces one RPC round trip per crossed tick.
//!
//! This crate exposes:
//! - Fixed-point primitives (`math::*`) for ticks, prices and swap steps.
//! - `PoolSnapshot` / `TickCurve` / `Pool`, the immutable inputs of a quote.
//! - The swap engine (`Pool::swap`) and the `quote` façade on top of it.
//! - `Pool::liquidity_ranges` / `liquidity_depth`, the tokens locked per range.
//! - `PoolTracker`, which keeps a snapshot current from Mint/Burn/Swap events.
//! - The `provider` seam for fetching snapshots (JSON-RPC behind `onchain`).
//!
//! # Examples
//!
//! ## Pure math
//! ```
//! use clmm_quoter::{math::tick_math, RESOLUTION, U256};
//!
//! let sqrt_price = tick_math::get_sqrt_ratio_at_tick(0).unwrap();
//! assert_eq!(sqrt_price, U256::from(1u8) << RESOLUTION);
//! ```
//!
//! ## Quoting against a snapshot
//! ```
//! use clmm_quoter::{
//!     math::tick_math::get_sqrt_ratio_at_tick,
//!     quote::{self, Direction},
//!     Pool, PoolSnapshot, TickCurve, TickInfo, U256,
//! };
//!
//! let liquidity = 1_000_000_000_000_000_000u128;
//! let snapshot = PoolSnapshot::new(get_sqrt_ratio_at_tick(0)?, 0, liquidity, 3000, 60)?;
//! let curve = TickCurve::new(
//!     60,
//!     vec![
//!         TickInfo::new(-600, liquidity as i128, liquidity),
//!         TickInfo::new(600, -(liquidity as i128), liquidity),
//!     ],
//! )?;
//! let pool = Pool::new(snapshot, curve)?;
//!
//! let quote = quote::quote_exact_input(
//!     &pool,
//!     Direction::ZeroForOne,
//!     U256::from(1_000_000_000_000u64),
//!     None,
//! )?;
//! assert_eq!(quote.amount_in, U256::from(1_000_000_000_000u64));
//! assert!(quote.amount_out < quote.amount_in);
//! # Ok::<(), clmm_quoter::error::Error>(())
//! ```

pub use alloy_primitives::{Address, I256, U256};

pub mod error;
mod hash;
pub mod math;
pub mod pool;
pub mod provider;
pub mod quote;

pub use hash::FastMap;

pub use pool::depth::{LiquidityDepth, LiquidityRange};
pub use pool::events::{PoolEvent, PoolTracker};
pub use pool::snapshot::{Pool, PoolSnapshot, Slot0};
pub use pool::swap::{SwapParams, SwapResult};
pub use pool::tick_curve::{TickCurve, TickInfo};

const U256_1: U256 = U256::from_limbs([1, 0, 0, 0]);
const U256_128: U256 = U256::from_limbs([128, 0, 0, 0]);

const U160_MAX: U256 = U256::from_limbs([u64::MAX, u64::MAX, 4294967295, 0]);
const U256_E4: U256 = U256::from_limbs([10000, 0, 0, 0]);
const U256_E6: U256 = U256::from_limbs([1000000, 0, 0, 0]);

pub const RESOLUTION: usize = 96;
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);
pub const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);
