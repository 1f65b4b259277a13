//! AMM Model - zero-fee constant product pool (x·y=k)
//!
//! `math` holds the pure quoting formulas; `pool` wraps them in the stateful
//! `ReservePool` that owns the two reserve balances and serves as the spot
//! price oracle for the lending pool.

#![forbid(unsafe_code)]

pub mod math;
pub mod pool;

pub use math::{quote_swap, spot_price, SwapQuote};
pub use pool::ReservePool;
