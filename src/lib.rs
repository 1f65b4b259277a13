//! Spot-price lending market
//!
//! ⚠️ EDUCATIONAL USE ONLY ⚠️
//!
//! Couples a zero-fee constant product pool with a lending pool that values
//! collateral at the pool's instantaneous reserve ratio. The lending pool
//! trusts whatever price the reserves show at the moment of the borrow, so a
//! large swap earlier in the same atomic sequence inflates the collateral
//! value. This crate reproduces that behavior exactly, including its rounding.
//!
//! - `wallets`: account balances and the payout rail both pools settle through
//! - `market`: the world state (one reserve pool, one lending pool, wallets)
//!   and all-or-nothing execution of operation sequences
//! - `sequencer`: serialized submission of sequences from many callers

#![forbid(unsafe_code)]

pub mod market;
pub mod sequencer;
pub mod wallets;

pub use amm_model::{ReservePool, SwapQuote};
pub use lending_model::{LendingPool, Position};
pub use market::{Market, MarketConfig, Op, Outcome, SequenceError};
pub use sequencer::Sequencer;
pub use spotlend_common::math::{decimal, format_amount, parse_amount, units};
pub use spotlend_common::{
    AccountId, Amount, Asset, ErrorKind, MathError, Payment, PoolError, PriceOracle, Result,
    Settlement, TokenId, ValidationError, BPS_SCALE, SCALE, U256,
};
pub use wallets::{Balances, Wallets};
