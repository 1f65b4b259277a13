//! Lending Model - collateralized native-asset lending priced by a spot oracle
//!
//! Accounts deposit token collateral and borrow the native asset against it.
//! The borrow limit is recomputed from the oracle on every call; nothing
//! about the price at deposit time is remembered.

#![forbid(unsafe_code)]

pub mod pool;

pub use pool::{LendingPool, Position};
