//! Shared building blocks for the spot-price lending model
//!
//! - `math`: 18-decimal fixed point with 256-bit intermediates
//! - `error`: the error taxonomy every pool operation reports through
//! - `asset`: asset, account and payment identifiers
//!
//! The two traits below are the only coupling between the exchange pool and
//! the lending pool: the lender prices collateral through [`PriceOracle`] and
//! both pools pay out through [`Settlement`].

#![forbid(unsafe_code)]

pub mod asset;
pub mod error;
pub mod math;

pub use asset::{AccountId, Asset, Payment, TokenId};
pub use error::{ErrorKind, MathError, PoolError, Result, ValidationError};
pub use math::{Amount, BPS_SCALE, SCALE, U256};

/// Source of the price the lending pool uses to value collateral.
pub trait PriceOracle {
    /// Price of one unit of `base` expressed in `quote` units, scaled by `SCALE`.
    fn price_of(&self, base: Asset, quote: Asset) -> Result<Amount>;
}

/// Outbound transfer rail used by the pools to pay accounts.
///
/// A pool applies its internal accounting first and only then calls
/// `pay_out`; an `Err` obliges the pool to restore its accounting before
/// returning the error.
pub trait Settlement {
    fn pay_out(&mut self, to: &AccountId, asset: Asset, amount: Amount) -> Result<()>;
}
