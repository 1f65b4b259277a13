//! Error taxonomy shared by the exchange pool and the lending pool

use crate::asset::{AccountId, Asset, Payment};
use crate::math::Amount;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, PoolError>;

/// Integer arithmetic failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// Divisor was zero (e.g. an empty reserve)
    #[error("division by zero")]
    DivisionByZero,
    /// Result does not fit in an amount
    #[error("integer overflow")]
    Overflow,
    /// Subtraction below zero
    #[error("integer underflow")]
    Underflow,
}

/// Rejected inputs, detected before any state is touched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("payment {actual} does not match required {expected}")]
    PaymentMismatch { expected: Payment, actual: Payment },

    #[error("collateral ratio {0} bps exceeds 10000")]
    CollateralRatioOutOfRange(u16),

    #[error("token {actual} does not match pool token {expected}")]
    TokenMismatch { expected: String, actual: String },

    #[error("{account} holds {available} {asset}, needs {required}")]
    InsufficientBalance {
        account: AccountId,
        asset: Asset,
        required: Amount,
        available: Amount,
    },

    #[error("unknown account {0}")]
    UnknownAccount(AccountId),
}

/// Failures surfaced by pool operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] MathError),

    #[error("insufficient collateral: requested {requested}, max borrowable {max_borrowable}")]
    InsufficientCollateral {
        requested: Amount,
        max_borrowable: Amount,
    },

    #[error("insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: Amount, available: Amount },

    #[error("transfer of {amount} {asset} to {to} failed")]
    TransferFailure {
        to: AccountId,
        asset: Asset,
        amount: Amount,
    },
}

/// Coarse error category, for drivers deciding whether to abort or reissue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Arithmetic,
    InsufficientCollateral,
    InsufficientLiquidity,
    TransferFailure,
}

impl PoolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PoolError::Validation(_) => ErrorKind::Validation,
            PoolError::Arithmetic(_) => ErrorKind::Arithmetic,
            PoolError::InsufficientCollateral { .. } => ErrorKind::InsufficientCollateral,
            PoolError::InsufficientLiquidity { .. } => ErrorKind::InsufficientLiquidity,
            PoolError::TransferFailure { .. } => ErrorKind::TransferFailure,
        }
    }
}

/// Decimal amount parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,
    #[error("invalid digit in amount {0:?}")]
    InvalidDigit(String),
    #[error("{0} fractional digits, at most 18 allowed")]
    TooManyDecimals(usize),
    #[error("amount out of range")]
    OutOfRange,
}
