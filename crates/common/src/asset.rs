//! Asset, account and payment identifiers

use crate::error::ValidationError;
use crate::math::{format_amount, Amount};
use core::fmt;
use serde::{Deserialize, Serialize};

/// One of the two assets a pool can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    /// Settlement asset (ETH-like)
    Native,
    /// The fungible token paired against it
    Token,
}

impl Asset {
    /// The other side of the pair
    pub fn counterpart(self) -> Asset {
        match self {
            Asset::Native => Asset::Token,
            Asset::Token => Asset::Native,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => f.write_str("native"),
            Asset::Token => f.write_str("token"),
        }
    }
}

/// Symbol of the fungible token a pool is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn symbol(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque account identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl From<&str> for AccountId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for AccountId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value a caller transfers alongside an instruction
///
/// Operations that take a payment declare the asset and amount they expect;
/// the payment has to match exactly before any state is mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub asset: Asset,
    #[serde(with = "crate::math::decimal")]
    pub amount: Amount,
}

impl Payment {
    pub fn new(asset: Asset, amount: Amount) -> Self {
        Self { asset, amount }
    }

    pub fn native(amount: Amount) -> Self {
        Self::new(Asset::Native, amount)
    }

    pub fn token(amount: Amount) -> Self {
        Self::new(Asset::Token, amount)
    }

    /// Accept this payment only for a nonzero `expected` that it matches
    /// exactly.
    pub fn ensure_matches(self, expected: Payment) -> Result<(), ValidationError> {
        if expected.amount == 0 {
            return Err(ValidationError::ZeroAmount);
        }
        if self != expected {
            return Err(ValidationError::PaymentMismatch {
                expected,
                actual: self,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_amount(self.amount), self.asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::units;

    #[test]
    fn test_counterpart() {
        assert_eq!(Asset::Native.counterpart(), Asset::Token);
        assert_eq!(Asset::Token.counterpart(), Asset::Native);
    }

    #[test]
    fn test_ensure_matches() {
        let expected = Payment::native(units(2));
        assert_eq!(Payment::native(units(2)).ensure_matches(expected), Ok(()));
        assert_eq!(
            Payment::token(units(2)).ensure_matches(expected),
            Err(ValidationError::PaymentMismatch {
                expected,
                actual: Payment::token(units(2)),
            })
        );
        // Zero wins over mismatch
        assert_eq!(
            Payment::token(units(1)).ensure_matches(Payment::native(0)),
            Err(ValidationError::ZeroAmount)
        );
    }

    #[test]
    fn test_payment_display() {
        assert_eq!(Payment::native(units(2)).to_string(), "2.0 native");
        assert_eq!(Payment::token(units(1) / 2).to_string(), "0.5 token");
    }
}
