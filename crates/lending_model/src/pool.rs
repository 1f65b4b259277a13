//! Lending pool state and operations
//!
//! # Properties
//! - Deposits and borrows per account never decrease
//! - A successful borrow leaves borrows[a] <= deposits[a] · price · ratio,
//!   evaluated with the oracle price at the moment of the call
//! - `native_reserve` decreases only through a successful borrow

use log::{debug, warn};
use spotlend_common::math::{bps_mul, checked_add, checked_sub, mul_div_floor};
use spotlend_common::{
    AccountId, Amount, Asset, Payment, PoolError, PriceOracle, Result, Settlement, TokenId,
    ValidationError, BPS_SCALE, SCALE,
};
use std::collections::BTreeMap;

/// Per-account collateral and debt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Token collateral deposited
    pub deposited: Amount,
    /// Native asset borrowed
    pub borrowed: Amount,
}

/// Collateralized lending pool
///
/// The pool holds no price source of its own. Its owner binds it to exactly
/// one oracle for its whole life and passes that same oracle to every
/// `max_borrow_amount` and `borrow_eth` call; `spotlend::Market` does so with
/// its reserve pool and exposes no way to supply another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LendingPool {
    /// Token accepted as collateral
    token: TokenId,

    /// Fraction of collateral value that may be borrowed (10_000 = 100%)
    collateral_ratio_bps: u16,

    /// Native asset available to lend
    native_reserve: Amount,

    /// Sum of all deposits (tokens held by the pool)
    total_collateral: Amount,

    deposits: BTreeMap<AccountId, Amount>,
    borrows: BTreeMap<AccountId, Amount>,
}

impl LendingPool {
    /// Create an unfunded pool
    ///
    /// # Errors
    /// `CollateralRatioOutOfRange` if `collateral_ratio_bps > 10_000`
    pub fn new(token: TokenId, collateral_ratio_bps: u16) -> Result<Self> {
        if collateral_ratio_bps as Amount > BPS_SCALE {
            return Err(ValidationError::CollateralRatioOutOfRange(collateral_ratio_bps).into());
        }

        Ok(Self {
            token,
            collateral_ratio_bps,
            native_reserve: 0,
            total_collateral: 0,
            deposits: BTreeMap::new(),
            borrows: BTreeMap::new(),
        })
    }

    pub fn token(&self) -> &TokenId {
        &self.token
    }

    pub fn collateral_ratio_bps(&self) -> u16 {
        self.collateral_ratio_bps
    }

    pub fn native_reserve(&self) -> Amount {
        self.native_reserve
    }

    pub fn total_collateral(&self) -> Amount {
        self.total_collateral
    }

    pub fn deposits_of(&self, account: &AccountId) -> Amount {
        self.deposits.get(account).copied().unwrap_or(0)
    }

    pub fn borrows_of(&self, account: &AccountId) -> Amount {
        self.borrows.get(account).copied().unwrap_or(0)
    }

    pub fn position(&self, account: &AccountId) -> Position {
        Position {
            deposited: self.deposits_of(account),
            borrowed: self.borrows_of(account),
        }
    }

    /// Accounts with a deposit or a borrow, in account order
    pub fn positions(&self) -> impl Iterator<Item = (&AccountId, Position)> + '_ {
        let mut accounts: Vec<&AccountId> = self.deposits.keys().chain(self.borrows.keys()).collect();
        accounts.sort();
        accounts.dedup();
        accounts.into_iter().map(move |account| (account, self.position(account)))
    }

    /// Credit native liquidity sent to the pool from outside
    pub fn fund(&mut self, amount: Amount) -> Result<()> {
        if amount == 0 {
            return Err(ValidationError::ZeroAmount.into());
        }
        self.native_reserve = checked_add(self.native_reserve, amount)?;
        debug!("lender funded with {} -> reserve={}", amount, self.native_reserve);
        Ok(())
    }

    /// Record `amount` of token collateral for `account`
    ///
    /// `payment` is the token transfer that accompanies the call and must
    /// equal (`Token`, `amount`).
    pub fn deposit_collateral(
        &mut self,
        account: &AccountId,
        amount: Amount,
        payment: Payment,
    ) -> Result<()> {
        payment.ensure_matches(Payment::token(amount))?;

        let deposited = checked_add(self.deposits_of(account), amount)?;
        let total = checked_add(self.total_collateral, amount)?;
        self.deposits.insert(account.clone(), deposited);
        self.total_collateral = total;

        debug!("collateral deposit by {}: {} -> {}", account, amount, deposited);
        Ok(())
    }

    /// Remaining native amount `account` may borrow at the oracle's current price
    ///
    /// floor(floor(deposit · price / SCALE) · ratio / 10_000) - borrowed,
    /// floored at zero.
    pub fn max_borrow_amount<O>(&self, account: &AccountId, oracle: &O) -> Result<Amount>
    where
        O: PriceOracle + ?Sized,
    {
        let price = oracle.price_of(Asset::Token, Asset::Native)?;
        let collateral_value = mul_div_floor(self.deposits_of(account), price, SCALE)?;
        let limit = bps_mul(collateral_value, self.collateral_ratio_bps)?;
        Ok(limit.saturating_sub(self.borrows_of(account)))
    }

    /// Lend `amount` of the native asset to `account`
    ///
    /// Checks run in order: amount, collateral (at the current oracle
    /// price), liquidity. The ledger is updated before the payout; a failed
    /// payout restores it.
    pub fn borrow_eth<O, S>(
        &mut self,
        account: &AccountId,
        amount: Amount,
        oracle: &O,
        settlement: &mut S,
    ) -> Result<()>
    where
        O: PriceOracle + ?Sized,
        S: Settlement + ?Sized,
    {
        if amount == 0 {
            return Err(ValidationError::ZeroAmount.into());
        }

        let max_borrowable = self.max_borrow_amount(account, oracle)?;
        if amount > max_borrowable {
            return Err(PoolError::InsufficientCollateral {
                requested: amount,
                max_borrowable,
            });
        }
        if self.native_reserve < amount {
            return Err(PoolError::InsufficientLiquidity {
                requested: amount,
                available: self.native_reserve,
            });
        }

        let previous_borrow = self.borrows_of(account);
        let previous_reserve = self.native_reserve;
        let borrowed = checked_add(previous_borrow, amount)?;
        let reserve = checked_sub(previous_reserve, amount)?;
        self.borrows.insert(account.clone(), borrowed);
        self.native_reserve = reserve;

        if let Err(err) = settlement.pay_out(account, Asset::Native, amount) {
            if previous_borrow == 0 {
                self.borrows.remove(account);
            } else {
                self.borrows.insert(account.clone(), previous_borrow);
            }
            self.native_reserve = previous_reserve;
            warn!("borrow payout to {} failed, ledger restored: {}", account, err);
            return Err(err);
        }

        debug!(
            "borrow by {}: {} -> borrowed={} reserve={}",
            account, amount, borrowed, self.native_reserve
        );
        Ok(())
    }
}
