//! World state and atomic sequence execution
//!
//! `Market` binds one reserve pool, one lending pool that prices collateral
//! off that reserve pool, and the wallets of every account. Each public
//! mutation is all-or-nothing; `atomic` and `execute` extend the same
//! guarantee to a whole sequence of operations.

use amm_model::{ReservePool, SwapQuote};
use lending_model::LendingPool;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use spotlend_common::math::checked_add;
use spotlend_common::{
    AccountId, Amount, Asset, Payment, PoolError, Result, TokenId, ValidationError,
};
use thiserror::Error;

use crate::wallets::{Balances, Wallets};

/// Construction parameters, fixed for the life of the market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Token paired against the native asset
    pub token: TokenId,

    /// Borrowable fraction of collateral value (e.g. 8000 = 80%)
    pub collateral_ratio_bps: u16,
}

/// One step of a submitted sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Plain wallet transfer (flash-loan funding, repayments)
    Transfer {
        from: AccountId,
        to: AccountId,
        asset: Asset,
        #[serde(with = "spotlend_common::math::decimal")]
        amount: Amount,
    },

    /// Move funds from a wallet into the reserve pool
    SeedPool {
        from: AccountId,
        asset: Asset,
        #[serde(with = "spotlend_common::math::decimal")]
        amount: Amount,
    },

    /// Move native funds from a wallet into the lending reserve
    FundLender {
        from: AccountId,
        #[serde(with = "spotlend_common::math::decimal")]
        amount: Amount,
    },

    /// Swap against the reserve pool; `payment` defaults to the matching one
    Swap {
        caller: AccountId,
        asset_in: Asset,
        #[serde(with = "spotlend_common::math::decimal")]
        amount_in: Amount,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payment: Option<Payment>,
    },

    /// Deposit token collateral; `payment` defaults to the matching one
    DepositCollateral {
        account: AccountId,
        #[serde(with = "spotlend_common::math::decimal")]
        amount: Amount,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payment: Option<Payment>,
    },

    /// Borrow native; omit `amount` to borrow the current maximum
    Borrow {
        account: AccountId,
        #[serde(
            default,
            with = "spotlend_common::math::decimal::option",
            skip_serializing_if = "Option::is_none"
        )]
        amount: Option<Amount>,
    },
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Transfer { .. } => "transfer",
            Op::SeedPool { .. } => "seed_pool",
            Op::FundLender { .. } => "fund_lender",
            Op::Swap { .. } => "swap",
            Op::DepositCollateral { .. } => "deposit_collateral",
            Op::Borrow { .. } => "borrow",
        }
    }
}

/// What a successful step produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Done,
    Swapped {
        #[serde(with = "spotlend_common::math::decimal")]
        amount_out: Amount,
    },
    Borrowed {
        #[serde(with = "spotlend_common::math::decimal")]
        amount: Amount,
    },
}

/// A sequence failed; nothing it did is visible
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step {step} ({op}) failed: {source}")]
pub struct SequenceError {
    /// Zero-based index of the failing operation
    pub step: usize,
    /// Name of the failing operation
    pub op: &'static str,
    #[source]
    pub source: PoolError,
}

/// One reserve pool, one lending pool bound to it, and all wallets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    reserve: ReservePool,
    lender: LendingPool,
    wallets: Wallets,
}

impl Market {
    /// Build empty pools for `config.token`
    pub fn new(config: MarketConfig) -> Result<Self> {
        let lender = LendingPool::new(config.token.clone(), config.collateral_ratio_bps)?;
        let reserve = ReservePool::new(config.token);
        Self::from_parts(reserve, lender)
    }

    /// Bind an existing reserve pool and lending pool
    ///
    /// # Errors
    /// `TokenMismatch` if the two pools are for different tokens
    pub fn from_parts(reserve: ReservePool, lender: LendingPool) -> Result<Self> {
        if reserve.token() != lender.token() {
            return Err(ValidationError::TokenMismatch {
                expected: reserve.token().to_string(),
                actual: lender.token().to_string(),
            }
            .into());
        }
        Ok(Self {
            reserve,
            lender,
            wallets: Wallets::new(),
        })
    }

    pub fn reserve(&self) -> &ReservePool {
        &self.reserve
    }

    pub fn lender(&self) -> &LendingPool {
        &self.lender
    }

    pub fn wallets(&self) -> &Wallets {
        &self.wallets
    }

    pub fn wallet(&self, account: &AccountId) -> Balances {
        self.wallets.balances(account)
    }

    // ========================================
    // Reads
    // ========================================

    pub fn balance_of(&self, asset: Asset) -> Amount {
        self.reserve.balance_of(asset)
    }

    pub fn price_of(&self, base: Asset, quote: Asset) -> Result<Amount> {
        self.reserve.price_of(base, quote)
    }

    pub fn quote(&self, asset_in: Asset, amount_in: Amount) -> Result<SwapQuote> {
        self.reserve.quote(asset_in, amount_in)
    }

    pub fn deposits_of(&self, account: &AccountId) -> Amount {
        self.lender.deposits_of(account)
    }

    pub fn borrows_of(&self, account: &AccountId) -> Amount {
        self.lender.borrows_of(account)
    }

    /// Borrow headroom of `account` at the reserve pool's current price
    pub fn max_borrow_amount(&self, account: &AccountId) -> Result<Amount> {
        self.lender.max_borrow_amount(account, &self.reserve)
    }

    /// Everything of `asset` in existence: wallets, reserve pool, lending pool
    pub fn supply_of(&self, asset: Asset) -> Result<Amount> {
        let held_by_lender = match asset {
            Asset::Native => self.lender.native_reserve(),
            Asset::Token => self.lender.total_collateral(),
        };
        let pools = checked_add(self.reserve.balance_of(asset), held_by_lender)?;
        Ok(checked_add(self.wallets.total(asset)?, pools)?)
    }

    // ========================================
    // Accounts
    // ========================================

    pub fn open_account(&mut self, account: &AccountId, native: Amount, token: Amount) -> Result<()> {
        self.wallets.open(account, Balances::new(native, token))
    }

    pub fn set_rejects_native(&mut self, account: &AccountId, rejects: bool) -> Result<()> {
        self.wallets.set_rejects_native(account, rejects)
    }

    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        asset: Asset,
        amount: Amount,
    ) -> Result<()> {
        self.wallets.transfer(from, to, asset, amount)
    }

    // ========================================
    // Pool operations
    // ========================================

    /// Transfer `amount` from `from` into the reserve pool
    pub fn seed_pool(&mut self, from: &AccountId, asset: Asset, amount: Amount) -> Result<()> {
        self.atomic(|m| m.seed_pool_step(from, asset, amount))
    }

    /// Transfer native `amount` from `from` into the lending reserve
    pub fn fund_lender(&mut self, from: &AccountId, amount: Amount) -> Result<()> {
        self.atomic(|m| m.fund_lender_step(from, amount))
    }

    /// `caller` sends `payment` and swaps `amount_in` of `asset_in`
    pub fn swap(
        &mut self,
        caller: &AccountId,
        asset_in: Asset,
        amount_in: Amount,
        payment: Payment,
    ) -> Result<Amount> {
        self.atomic(|m| m.swap_step(caller, asset_in, amount_in, payment))
    }

    /// `account` sends `payment` and records `amount` of token collateral
    pub fn deposit_collateral(
        &mut self,
        account: &AccountId,
        amount: Amount,
        payment: Payment,
    ) -> Result<()> {
        self.atomic(|m| m.deposit_collateral_step(account, amount, payment))
    }

    /// Borrow `amount` of native against `account`'s collateral
    ///
    /// The lending pool is always priced by this market's own reserve pool.
    pub fn borrow_eth(&mut self, account: &AccountId, amount: Amount) -> Result<()> {
        let Market {
            reserve,
            lender,
            wallets,
        } = self;
        lender.borrow_eth(account, amount, &*reserve, wallets)
    }

    // ========================================
    // Steps
    // ========================================
    //
    // Step bodies may leave a partial write behind on error. Callers wrap them
    // in `atomic`, either one at a time or a whole sequence at once.

    fn seed_pool_step(&mut self, from: &AccountId, asset: Asset, amount: Amount) -> Result<()> {
        self.wallets.debit(from, asset, amount)?;
        self.reserve.deposit(asset, amount)
    }

    fn fund_lender_step(&mut self, from: &AccountId, amount: Amount) -> Result<()> {
        self.wallets.debit(from, Asset::Native, amount)?;
        self.lender.fund(amount)
    }

    fn swap_step(
        &mut self,
        caller: &AccountId,
        asset_in: Asset,
        amount_in: Amount,
        payment: Payment,
    ) -> Result<Amount> {
        payment.ensure_matches(Payment::new(asset_in, amount_in))?;
        self.wallets.debit(caller, payment.asset, payment.amount)?;
        self.reserve
            .swap(caller, asset_in, amount_in, payment, &mut self.wallets)
    }

    fn deposit_collateral_step(
        &mut self,
        account: &AccountId,
        amount: Amount,
        payment: Payment,
    ) -> Result<()> {
        payment.ensure_matches(Payment::token(amount))?;
        self.wallets.debit(account, payment.asset, payment.amount)?;
        self.lender.deposit_collateral(account, amount, payment)
    }

    fn step(&mut self, op: &Op) -> Result<Outcome> {
        match op {
            Op::Transfer {
                from,
                to,
                asset,
                amount,
            } => self.transfer(from, to, *asset, *amount).map(|_| Outcome::Done),
            Op::SeedPool {
                from,
                asset,
                amount,
            } => self
                .seed_pool_step(from, *asset, *amount)
                .map(|_| Outcome::Done),
            Op::FundLender { from, amount } => {
                self.fund_lender_step(from, *amount).map(|_| Outcome::Done)
            }
            Op::Swap {
                caller,
                asset_in,
                amount_in,
                payment,
            } => {
                let payment = payment.unwrap_or_else(|| Payment::new(*asset_in, *amount_in));
                self.swap_step(caller, *asset_in, *amount_in, payment)
                    .map(|amount_out| Outcome::Swapped { amount_out })
            }
            Op::DepositCollateral {
                account,
                amount,
                payment,
            } => {
                let payment = payment.unwrap_or_else(|| Payment::token(*amount));
                self.deposit_collateral_step(account, *amount, payment)
                    .map(|_| Outcome::Done)
            }
            Op::Borrow { account, amount } => {
                let amount = match amount {
                    Some(amount) => *amount,
                    None => self.max_borrow_amount(account)?,
                };
                self.borrow_eth(account, amount)
                    .map(|_| Outcome::Borrowed { amount })
            }
        }
    }

    // ========================================
    // Sequences
    // ========================================

    /// Run `f` as one all-or-nothing unit
    ///
    /// Every read inside `f` observes the writes made earlier in `f`. If `f`
    /// returns an error the market is restored to its state before the call.
    pub fn atomic<T, E, F>(&mut self, f: F) -> core::result::Result<T, E>
    where
        F: FnOnce(&mut Market) -> core::result::Result<T, E>,
    {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    /// Apply a single operation
    pub fn apply(&mut self, op: &Op) -> Result<Outcome> {
        self.atomic(|m| m.step(op))
    }

    /// Apply `ops` in order as one atomic sequence
    pub fn execute(&mut self, ops: &[Op]) -> core::result::Result<Vec<Outcome>, SequenceError> {
        let result = self.atomic(|m| {
            let mut outcomes = Vec::with_capacity(ops.len());
            for (step, op) in ops.iter().enumerate() {
                let outcome = m.step(op).map_err(|source| SequenceError {
                    step,
                    op: op.name(),
                    source,
                })?;
                debug!("step {} {}: {:?}", step, op.name(), outcome);
                outcomes.push(outcome);
            }
            Ok(outcomes)
        });

        match &result {
            Ok(outcomes) => info!("sequence of {} ops committed", outcomes.len()),
            Err(err) => info!("sequence rolled back: {}", err),
        }
        result
    }
}
