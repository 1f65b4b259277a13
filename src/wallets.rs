//! Account balances outside the pools
//!
//! Pools pay accounts through the `Settlement` impl here. An account can be
//! marked as refusing the native asset, which makes every native payout to it
//! fail; that is how a recipient whose receive hook reverts is modeled.

use log::debug;
use serde::Serialize;
use spotlend_common::math::{checked_add, checked_sub};
use spotlend_common::{AccountId, Amount, Asset, PoolError, Result, Settlement, ValidationError};
use std::collections::BTreeMap;

/// Holdings of one account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Balances {
    #[serde(with = "spotlend_common::math::decimal")]
    pub native: Amount,
    #[serde(with = "spotlend_common::math::decimal")]
    pub token: Amount,
}

impl Balances {
    pub fn new(native: Amount, token: Amount) -> Self {
        Self { native, token }
    }

    pub fn of(&self, asset: Asset) -> Amount {
        match asset {
            Asset::Native => self.native,
            Asset::Token => self.token,
        }
    }

    fn of_mut(&mut self, asset: Asset) -> &mut Amount {
        match asset {
            Asset::Native => &mut self.native,
            Asset::Token => &mut self.token,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Wallet {
    balances: Balances,
    rejects_native: bool,
}

/// Balance book for every account known to the market
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wallets {
    accounts: BTreeMap<AccountId, Wallet>,
}

impl Wallets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `account` (or top it up) with the given holdings
    pub fn open(&mut self, account: &AccountId, balances: Balances) -> Result<()> {
        let wallet = self.accounts.entry(account.clone()).or_default();
        let native = checked_add(wallet.balances.native, balances.native)?;
        let token = checked_add(wallet.balances.token, balances.token)?;
        wallet.balances = Balances::new(native, token);
        Ok(())
    }

    pub fn contains(&self, account: &AccountId) -> bool {
        self.accounts.contains_key(account)
    }

    /// Holdings of `account`; zero for accounts never seen
    pub fn balances(&self, account: &AccountId) -> Balances {
        self.accounts
            .get(account)
            .map(|wallet| wallet.balances)
            .unwrap_or_default()
    }

    pub fn balance(&self, account: &AccountId, asset: Asset) -> Amount {
        self.balances(account).of(asset)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, Balances)> + '_ {
        self.accounts
            .iter()
            .map(|(account, wallet)| (account, wallet.balances))
    }

    /// Sum of `asset` held across all wallets
    pub fn total(&self, asset: Asset) -> Result<Amount> {
        self.accounts
            .values()
            .try_fold(0, |sum, wallet| checked_add(sum, wallet.balances.of(asset)))
            .map_err(PoolError::from)
    }

    /// Mark `account` as unable to receive the native asset
    pub fn set_rejects_native(&mut self, account: &AccountId, rejects: bool) -> Result<()> {
        let wallet = self
            .accounts
            .get_mut(account)
            .ok_or_else(|| ValidationError::UnknownAccount(account.clone()))?;
        wallet.rejects_native = rejects;
        Ok(())
    }

    /// Take `amount` of `asset` out of `account`
    pub fn debit(&mut self, account: &AccountId, asset: Asset, amount: Amount) -> Result<()> {
        let wallet = self
            .accounts
            .get_mut(account)
            .ok_or_else(|| ValidationError::UnknownAccount(account.clone()))?;
        let available = wallet.balances.of(asset);
        if available < amount {
            return Err(ValidationError::InsufficientBalance {
                account: account.clone(),
                asset,
                required: amount,
                available,
            }
            .into());
        }
        *wallet.balances.of_mut(asset) = checked_sub(available, amount)?;
        Ok(())
    }

    /// Put `amount` of `asset` into `account`, creating it if needed
    pub fn credit(&mut self, account: &AccountId, asset: Asset, amount: Amount) -> Result<()> {
        let wallet = self.accounts.entry(account.clone()).or_default();
        if asset == Asset::Native && wallet.rejects_native {
            return Err(PoolError::TransferFailure {
                to: account.clone(),
                asset,
                amount,
            });
        }
        let updated = checked_add(wallet.balances.of(asset), amount)?;
        *wallet.balances.of_mut(asset) = updated;
        Ok(())
    }

    /// Move `amount` of `asset` between two accounts
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        asset: Asset,
        amount: Amount,
    ) -> Result<()> {
        if amount == 0 {
            return Err(ValidationError::ZeroAmount.into());
        }
        self.debit(from, asset, amount)?;
        if let Err(err) = self.credit(to, asset, amount) {
            // Undo the debit; the restored value was held a moment ago
            if let Some(wallet) = self.accounts.get_mut(from) {
                *wallet.balances.of_mut(asset) += amount;
            }
            return Err(err);
        }
        debug!("transfer {} {} from {} to {}", amount, asset, from, to);
        Ok(())
    }
}

impl Settlement for Wallets {
    fn pay_out(&mut self, to: &AccountId, asset: Asset, amount: Amount) -> Result<()> {
        self.credit(to, asset, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotlend_common::math::units;

    fn wallets() -> (Wallets, AccountId, AccountId) {
        let alice = AccountId::from("alice");
        let bob = AccountId::from("bob");
        let mut wallets = Wallets::new();
        wallets.open(&alice, Balances::new(units(5), units(100))).unwrap();
        wallets.open(&bob, Balances::default()).unwrap();
        (wallets, alice, bob)
    }

    #[test]
    fn test_transfer_moves_funds() {
        let (mut wallets, alice, bob) = wallets();
        wallets.transfer(&alice, &bob, Asset::Native, units(2)).unwrap();

        assert_eq!(wallets.balance(&alice, Asset::Native), units(3));
        assert_eq!(wallets.balance(&bob, Asset::Native), units(2));
        assert_eq!(wallets.total(Asset::Native).unwrap(), units(5));
    }

    #[test]
    fn test_debit_insufficient() {
        let (mut wallets, alice, _) = wallets();
        let result = wallets.debit(&alice, Asset::Token, units(101));
        assert_eq!(
            result,
            Err(PoolError::Validation(ValidationError::InsufficientBalance {
                account: alice.clone(),
                asset: Asset::Token,
                required: units(101),
                available: units(100),
            }))
        );
    }

    #[test]
    fn test_debit_unknown_account() {
        let (mut wallets, _, _) = wallets();
        let ghost = AccountId::from("ghost");
        assert_eq!(
            wallets.debit(&ghost, Asset::Native, 1),
            Err(PoolError::Validation(ValidationError::UnknownAccount(ghost)))
        );
    }

    #[test]
    fn test_credit_opens_account() {
        let (mut wallets, _, _) = wallets();
        let carol = AccountId::from("carol");
        wallets.pay_out(&carol, Asset::Token, units(1)).unwrap();
        assert!(wallets.contains(&carol));
        assert_eq!(wallets.balance(&carol, Asset::Token), units(1));
    }

    #[test]
    fn test_rejecting_account_fails_native_only() {
        let (mut wallets, alice, bob) = wallets();
        wallets.set_rejects_native(&bob, true).unwrap();
        let before = wallets.clone();

        let result = wallets.transfer(&alice, &bob, Asset::Native, units(1));
        assert!(matches!(result, Err(PoolError::TransferFailure { .. })));
        assert_eq!(wallets, before);

        wallets.transfer(&alice, &bob, Asset::Token, units(1)).unwrap();
        assert_eq!(wallets.balance(&bob, Asset::Token), units(1));
    }

    #[test]
    fn test_zero_transfer_rejected() {
        let (mut wallets, alice, bob) = wallets();
        assert_eq!(
            wallets.transfer(&alice, &bob, Asset::Native, 0),
            Err(PoolError::Validation(ValidationError::ZeroAmount))
        );
    }
}
