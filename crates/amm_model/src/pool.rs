//! Stateful reserve pool
//!
//! Owns the native and token reserves. Balances only grow through `deposit`
//! and through the in-side of a `swap`; they only shrink through the
//! out-side of a `swap`.

use crate::math::{quote_swap, spot_price, SwapQuote};
use log::{debug, warn};
use spotlend_common::math::{checked_add, wide_mul};
use spotlend_common::{
    AccountId, Amount, Asset, Payment, PriceOracle, Result, Settlement, TokenId, ValidationError,
    U256,
};

/// Two-asset constant product pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservePool {
    /// Token this pool pairs against the native asset
    token: TokenId,

    /// Native asset reserve
    balance_native: Amount,

    /// Token reserve
    balance_token: Amount,
}

impl ReservePool {
    /// Create an empty pool for `token`
    pub fn new(token: TokenId) -> Self {
        Self {
            token,
            balance_native: 0,
            balance_token: 0,
        }
    }

    pub fn token(&self) -> &TokenId {
        &self.token
    }

    pub fn balance_of(&self, asset: Asset) -> Amount {
        match asset {
            Asset::Native => self.balance_native,
            Asset::Token => self.balance_token,
        }
    }

    /// Current x·y
    pub fn invariant(&self) -> U256 {
        wide_mul(self.balance_native, self.balance_token)
    }

    /// Credit an externally transferred `amount` to one reserve
    pub fn deposit(&mut self, asset: Asset, amount: Amount) -> Result<()> {
        if amount == 0 {
            return Err(ValidationError::ZeroAmount.into());
        }

        let updated = checked_add(self.balance_of(asset), amount)?;
        *self.balance_mut(asset) = updated;

        debug!(
            "reserve deposit: {} {} -> native={} token={}",
            amount, asset, self.balance_native, self.balance_token
        );
        Ok(())
    }

    /// Preview a swap against the current reserves without mutating them
    pub fn quote(&self, asset_in: Asset, amount_in: Amount) -> Result<SwapQuote> {
        quote_swap(
            self.balance_of(asset_in),
            self.balance_of(asset_in.counterpart()),
            amount_in,
        )
    }

    /// Swap `amount_in` of `asset_in` for the other asset
    ///
    /// `payment` is what the caller transferred alongside the instruction and
    /// must equal (`asset_in`, `amount_in`). Both reserves are committed
    /// together, then the output is paid to `caller` through `settlement`.
    /// If the payout fails the reserves are restored and the payout error is
    /// returned.
    ///
    /// # Returns
    /// The amount of the out-asset paid to `caller`
    pub fn swap<S>(
        &mut self,
        caller: &AccountId,
        asset_in: Asset,
        amount_in: Amount,
        payment: Payment,
        settlement: &mut S,
    ) -> Result<Amount>
    where
        S: Settlement + ?Sized,
    {
        payment.ensure_matches(Payment::new(asset_in, amount_in))?;

        let quote = self.quote(asset_in, amount_in)?;
        let asset_out = asset_in.counterpart();
        let before = (self.balance_native, self.balance_token);

        *self.balance_mut(asset_in) = quote.new_in;
        *self.balance_mut(asset_out) = quote.new_out;

        if quote.amount_out > 0 {
            if let Err(err) = settlement.pay_out(caller, asset_out, quote.amount_out) {
                (self.balance_native, self.balance_token) = before;
                warn!("swap payout to {} failed, reserves restored: {}", caller, err);
                return Err(err);
            }
        }

        debug!(
            "swap by {}: {} {} in, {} {} out -> native={} token={}",
            caller,
            amount_in,
            asset_in,
            quote.amount_out,
            asset_out,
            self.balance_native,
            self.balance_token
        );
        Ok(quote.amount_out)
    }

    /// Price of one `base` unit in `quote` units from the current reserves
    ///
    /// No averaging and no liquidity floor: a swap earlier in the same
    /// sequence moves this value immediately.
    pub fn price_of(&self, base: Asset, quote: Asset) -> Result<Amount> {
        spot_price(self.balance_of(base), self.balance_of(quote))
    }

    fn balance_mut(&mut self, asset: Asset) -> &mut Amount {
        match asset {
            Asset::Native => &mut self.balance_native,
            Asset::Token => &mut self.balance_token,
        }
    }
}

impl PriceOracle for ReservePool {
    fn price_of(&self, base: Asset, quote: Asset) -> Result<Amount> {
        ReservePool::price_of(self, base, quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotlend_common::math::units;
    use spotlend_common::{MathError, PoolError, SCALE};

    /// Records payouts; optionally rejects native transfers
    #[derive(Default)]
    struct Recorder {
        paid: Vec<(AccountId, Asset, Amount)>,
        reject_native: bool,
    }

    impl Settlement for Recorder {
        fn pay_out(&mut self, to: &AccountId, asset: Asset, amount: Amount) -> Result<()> {
            if self.reject_native && asset == Asset::Native {
                return Err(PoolError::TransferFailure {
                    to: to.clone(),
                    asset,
                    amount,
                });
            }
            self.paid.push((to.clone(), asset, amount));
            Ok(())
        }
    }

    fn seeded_pool() -> ReservePool {
        let mut pool = ReservePool::new(TokenId::new("USDC"));
        pool.deposit(Asset::Token, units(3000)).unwrap();
        pool.deposit(Asset::Native, units(1)).unwrap();
        pool
    }

    #[test]
    fn test_new_pool_is_empty() {
        let pool = ReservePool::new(TokenId::new("USDC"));
        assert_eq!(pool.balance_of(Asset::Native), 0);
        assert_eq!(pool.balance_of(Asset::Token), 0);
        assert_eq!(pool.token().symbol(), "USDC");
    }

    #[test]
    fn test_deposit_credits_named_balance() {
        let pool = seeded_pool();
        assert_eq!(pool.balance_of(Asset::Native), units(1));
        assert_eq!(pool.balance_of(Asset::Token), units(3000));
    }

    #[test]
    fn test_deposit_zero_rejected() {
        let mut pool = seeded_pool();
        let result = pool.deposit(Asset::Native, 0);
        assert_eq!(result, Err(PoolError::Validation(ValidationError::ZeroAmount)));
        assert_eq!(pool, seeded_pool());
    }

    #[test]
    fn test_initial_prices() {
        let pool = seeded_pool();
        assert_eq!(pool.price_of(Asset::Native, Asset::Token).unwrap(), units(3000));
        assert_eq!(pool.price_of(Asset::Token, Asset::Native).unwrap(), SCALE / 3000);
    }

    #[test]
    fn test_swap_native_in() {
        let mut pool = seeded_pool();
        let mut rails = Recorder::default();
        let alice = AccountId::from("alice");
        let amount_in = SCALE / 100;

        let out = pool
            .swap(&alice, Asset::Native, amount_in, Payment::native(amount_in), &mut rails)
            .unwrap();

        assert_eq!(out, 29_702_970_297_029_702_971);
        assert_eq!(rails.paid, vec![(alice, Asset::Token, out)]);
        assert_eq!(pool.balance_of(Asset::Native), units(1) + amount_in);
        assert_eq!(pool.balance_of(Asset::Token), units(3000) - out);
    }

    #[test]
    fn test_swap_token_in() {
        let mut pool = seeded_pool();
        let mut rails = Recorder::default();
        let bob = AccountId::from("bob");

        let out = pool
            .swap(&bob, Asset::Token, units(3000), Payment::token(units(3000)), &mut rails)
            .unwrap();

        // 1 - floor(1·3000 / 6000) = 0.5 native
        assert_eq!(out, SCALE / 2);
        assert_eq!(pool.balance_of(Asset::Token), units(6000));
        assert_eq!(pool.balance_of(Asset::Native), SCALE / 2);
    }

    #[test]
    fn test_swap_payment_mismatch() {
        let mut pool = seeded_pool();
        let mut rails = Recorder::default();
        let alice = AccountId::from("alice");

        let result = pool.swap(&alice, Asset::Native, units(1), Payment::native(units(2)), &mut rails);
        assert!(matches!(
            result,
            Err(PoolError::Validation(ValidationError::PaymentMismatch { .. }))
        ));

        let result = pool.swap(&alice, Asset::Native, units(1), Payment::token(units(1)), &mut rails);
        assert!(matches!(
            result,
            Err(PoolError::Validation(ValidationError::PaymentMismatch { .. }))
        ));

        assert_eq!(pool, seeded_pool());
        assert!(rails.paid.is_empty());
    }

    #[test]
    fn test_swap_against_empty_pool() {
        let mut pool = ReservePool::new(TokenId::new("USDC"));
        let mut rails = Recorder::default();
        let result = pool.swap(
            &AccountId::from("alice"),
            Asset::Native,
            units(1),
            Payment::native(units(1)),
            &mut rails,
        );
        assert_eq!(result, Err(PoolError::Arithmetic(MathError::DivisionByZero)));
    }

    #[test]
    fn test_failed_payout_restores_reserves() {
        let mut pool = seeded_pool();
        let mut rails = Recorder {
            reject_native: true,
            ..Recorder::default()
        };

        let result = pool.swap(
            &AccountId::from("contract"),
            Asset::Token,
            units(100),
            Payment::token(units(100)),
            &mut rails,
        );

        assert!(matches!(result, Err(PoolError::TransferFailure { .. })));
        assert_eq!(pool, seeded_pool());
    }

    #[test]
    fn test_swap_moves_spot_price() {
        let mut pool = seeded_pool();
        let mut rails = Recorder::default();
        let before = pool.price_of(Asset::Token, Asset::Native).unwrap();

        pool.swap(
            &AccountId::from("attacker"),
            Asset::Native,
            units(2),
            Payment::native(units(2)),
            &mut rails,
        )
        .unwrap();

        let after = pool.price_of(Asset::Token, Asset::Native).unwrap();
        assert_eq!(before, 333_333_333_333_333);
        assert_eq!(after, 3_000_000_000_000_000);
    }

    #[test]
    fn test_reads_are_idempotent() {
        let pool = seeded_pool();
        let first = (
            pool.price_of(Asset::Token, Asset::Native).unwrap(),
            pool.balance_of(Asset::Native),
            pool.quote(Asset::Native, units(1)).unwrap(),
        );
        let second = (
            pool.price_of(Asset::Token, Asset::Native).unwrap(),
            pool.balance_of(Asset::Native),
            pool.quote(Asset::Native, units(1)).unwrap(),
        );
        assert_eq!(first, second);
    }
}
