//! Kani proofs for borrow limits
//!
//! - **L1: Collateral Bound** - max borrow never exceeds deposit · price · ratio
//! - **L2: Borrow Respects Limit** - a successful borrow stays within the limit
//! - **L3: Failed Borrow No Mutation** - rejected borrows leave the pool unchanged

use lending_model::LendingPool;
use spotlend_common::{
    AccountId, Amount, Asset, Payment, PriceOracle, Result, Settlement, TokenId, SCALE,
};

struct FixedPrice(Amount);

impl PriceOracle for FixedPrice {
    fn price_of(&self, _base: Asset, _quote: Asset) -> Result<Amount> {
        Ok(self.0)
    }
}

struct Sink;

impl Settlement for Sink {
    fn pay_out(&mut self, _to: &AccountId, _asset: Asset, _amount: Amount) -> Result<()> {
        Ok(())
    }
}

fn funded_pool(ratio: u16, reserve: u64, deposit: u64) -> LendingPool {
    let mut pool = LendingPool::new(TokenId::new("T"), ratio).unwrap();
    pool.fund(reserve as Amount).unwrap();
    pool.deposit_collateral(
        &AccountId::from("a"),
        deposit as Amount,
        Payment::token(deposit as Amount),
    )
    .unwrap();
    pool
}

/// L1: headroom is bounded by the collateral value at the given price
#[kani::proof]
#[kani::unwind(3)]
fn l1_collateral_bound() {
    let ratio: u16 = kani::any();
    let deposit: u64 = kani::any();
    let price: u64 = kani::any();
    kani::assume(ratio <= 10_000 && deposit > 0);

    let pool = funded_pool(ratio, 1, deposit);
    let max = pool
        .max_borrow_amount(&AccountId::from("a"), &FixedPrice(price as Amount))
        .unwrap();

    let value = (deposit as u128) * (price as u128) / SCALE;
    assert!(max <= value, "L1: max borrow must not exceed collateral value");
}

/// L2: borrows after a successful call stay within the limit
#[kani::proof]
#[kani::unwind(3)]
fn l2_borrow_respects_limit() {
    let deposit: u64 = kani::any();
    let price: u64 = kani::any();
    let amount: u64 = kani::any();
    kani::assume(deposit > 0);

    let mut pool = funded_pool(8000, u64::MAX, deposit);
    let account = AccountId::from("a");
    let oracle = FixedPrice(price as Amount);

    if pool
        .borrow_eth(&account, amount as Amount, &oracle, &mut Sink)
        .is_ok()
    {
        let value = (deposit as u128) * (price as u128) / SCALE;
        let limit = value * 8000 / 10_000;
        assert!(pool.borrows_of(&account) <= limit, "L2: borrow above limit");
    }
}

/// L3: a rejected borrow changes nothing
#[kani::proof]
#[kani::unwind(3)]
fn l3_failed_borrow_no_mutation() {
    let deposit: u64 = kani::any();
    let price: u64 = kani::any();
    let amount: u64 = kani::any();
    let reserve: u64 = kani::any();
    kani::assume(deposit > 0 && reserve > 0);

    let mut pool = funded_pool(8000, reserve, deposit);
    let before = pool.clone();
    let oracle = FixedPrice(price as Amount);

    if pool
        .borrow_eth(&AccountId::from("a"), amount as Amount, &oracle, &mut Sink)
        .is_err()
    {
        assert!(pool == before, "L3: failed borrow must not mutate");
    }
}
