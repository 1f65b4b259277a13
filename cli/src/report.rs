//! Market state printing shared by the commands

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use spotlend::{format_amount, AccountId, Amount, Asset, Balances, Market, Outcome};

/// Pool and wallet state in serializable form
#[derive(Debug, Serialize)]
pub struct MarketState {
    pub reserve: Balances,
    #[serde(with = "spotlend::decimal")]
    pub token_price: Amount,
    #[serde(with = "spotlend::decimal")]
    pub lender_reserve: Amount,
    #[serde(with = "spotlend::decimal")]
    pub total_collateral: Amount,
    pub wallets: Vec<WalletState>,
}

#[derive(Debug, Serialize)]
pub struct WalletState {
    pub account: AccountId,
    #[serde(flatten)]
    pub balances: Balances,
    #[serde(with = "spotlend::decimal")]
    pub deposited: Amount,
    #[serde(with = "spotlend::decimal")]
    pub borrowed: Amount,
}

impl MarketState {
    pub fn capture(market: &Market) -> Self {
        let reserve = Balances::new(
            market.balance_of(Asset::Native),
            market.balance_of(Asset::Token),
        );
        // An empty pool has no price
        let token_price = market.price_of(Asset::Token, Asset::Native).unwrap_or(0);
        let wallets = market
            .wallets()
            .iter()
            .map(|(account, balances)| WalletState {
                account: account.clone(),
                balances,
                deposited: market.deposits_of(account),
                borrowed: market.borrows_of(account),
            })
            .collect();

        Self {
            reserve,
            token_price,
            lender_reserve: market.lender().native_reserve(),
            total_collateral: market.lender().total_collateral(),
            wallets,
        }
    }

    pub fn print(&self, symbol: &str) {
        println!("\n{}", "--- Reserve Pool ---".bright_yellow());
        println!(
            "{} {} native / {} {}",
            "Balances:".bright_cyan(),
            format_amount(self.reserve.native),
            format_amount(self.reserve.token),
            symbol
        );
        println!(
            "{} {} native",
            format!("Price (1 {}):", symbol).bright_cyan(),
            format_amount(self.token_price)
        );

        println!("\n{}", "--- Lending Pool ---".bright_yellow());
        println!(
            "{} {} native",
            "Reserve:".bright_cyan(),
            format_amount(self.lender_reserve)
        );
        println!(
            "{} {} {}",
            "Collateral:".bright_cyan(),
            format_amount(self.total_collateral),
            symbol
        );

        println!("\n{}", "--- Wallets ---".bright_yellow());
        for wallet in &self.wallets {
            println!(
                "{} {} native, {} {}",
                format!("{}:", wallet.account).bright_cyan(),
                format_amount(wallet.balances.native),
                format_amount(wallet.balances.token),
                symbol
            );
            if wallet.deposited > 0 || wallet.borrowed > 0 {
                println!(
                    "  {} deposited {} {}, borrowed {} native",
                    "position:".dimmed(),
                    format_amount(wallet.deposited),
                    symbol,
                    format_amount(wallet.borrowed)
                );
            }
        }
    }
}

/// One-line description of a step result
pub fn describe(outcome: &Outcome, symbol: &str, asset_out: Option<Asset>) -> String {
    match outcome {
        Outcome::Done => "ok".to_string(),
        Outcome::Swapped { amount_out } => {
            let unit = match asset_out {
                Some(Asset::Native) => "native",
                _ => symbol,
            };
            format!("received {} {}", format_amount(*amount_out), unit)
        }
        Outcome::Borrowed { amount } => format!("borrowed {} native", format_amount(*amount)),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
