//! Scenario file loading

use anyhow::{Context, Result};
use serde::Deserialize;
use spotlend::{AccountId, Amount, Market, MarketConfig, Op};
use std::fs;
use std::path::PathBuf;

/// A market setup plus the sequences to run against it
#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub market: MarketConfig,

    #[serde(default)]
    pub accounts: Vec<AccountSpec>,

    #[serde(default)]
    pub sequences: Vec<SequenceSpec>,
}

/// Opening balances of one account
#[derive(Debug, Deserialize)]
pub struct AccountSpec {
    pub name: AccountId,

    #[serde(default, with = "spotlend::decimal")]
    pub native: Amount,

    #[serde(default, with = "spotlend::decimal")]
    pub token: Amount,

    /// Every native payout to this account fails
    #[serde(default)]
    pub rejects_native: bool,
}

/// Operations submitted together as one atomic sequence
#[derive(Debug, Deserialize)]
pub struct SequenceSpec {
    #[serde(default)]
    pub name: Option<String>,

    pub ops: Vec<Op>,
}

impl Scenario {
    /// Read and parse a scenario file (`~` is expanded)
    pub fn load(path: &str) -> Result<Self> {
        let path = PathBuf::from(shellexpand::tilde(path).as_ref());
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("Invalid scenario file: {}", path.display()))
    }

    pub fn parse(data: &str) -> Result<Self> {
        toml::from_str(data).context("Failed to parse scenario TOML")
    }

    /// Construct the market and open every account
    pub fn build_market(&self) -> Result<Market> {
        let mut market =
            Market::new(self.market.clone()).context("Invalid market configuration")?;
        for account in &self.accounts {
            market
                .open_account(&account.name, account.native, account.token)
                .with_context(|| format!("Failed to open account {}", account.name))?;
            if account.rejects_native {
                market.set_rejects_native(&account.name, true)?;
            }
        }
        Ok(market)
    }
}
