//! Swap quoting against hypothetical reserves

use anyhow::{Context, Result};
use colored::Colorize;
use spotlend::{format_amount, Amount, Asset, ReservePool, SwapQuote, TokenId};

/// Pool holding exactly the given reserves
fn pool_with(native: Amount, token: Amount) -> Result<ReservePool> {
    let mut pool = ReservePool::new(TokenId::new("token"));
    pool.deposit(Asset::Native, native)
        .context("Native reserve must be greater than zero")?;
    pool.deposit(Asset::Token, token)
        .context("Token reserve must be greater than zero")?;
    Ok(pool)
}

/// Quote plus the reserves and token price on either side of it
pub struct QuoteReport {
    pub quote: SwapQuote,
    pub price_before: Amount,
    pub price_after: Amount,
    pub after: ReservePool,
}

pub fn quote(native: Amount, token: Amount, asset_in: Asset, amount_in: Amount) -> Result<QuoteReport> {
    let before = pool_with(native, token)?;
    let quote = before.quote(asset_in, amount_in).context("Swap cannot be quoted")?;

    let (new_native, new_token) = match asset_in {
        Asset::Native => (quote.new_in, quote.new_out),
        Asset::Token => (quote.new_out, quote.new_in),
    };
    let after = pool_with(new_native, new_token)?;

    Ok(QuoteReport {
        quote,
        price_before: before.price_of(Asset::Token, Asset::Native)?,
        price_after: after.price_of(Asset::Token, Asset::Native)?,
        after,
    })
}

pub fn show_quote(native: Amount, token: Amount, asset_in: Asset, amount_in: Amount) -> Result<()> {
    println!("{}", "=== Swap Quote ===".bright_green().bold());
    println!(
        "{} {} native / {} token",
        "Reserves:".bright_cyan(),
        format_amount(native),
        format_amount(token)
    );
    println!(
        "{} {} {}",
        "Amount In:".bright_cyan(),
        format_amount(amount_in),
        asset_in
    );

    let report = quote(native, token, asset_in, amount_in)?;

    println!(
        "\n{} {} {}",
        "Amount Out:".bright_cyan(),
        format_amount(report.quote.amount_out).bright_green(),
        asset_in.counterpart()
    );
    println!(
        "{} {} native / {} token",
        "New Reserves:".bright_cyan(),
        format_amount(report.after.balance_of(Asset::Native)),
        format_amount(report.after.balance_of(Asset::Token))
    );
    println!(
        "{} {} -> {} native",
        "Token Price:".bright_cyan(),
        format_amount(report.price_before),
        format_amount(report.price_after)
    );
    Ok(())
}
