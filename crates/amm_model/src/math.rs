//! Constant product AMM math (x·y=k), zero fee

use spotlend_common::math::{checked_add, checked_sub, div_floor_wide, mul_div_floor, wide_mul};
use spotlend_common::{Amount, MathError, PoolError, Result, ValidationError, SCALE};

/// Result of pricing a swap against a pair of reserves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    /// Amount of the out-asset the caller receives
    pub amount_out: Amount,

    /// In-asset reserve after the trade
    pub new_in: Amount,

    /// Out-asset reserve after the trade
    pub new_out: Amount,
}

/// Price a swap of `amount_in` against reserves (`balance_in`, `balance_out`)
///
/// - k = balance_in · balance_out (256-bit, exact)
/// - new_in = balance_in + amount_in
/// - new_out = floor(k / new_in)
/// - amount_out = balance_out - new_out
///
/// Flooring `new_out` rounds in the caller's favour: new_out falls short of
/// the exact k / new_in by less than one smallest unit, so
/// k - new_in < new_in · new_out <= k.
///
/// # Errors
/// * `Validation(ZeroAmount)` if `amount_in == 0`
/// * `Arithmetic(DivisionByZero)` if `balance_in == 0` (empty pool)
/// * `InsufficientLiquidity` if the trade would leave the out reserve at zero
pub fn quote_swap(balance_in: Amount, balance_out: Amount, amount_in: Amount) -> Result<SwapQuote> {
    if amount_in == 0 {
        return Err(ValidationError::ZeroAmount.into());
    }
    if balance_in == 0 {
        return Err(MathError::DivisionByZero.into());
    }

    let k = wide_mul(balance_in, balance_out);
    let new_in = checked_add(balance_in, amount_in)?;
    let new_out = div_floor_wide(k, new_in)?;
    let amount_out = checked_sub(balance_out, new_out)?;

    // The last unit of the out reserve is never paid out
    if new_out == 0 {
        return Err(PoolError::InsufficientLiquidity {
            requested: amount_out,
            available: balance_out.saturating_sub(1),
        });
    }

    Ok(SwapQuote {
        amount_out,
        new_in,
        new_out,
    })
}

/// Instantaneous price of one `base` unit in `quote` units, scaled by SCALE
///
/// Pure reserve ratio: floor(balance_quote · SCALE / balance_base).
pub fn spot_price(balance_base: Amount, balance_quote: Amount) -> Result<Amount> {
    Ok(mul_div_floor(balance_quote, SCALE, balance_base)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotlend_common::math::units;
    use spotlend_common::U256;

    #[test]
    fn test_quote_small_swap() {
        // 1 native / 3000 token, swap in 0.01 native
        let quote = quote_swap(units(1), units(3000), SCALE / 100).unwrap();

        // 3000 - floor(1·3000 / 1.01) ≈ 29.70297 token
        assert_eq!(quote.amount_out, 29_702_970_297_029_702_971);
        assert_eq!(quote.new_in, units(1) + SCALE / 100);
        assert_eq!(quote.new_out, 2_970_297_029_702_970_297_029);
    }

    #[test]
    fn test_quote_exact_when_divisible() {
        // 1·3000 / 3 = 1000 exactly
        let quote = quote_swap(units(1), units(3000), units(2)).unwrap();
        assert_eq!(quote.amount_out, units(2000));
        assert_eq!(quote.new_in, units(3));
        assert_eq!(quote.new_out, units(1000));
    }

    #[test]
    fn test_invariant_loss_below_one_unit() {
        let cases = [
            (units(1), units(3000), SCALE / 100),
            (units(7), units(13), 3),
            (997, 1_000_003, 17),
            (units(1_000_000), 5, units(1)),
        ];
        for (b_in, b_out, dx) in cases {
            let quote = quote_swap(b_in, b_out, dx).unwrap();
            let k0 = wide_mul(b_in, b_out);
            let k1 = wide_mul(quote.new_in, quote.new_out);
            assert!(k1 <= k0, "k grew for {:?}", (b_in, b_out, dx));
            assert!(
                k0 - k1 < U256::from(quote.new_in),
                "rounding loss too large for {:?}",
                (b_in, b_out, dx)
            );
            assert!(quote.amount_out < b_out);
        }
    }

    #[test]
    fn test_empty_input_reserve() {
        assert_eq!(
            quote_swap(0, units(3000), units(1)),
            Err(PoolError::Arithmetic(MathError::DivisionByZero))
        );
    }

    #[test]
    fn test_zero_amount_rejected() {
        assert_eq!(
            quote_swap(units(1), units(1), 0),
            Err(PoolError::Validation(ValidationError::ZeroAmount))
        );
    }

    #[test]
    fn test_cannot_drain_out_reserve() {
        // floor(1·1 / 11) = 0 would hand over the whole out reserve
        let result = quote_swap(1, 1, 10);
        assert!(matches!(result, Err(PoolError::InsufficientLiquidity { .. })));

        let result = quote_swap(units(1), 0, units(1));
        assert!(matches!(result, Err(PoolError::InsufficientLiquidity { .. })));
    }

    #[test]
    fn test_spot_price() {
        assert_eq!(spot_price(units(1), units(3000)).unwrap(), units(3000));
        assert_eq!(spot_price(units(3000), units(1)).unwrap(), 333_333_333_333_333);
        assert_eq!(spot_price(units(1000), units(3)).unwrap(), 3_000_000_000_000_000);
        assert_eq!(
            spot_price(0, units(1)),
            Err(PoolError::Arithmetic(MathError::DivisionByZero))
        );
    }
}
