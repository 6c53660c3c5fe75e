// src/math.rs
//! Constant-product AMM pricing.
//!
//! Every function is pure and works on raw integer units carried as
//! [`Decimal`]. Out-of-range inputs are rejected, never clamped.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::shared::errors::MathError;

pub const BPS_DENOMINATOR: u32 = 10_000;
pub const MAX_PRICE_IMPACT_BPS: u32 = 10_000;

const BPS: Decimal = dec!(10000);

fn check_fee(fee_bps: u32) -> Result<(), MathError> {
    if fee_bps >= BPS_DENOMINATOR {
        return Err(MathError::InvalidFee(fee_bps));
    }
    Ok(())
}

fn check_non_negative(amount: Decimal, what: &str) -> Result<(), MathError> {
    if amount < Decimal::ZERO {
        return Err(MathError::InvalidAmount(format!("{} must not be negative: {}", what, amount)));
    }
    Ok(())
}

fn check_positive(amount: Decimal, what: &str) -> Result<(), MathError> {
    if amount <= Decimal::ZERO {
        return Err(MathError::InvalidAmount(format!("{} must be positive: {}", what, amount)));
    }
    Ok(())
}

/// `a * b / c`, falling back to `a / c * b` when the product does not fit.
fn mul_div(a: Decimal, b: Decimal, c: Decimal) -> Result<Decimal, MathError> {
    if c.is_zero() {
        return Err(MathError::InvalidAmount("division by zero".to_string()));
    }
    match a.checked_mul(b) {
        Some(product) => product.checked_div(c).ok_or(MathError::Overflow),
        None => a
            .checked_div(c)
            .and_then(|ratio| ratio.checked_mul(b))
            .ok_or(MathError::Overflow),
    }
}

/// `amount * (1 - fee_bps / 10000)`
pub fn amount_after_fee(amount: Decimal, fee_bps: u32) -> Result<Decimal, MathError> {
    check_fee(fee_bps)?;
    check_non_negative(amount, "amount")?;
    mul_div(amount, Decimal::from(BPS_DENOMINATOR - fee_bps), BPS)
}

/// Output of swapping `amount_in` into a constant-product pool.
///
/// `amount_in_with_fee * reserve_out / (reserve_in + amount_in_with_fee)`.
/// The result is always strictly below `reserve_out`.
pub fn get_amount_out(
    amount_in: Decimal,
    reserve_in: Decimal,
    reserve_out: Decimal,
    fee_bps: u32,
) -> Result<Decimal, MathError> {
    check_fee(fee_bps)?;
    check_positive(amount_in, "amount_in")?;
    check_positive(reserve_in, "reserve_in")?;
    check_positive(reserve_out, "reserve_out")?;

    let amount_in_with_fee = amount_after_fee(amount_in, fee_bps)?;
    let denominator = reserve_in
        .checked_add(amount_in_with_fee)
        .ok_or(MathError::Overflow)?;
    let amount_out = mul_div(amount_in_with_fee, reserve_out, denominator)?;

    if amount_out >= reserve_out {
        return Err(MathError::InsufficientLiquidity(format!(
            "output {} would drain reserve {}",
            amount_out, reserve_out
        )));
    }
    Ok(amount_out)
}

/// Input required to receive `amount_out`, rounded against the trader.
///
/// Inverts the product formula, adds one smallest unit for truncation and
/// grosses the result up for the fee, so that
/// `get_amount_in(get_amount_out(x)) >= x`.
pub fn get_amount_in(
    amount_out: Decimal,
    reserve_in: Decimal,
    reserve_out: Decimal,
    fee_bps: u32,
) -> Result<Decimal, MathError> {
    check_fee(fee_bps)?;
    check_positive(amount_out, "amount_out")?;
    check_positive(reserve_in, "reserve_in")?;
    check_positive(reserve_out, "reserve_out")?;
    if amount_out >= reserve_out {
        return Err(MathError::InsufficientLiquidity(format!(
            "requested {} but reserve is {}",
            amount_out, reserve_out
        )));
    }

    let remaining = reserve_out - amount_out;
    let before_fee = mul_div(reserve_in, amount_out, remaining)?
        .checked_add(Decimal::ONE)
        .ok_or(MathError::Overflow)?;
    mul_div(before_fee, BPS, Decimal::from(BPS_DENOMINATOR - fee_bps))
}

/// Price impact in basis points of trading `amount_in` for `amount_out`
/// against the pre-trade spot price `reserve_out / reserve_in`.
pub fn calculate_price_impact(
    amount_in: Decimal,
    amount_out: Decimal,
    reserve_in: Decimal,
    reserve_out: Decimal,
) -> Result<u32, MathError> {
    if reserve_in <= Decimal::ZERO || reserve_out <= Decimal::ZERO {
        return Ok(MAX_PRICE_IMPACT_BPS);
    }
    check_positive(amount_in, "amount_in")?;
    check_non_negative(amount_out, "amount_out")?;

    let spot_price = reserve_out.checked_div(reserve_in).ok_or(MathError::Overflow)?;
    let execution_price = amount_out.checked_div(amount_in).ok_or(MathError::Overflow)?;
    if execution_price >= spot_price {
        return Ok(0);
    }

    let impact = mul_div(spot_price - execution_price, BPS, spot_price)?.floor();
    let impact = impact.max(Decimal::ZERO).min(Decimal::from(MAX_PRICE_IMPACT_BPS));
    impact.to_u32().ok_or(MathError::Overflow)
}

/// Minimum acceptable output after applying a slippage tolerance
pub fn calculate_min_output(amount: Decimal, slippage_tolerance_bps: u32) -> Result<Decimal, MathError> {
    if slippage_tolerance_bps > BPS_DENOMINATOR {
        return Err(MathError::InvalidTolerance(slippage_tolerance_bps));
    }
    check_non_negative(amount, "amount")?;
    mul_div(amount, Decimal::from(BPS_DENOMINATOR - slippage_tolerance_bps), BPS)
}

/// Maximum acceptable input after applying a slippage tolerance
pub fn calculate_max_input(amount: Decimal, slippage_tolerance_bps: u32) -> Result<Decimal, MathError> {
    if slippage_tolerance_bps > BPS_DENOMINATOR {
        return Err(MathError::InvalidTolerance(slippage_tolerance_bps));
    }
    check_non_negative(amount, "amount")?;
    mul_div(amount, Decimal::from(BPS_DENOMINATOR + slippage_tolerance_bps), BPS)
}

/// Fee charged on `amount` at `fee_bps`
pub fn calculate_fee(amount: Decimal, fee_bps: u32) -> Result<Decimal, MathError> {
    check_fee(fee_bps)?;
    check_non_negative(amount, "amount")?;
    mul_div(amount, Decimal::from(fee_bps), BPS)
}

/// Lift a raw on-chain amount into the math domain
pub fn from_raw_units(amount: u128) -> Result<Decimal, MathError> {
    Decimal::from_u128(amount).ok_or(MathError::Overflow)
}

/// Truncate to whole smallest units
pub fn to_raw_units(amount: Decimal) -> Result<u128, MathError> {
    check_non_negative(amount, "amount")?;
    amount.floor().to_u128().ok_or(MathError::Overflow)
}

/// Raw units scaled down by the coin decimals, e.g. lamports -> SOL
pub fn to_display_units(amount: u128, decimals: u8) -> Result<Decimal, MathError> {
    let raw = i128::try_from(amount).map_err(|_| MathError::Overflow)?;
    Decimal::try_from_i128_with_scale(raw, decimals as u32).map_err(|_| MathError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_out_reference_example() {
        let out = get_amount_out(dec!(100), dec!(1000), dec!(2000), 30).unwrap();
        assert!(out >= dec!(180) && out <= dec!(182), "got {}", out);
    }

    #[test]
    fn test_fee_helpers() {
        assert_eq!(calculate_fee(dec!(1000), 30).unwrap(), dec!(3));
        assert_eq!(amount_after_fee(dec!(1000), 30).unwrap(), dec!(997));
        assert_eq!(calculate_min_output(dec!(1000), 50).unwrap(), dec!(995));
        assert_eq!(calculate_max_input(dec!(1000), 50).unwrap(), dec!(1005));
    }

    #[test]
    fn test_amount_out_rejects_invalid_inputs() {
        assert!(matches!(get_amount_out(dec!(0), dec!(1000), dec!(1000), 30), Err(MathError::InvalidAmount(_))));
        assert!(matches!(get_amount_out(dec!(-1), dec!(1000), dec!(1000), 30), Err(MathError::InvalidAmount(_))));
        assert!(matches!(get_amount_out(dec!(10), dec!(0), dec!(1000), 30), Err(MathError::InvalidAmount(_))));
        assert!(matches!(get_amount_out(dec!(10), dec!(1000), dec!(0), 30), Err(MathError::InvalidAmount(_))));
        assert_eq!(get_amount_out(dec!(10), dec!(1000), dec!(1000), 10_000), Err(MathError::InvalidFee(10_000)));
    }

    #[test]
    fn test_amount_out_strictly_increasing_and_below_reserve() {
        let reserve_in = dec!(1000000);
        let reserve_out = dec!(5000000);
        for fee in [0u32, 5, 30, 100, 9_999] {
            let mut previous = Decimal::ZERO;
            let mut amount = dec!(1);
            while amount < dec!(100000000000) {
                let out = get_amount_out(amount, reserve_in, reserve_out, fee).unwrap();
                assert!(out > previous, "fee {} amount {}: {} <= {}", fee, amount, out, previous);
                assert!(out < reserve_out);
                previous = out;
                amount *= dec!(3);
            }
        }
    }

    #[test]
    fn test_amount_in_never_under_quotes() {
        let pools = [
            (dec!(1000), dec!(2000)),
            (dec!(1000000000), dec!(3000000)),
            (dec!(7), dec!(1000000000000)),
        ];
        for (reserve_in, reserve_out) in pools {
            for fee in [0u32, 25, 30, 300] {
                for x in [dec!(1), dec!(13), dec!(999), dec!(250000)] {
                    let out = get_amount_out(x, reserve_in, reserve_out, fee).unwrap();
                    let back = get_amount_in(out, reserve_in, reserve_out, fee).unwrap();
                    assert!(back >= x, "x={} back={} ({}, {}, {})", x, back, reserve_in, reserve_out, fee);
                }
            }
        }
    }

    #[test]
    fn test_amount_in_rejects_draining_pool() {
        assert!(matches!(
            get_amount_in(dec!(2000), dec!(1000), dec!(2000), 30),
            Err(MathError::InsufficientLiquidity(_))
        ));
        assert!(matches!(get_amount_in(dec!(0), dec!(1000), dec!(2000), 30), Err(MathError::InvalidAmount(_))));
    }

    #[test]
    fn test_price_impact_zero_when_execution_not_worse() {
        assert_eq!(calculate_price_impact(dec!(100), dec!(200), dec!(1000), dec!(2000)).unwrap(), 0);
        assert_eq!(calculate_price_impact(dec!(100), dec!(250), dec!(1000), dec!(2000)).unwrap(), 0);
    }

    #[test]
    fn test_price_impact_max_for_empty_reserves() {
        assert_eq!(calculate_price_impact(dec!(100), dec!(50), dec!(0), dec!(2000)).unwrap(), MAX_PRICE_IMPACT_BPS);
        assert_eq!(calculate_price_impact(dec!(100), dec!(50), dec!(1000), dec!(0)).unwrap(), MAX_PRICE_IMPACT_BPS);
    }

    #[test]
    fn test_price_impact_non_decreasing_with_size() {
        let reserve_in = dec!(10000000);
        let reserve_out = dec!(20000000);
        let mut previous = 0;
        let mut amount = dec!(10);
        while amount < dec!(1000000000) {
            let out = get_amount_out(amount, reserve_in, reserve_out, 30).unwrap();
            let impact = calculate_price_impact(amount, out, reserve_in, reserve_out).unwrap();
            assert!(impact >= previous);
            assert!(impact <= MAX_PRICE_IMPACT_BPS);
            previous = impact;
            amount *= dec!(2);
        }
        assert!(previous > 9_000);
    }

    #[test]
    fn test_tolerance_out_of_range_fails() {
        assert_eq!(calculate_min_output(dec!(1000), 10_001), Err(MathError::InvalidTolerance(10_001)));
        assert_eq!(calculate_max_input(dec!(1000), 10_001), Err(MathError::InvalidTolerance(10_001)));
        assert!(calculate_min_output(dec!(-1), 50).is_err());
        assert_eq!(calculate_min_output(dec!(1000), 10_000).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_large_reserves_fall_back_without_overflow() {
        // 10^27 * 10^27 does not fit in a Decimal mantissa
        let reserve = dec!(1000000000000000000000000000);
        let out = get_amount_out(dec!(1000000000000000000000000), reserve, reserve, 30).unwrap();
        assert!(out > Decimal::ZERO && out < reserve);
    }

    #[test]
    fn test_raw_unit_conversions() {
        assert_eq!(to_raw_units(dec!(181.99)).unwrap(), 181);
        assert!(to_raw_units(dec!(-1)).is_err());
        assert_eq!(from_raw_units(42).unwrap(), dec!(42));
        assert!(from_raw_units(u128::MAX).is_err());
        assert_eq!(to_display_units(1_500_000, 6).unwrap(), dec!(1.5));
    }
}
