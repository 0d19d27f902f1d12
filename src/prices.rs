//! Prices

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money, MoneyError,
    iso::{Currency, EUR},
};
use thiserror::Error;

/// A monetary amount. The storefront only ever trades in euros.
pub type Price = Money<'static, Currency>;

/// Errors raised by minor-unit price arithmetic.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// Minor-unit arithmetic overflowed `i64`.
    #[error("price arithmetic overflowed")]
    Overflow,

    /// A decimal amount could not be represented in whole cents.
    #[error("amount {0} cannot be represented in minor units")]
    NotRepresentable(Decimal),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// A configured amount is not of the form `AMOUNT [EUR]`.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// A configured amount names a currency other than EUR.
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// A configured rate is neither `19%` nor `0.19`.
    #[error("invalid percentage: {0}")]
    InvalidPercentage(String),
}

/// Create a euro amount from cents.
pub fn eur(minor: i64) -> Price {
    Money::from_minor(minor, EUR)
}

/// Zero euros.
pub fn zero() -> Price {
    eur(0)
}

/// Multiply a price by a quantity without silently wrapping.
///
/// # Errors
///
/// Returns [`PriceError::Overflow`] if the product does not fit in `i64` cents.
pub fn checked_times(price: &Price, quantity: u32) -> Result<Price, PriceError> {
    price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .map(|minor| Money::from_minor(minor, price.currency()))
        .ok_or(PriceError::Overflow)
}

/// Convert a decimal major-unit amount (e.g. `45.5`) into a euro price.
///
/// Sub-cent fractions are rounded half away from zero.
///
/// # Errors
///
/// Returns [`PriceError::NotRepresentable`] if the amount overflows `i64` cents.
pub fn from_decimal(amount: Decimal) -> Result<Price, PriceError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
        .map(eur)
        .ok_or(PriceError::NotRepresentable(amount))
}

/// Convert a price into a decimal major-unit amount (e.g. `45.50`).
pub fn to_decimal(price: &Price) -> Decimal {
    Decimal::new(price.to_minor_units(), 2)
}

/// Parse a configured amount such as `"45.00 EUR"` or `"45.00"`.
///
/// # Errors
///
/// Returns [`PriceError::InvalidPrice`] for malformed input and
/// [`PriceError::UnsupportedCurrency`] for any currency but EUR.
pub fn parse_price(s: &str) -> Result<Price, PriceError> {
    let mut parts = s.split_whitespace();

    let amount = parts
        .next()
        .ok_or_else(|| PriceError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| PriceError::InvalidPrice(s.to_string()))?;

    match parts.next() {
        None | Some("EUR") => {}
        Some(other) => return Err(PriceError::UnsupportedCurrency(other.to_string())),
    }

    if parts.next().is_some() {
        return Err(PriceError::InvalidPrice(s.to_string()));
    }

    from_decimal(amount)
}

/// Parse a rate written as percent points (`"19%"`) or a fraction (`"0.19"`).
///
/// # Errors
///
/// Returns [`PriceError::InvalidPercentage`] if the value does not parse.
pub fn parse_percentage(s: &str) -> Result<Percentage, PriceError> {
    let trimmed = s.trim();
    let invalid = || PriceError::InvalidPercentage(s.to_string());

    let fraction = match trimmed.strip_suffix('%') {
        Some(points) => points
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| invalid())?
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(invalid)?,
        None => trimmed.parse::<Decimal>().map_err(|_err| invalid())?,
    };

    Ok(Percentage::from(fraction))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn eur_builds_minor_units() {
        let price = eur(4500);

        assert_eq!(price.to_minor_units(), 4500);
        assert_eq!(price.currency(), EUR);
    }

    #[test]
    fn checked_times_multiplies() -> TestResult {
        assert_eq!(checked_times(&eur(850), 3)?, eur(2550));
        assert_eq!(checked_times(&eur(850), 0)?, zero());

        Ok(())
    }

    #[test]
    fn checked_times_keeps_currency() -> TestResult {
        let price = Money::from_minor(100, GBP);

        assert_eq!(checked_times(&price, 2)?.currency(), GBP);

        Ok(())
    }

    #[test]
    fn checked_times_overflow_errors() {
        assert_eq!(
            checked_times(&eur(i64::MAX), 2),
            Err(PriceError::Overflow)
        );
    }

    #[test]
    fn decimal_conversion_rounds_half_away_from_zero() -> TestResult {
        assert_eq!(from_decimal(Decimal::new(45_005, 3))?, eur(4501));
        assert_eq!(from_decimal(Decimal::new(-45_005, 3))?, eur(-4501));
        assert_eq!(to_decimal(&eur(11_722)), Decimal::new(11_722, 2));

        Ok(())
    }

    #[test]
    fn parses_configured_prices() -> TestResult {
        assert_eq!(parse_price("5.00 EUR")?, eur(500));
        assert_eq!(parse_price("45")?, eur(4500));
        assert_eq!(
            parse_price("5.00 GBP"),
            Err(PriceError::UnsupportedCurrency("GBP".to_string()))
        );
        assert!(matches!(
            parse_price("five euros"),
            Err(PriceError::InvalidPrice(_))
        ));

        Ok(())
    }

    #[test]
    fn parses_percent_points_and_fractions() -> TestResult {
        let points = parse_percentage("19%")? * Decimal::ONE;
        let fraction = parse_percentage("0.19")? * Decimal::ONE;

        assert_eq!(points, Decimal::new(19, 2));
        assert_eq!(fraction, Decimal::new(19, 2));
        assert!(parse_percentage("nineteen").is_err());

        Ok(())
    }

    #[test]
    fn decimal_conversion_overflow_errors() {
        let result = from_decimal(Decimal::MAX);

        assert!(matches!(result, Err(PriceError::NotRepresentable(_))));
    }
}
