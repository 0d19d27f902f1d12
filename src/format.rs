//! Presentation formatting
//!
//! Amounts are formatted exactly once, at the boundary, from integer cents.
//! The checkout summary, the HTML invoice and the PDF invoice all go through
//! [`format_money`], which is what keeps their figures identical.

use decimal_percentage::Percentage;
use jiff::civil::Date;
use rust_decimal::Decimal;
use rusty_money::{Formatter, Params, Position};

use crate::{locale::Locale, prices::Price};

/// Thousands grouping, enough for every `i64` amount of cents.
const DIGIT_GROUPS: &[usize] = &[3, 3, 3, 3, 3, 3];

const SYMBOL_AFTER: &[Position] = &[
    Position::Sign,
    Position::Amount,
    Position::Space,
    Position::Symbol,
];

const SYMBOL_BEFORE: &[Position] = &[Position::Sign, Position::Symbol, Position::Amount];

/// Formatter parameters for a locale.
fn money_params(locale: Locale, symbol: &'static str) -> Params<'static> {
    let params = Params {
        separator_pattern: DIGIT_GROUPS,
        rounding: Some(2),
        symbol: Some(symbol),
        ..Params::default()
    };

    match locale {
        Locale::De => Params {
            digit_separator: '.',
            exponent_separator: ',',
            positions: SYMBOL_AFTER,
            ..params
        },
        Locale::En => Params {
            positions: SYMBOL_BEFORE,
            ..params
        },
    }
}

/// Format a euro amount for the given locale.
///
/// German places the symbol after the amount (`1.234,56 €`), English before it
/// (`€1,234.56`). Both always show two decimal places.
pub fn format_money(price: &Price, locale: Locale) -> String {
    Formatter::money(price, money_params(locale, price.currency().symbol))
}

/// Format a percentage as percent points, e.g. `19 %` (de) or `19%` (en).
pub fn format_percent(percent: Percentage, locale: Locale) -> String {
    let points = ((percent * Decimal::ONE) * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .normalize();

    match locale {
        Locale::De => format!("{} %", points.to_string().replace('.', ",")),
        Locale::En => format!("{points}%"),
    }
}

/// Format an order date: `dd.mm.yyyy` (de) or ISO `yyyy-mm-dd` (en).
pub fn format_date(date: Date, locale: Locale) -> String {
    match locale {
        Locale::De => date.strftime("%d.%m.%Y").to_string(),
        Locale::En => date.strftime("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use crate::prices::eur;

    use super::*;

    #[test]
    fn german_places_symbol_after_amount() {
        assert_eq!(format_money(&eur(11_722), Locale::De), "117,22 €");
        assert_eq!(format_money(&eur(123_456_789), Locale::De), "1.234.567,89 €");
    }

    #[test]
    fn english_places_symbol_before_amount() {
        assert_eq!(format_money(&eur(11_722), Locale::En), "€117.22");
        assert_eq!(format_money(&eur(123_456_789), Locale::En), "€1,234,567.89");
    }

    #[test]
    fn small_and_negative_amounts() {
        assert_eq!(format_money(&eur(0), Locale::En), "€0.00");
        assert_eq!(format_money(&eur(5), Locale::De), "0,05 €");
        assert_eq!(format_money(&eur(-500), Locale::En), "-€5.00");
        assert_eq!(format_money(&eur(-100_000), Locale::De), "-1.000,00 €");
    }

    #[test]
    fn extreme_amounts_do_not_overflow() {
        let formatted = format_money(&eur(i64::MIN), Locale::En);

        assert!(formatted.starts_with("-€92,233,720,368,547,758"));
    }

    #[test]
    fn percent_points() -> TestResult {
        let vat = Percentage::try_from("0.19")?;

        assert_eq!(format_percent(vat, Locale::En), "19%");
        assert_eq!(format_percent(vat, Locale::De), "19 %");

        let reduced = Percentage::try_from("0.075")?;

        assert_eq!(format_percent(reduced, Locale::De), "7,5 %");

        Ok(())
    }

    #[test]
    fn dates_per_locale() {
        let day = date(2024, 6, 5);

        assert_eq!(format_date(day, Locale::De), "05.06.2024");
        assert_eq!(format_date(day, Locale::En), "2024-06-05");
    }

    #[test]
    fn thousands_boundaries() {
        assert_eq!(format_money(&eur(99_999), Locale::De), "999,99 €");
        assert_eq!(format_money(&eur(100_000), Locale::De), "1.000,00 €");
        assert_eq!(format_money(&eur(10_000_000), Locale::En), "€100,000.00");
        assert_eq!(format_money(&eur(100_000_000_000), Locale::En), "€1,000,000,000.00");
    }
}
