//! Locales
//!
//! The storefront ships in German and English. Every user-facing label the
//! pricing and invoicing code emits lives in [`Labels`], so switching locale
//! never touches a number.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported display locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// German
    #[default]
    De,

    /// English
    En,
}

/// Error returned when parsing an unsupported locale tag.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "de" | "de-de" | "de_de" => Ok(Locale::De),
            "en" | "en-gb" | "en-us" | "en_gb" | "en_us" => Ok(Locale::En),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Locale {
    /// Two-letter language tag.
    pub fn tag(self) -> &'static str {
        match self {
            Locale::De => "de",
            Locale::En => "en",
        }
    }

    /// Labels for this locale.
    pub fn labels(self) -> &'static Labels {
        match self {
            Locale::De => &GERMAN,
            Locale::En => &ENGLISH,
        }
    }
}

/// Localized strings for the checkout summary and invoice.
#[derive(Debug)]
pub struct Labels {
    /// Document title
    pub invoice: &'static str,
    /// "Order number"
    pub order_number: &'static str,
    /// "Date"
    pub date: &'static str,
    /// Heading above the customer block
    pub bill_to: &'static str,
    /// Line-item column: description
    pub description: &'static str,
    /// Line-item column: quantity
    pub quantity: &'static str,
    /// Line-item column: unit price
    pub unit_price: &'static str,
    /// Line-item column: line total
    pub line_total: &'static str,
    /// "Subtotal"
    pub subtotal: &'static str,
    /// VAT label prefix, rendered with the rate appended
    pub vat: &'static str,
    /// "Delivery"
    pub delivery: &'static str,
    /// Cash-on-delivery surcharge label
    pub cod_fee: &'static str,
    /// "Total"
    pub total: &'static str,
    /// Delivery text for pickup
    pub delivery_free: &'static str,
    /// Delivery text for delivery without an agreed fee
    pub delivery_by_arrangement: &'static str,
    /// Heading of the payment block
    pub payment_information: &'static str,
    /// "Bank"
    pub bank: &'static str,
    /// "IBAN"
    pub iban: &'static str,
    /// "BIC"
    pub bic: &'static str,
    /// Payment reference label
    pub reference: &'static str,
    /// Bank transfer instruction sentence
    pub bank_transfer_notice: &'static str,
    /// Cash on delivery notice
    pub cod_notice: &'static str,
    /// Credit card notice
    pub credit_card_notice: &'static str,
    /// Shown for a cultivar without a price group
    pub price_on_request: &'static str,
    /// Shown when a price group has no usable band
    pub price_not_available: &'static str,
    /// Age suffix, e.g. "years"
    pub years: &'static str,
    /// "VAT ID"
    pub vat_id: &'static str,
    /// Closing line
    pub thank_you: &'static str,
}

static GERMAN: Labels = Labels {
    invoice: "Rechnung",
    order_number: "Bestellnummer",
    date: "Datum",
    bill_to: "Rechnungsadresse",
    description: "Beschreibung",
    quantity: "Menge",
    unit_price: "Einzelpreis",
    line_total: "Gesamt",
    subtotal: "Zwischensumme",
    vat: "MwSt.",
    delivery: "Lieferung",
    cod_fee: "Nachnahmegebühr",
    total: "Gesamtbetrag",
    delivery_free: "kostenlos",
    delivery_by_arrangement: "nach Vereinbarung",
    payment_information: "Zahlungsinformationen",
    bank: "Bank",
    iban: "IBAN",
    bic: "BIC",
    reference: "Verwendungszweck",
    bank_transfer_notice: "Bitte überweisen Sie den Gesamtbetrag auf folgendes Konto:",
    cod_notice: "Die Zahlung erfolgt bar bei Lieferung.",
    credit_card_notice: "Die Zahlung wurde bereits per Kreditkarte abgewickelt.",
    price_on_request: "Preis auf Anfrage",
    price_not_available: "Preis nicht verfügbar",
    years: "Jahre",
    vat_id: "USt-IdNr.",
    thank_you: "Vielen Dank für Ihre Bestellung!",
};

static ENGLISH: Labels = Labels {
    invoice: "Invoice",
    order_number: "Order number",
    date: "Date",
    bill_to: "Bill to",
    description: "Description",
    quantity: "Quantity",
    unit_price: "Unit price",
    line_total: "Total",
    subtotal: "Subtotal",
    vat: "VAT",
    delivery: "Delivery",
    cod_fee: "Cash on delivery fee",
    total: "Total amount",
    delivery_free: "free",
    delivery_by_arrangement: "by arrangement",
    payment_information: "Payment information",
    bank: "Bank",
    iban: "IBAN",
    bic: "BIC",
    reference: "Reference",
    bank_transfer_notice: "Please transfer the total amount to the following account:",
    cod_notice: "Payment is due in cash on delivery.",
    credit_card_notice: "Payment has already been processed by credit card.",
    price_on_request: "Price on request",
    price_not_available: "Price not available",
    years: "years",
    vat_id: "VAT ID",
    thank_you: "Thank you for your order!",
};

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_tags_case_insensitively() -> TestResult {
        assert_eq!("de".parse::<Locale>()?, Locale::De);
        assert_eq!("EN".parse::<Locale>()?, Locale::En);
        assert_eq!("en-GB".parse::<Locale>()?, Locale::En);

        Ok(())
    }

    #[test]
    fn rejects_unknown_tags() {
        assert_eq!(
            "fr".parse::<Locale>(),
            Err(UnknownLocale("fr".to_string()))
        );
    }

    #[test]
    fn column_headers_differ_per_locale() {
        let de = Locale::De.labels();
        let en = Locale::En.labels();

        assert_eq!(de.description, "Beschreibung");
        assert_eq!(en.description, "Description");
        assert_ne!(de.unit_price, en.unit_price);
    }

    #[test]
    fn display_uses_tag() {
        assert_eq!(Locale::De.to_string(), "de");
        assert_eq!(Locale::En.to_string(), "en");
    }
}
