//! Order totals
//!
//! Sums pre-resolved line prices and derives VAT and fees. The calculator
//! never consults the price table; it only trusts the unit prices it is given.
//!
//! VAT is exclusive: line prices are net, VAT is added on top of the subtotal
//! and rounded half away from zero to the cent.

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    items::CartLineItem,
    prices::{Price, PriceError, eur, zero},
};

/// Errors raised while computing totals.
#[derive(Debug, Error, PartialEq)]
pub enum TotalsError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped price arithmetic error.
    #[error(transparent)]
    Price(#[from] PriceError),
}

impl From<rusty_money::MoneyError> for TotalsError {
    fn from(err: rusty_money::MoneyError) -> Self {
        TotalsError::Price(PriceError::Money(err))
    }
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Collected at the nursery.
    Pickup,

    /// Delivered; the fee is agreed out of band.
    Delivery,
}

/// How the order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery, carries a flat surcharge.
    Cod,

    /// Bank transfer with the order id as reference.
    BankTransfer,

    /// Already processed by card.
    CreditCard,

    /// A stored value this version does not know.
    #[serde(other)]
    Unknown,
}

/// Error returned when parsing an unknown delivery or payment method.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownMethod {
    /// "delivery method" or "payment method"
    pub kind: &'static str,
    /// Rejected input
    pub value: String,
}

impl FromStr for DeliveryMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pickup" => Ok(DeliveryMethod::Pickup),
            "delivery" => Ok(DeliveryMethod::Delivery),
            other => Err(UnknownMethod {
                kind: "delivery method",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cod" => Ok(PaymentMethod::Cod),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "credit_card" => Ok(PaymentMethod::CreditCard),
            other => Err(UnknownMethod {
                kind: "payment method",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeliveryMethod::Pickup => "pickup",
            DeliveryMethod::Delivery => "delivery",
        })
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Unknown => "unknown",
        })
    }
}

/// Tax rate and surcharges applied on top of the subtotal.
#[derive(Debug, Clone, Copy)]
pub struct TotalsPolicy {
    /// VAT rate as a fraction (0.19)
    pub vat_rate: Percentage,

    /// Flat cash-on-delivery surcharge
    pub cod_fee: Price,
}

impl Default for TotalsPolicy {
    /// German standard VAT and a 5 EUR cash-on-delivery surcharge.
    fn default() -> Self {
        Self {
            vat_rate: Percentage::from(Decimal::new(19, 2)),
            cod_fee: eur(500),
        }
    }
}

/// Computed totals of an order.
#[derive(Debug, Clone, Copy)]
pub struct OrderTotals {
    /// Sum of all line totals (net)
    pub subtotal: Price,

    /// VAT rate applied
    pub vat_rate: Percentage,

    /// VAT on the subtotal
    pub vat_amount: Price,

    /// Delivery fee; zero for pickup
    pub delivery_fee: Price,

    /// Cash-on-delivery surcharge; zero for other payment methods
    pub cod_fee: Price,

    /// Amount due
    pub total: Price,
}

/// Order total calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalsCalculator {
    policy: TotalsPolicy,
}

impl TotalsCalculator {
    /// Create a calculator for a policy.
    pub fn new(policy: TotalsPolicy) -> Self {
        Self { policy }
    }

    /// The policy in use.
    pub fn policy(&self) -> &TotalsPolicy {
        &self.policy
    }

    /// Compute totals with no negotiated delivery fee.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if any amount overflows.
    pub fn compute(
        &self,
        items: &[CartLineItem],
        delivery: DeliveryMethod,
        payment: PaymentMethod,
    ) -> Result<OrderTotals, TotalsError> {
        self.compute_with_delivery_fee(items, delivery, payment, zero())
    }

    /// Compute totals, charging `negotiated_fee` when the order is delivered.
    ///
    /// The fee is ignored for pickup.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if any amount overflows or currencies differ.
    pub fn compute_with_delivery_fee(
        &self,
        items: &[CartLineItem],
        delivery: DeliveryMethod,
        payment: PaymentMethod,
        negotiated_fee: Price,
    ) -> Result<OrderTotals, TotalsError> {
        let subtotal = subtotal(items)?;

        let vat_minor = percent_of_minor(&self.policy.vat_rate, subtotal.to_minor_units())?;
        let vat_amount = Money::from_minor(vat_minor, subtotal.currency());

        let delivery_fee = match delivery {
            DeliveryMethod::Pickup => zero(),
            DeliveryMethod::Delivery => negotiated_fee,
        };

        let cod_fee = match payment {
            PaymentMethod::Cod => self.policy.cod_fee,
            PaymentMethod::BankTransfer | PaymentMethod::CreditCard | PaymentMethod::Unknown => {
                zero()
            }
        };

        let total_minor = [vat_amount, delivery_fee, cod_fee]
            .iter()
            .try_fold(subtotal.to_minor_units(), |acc, amount| {
                acc.checked_add(amount.to_minor_units())
            })
            .ok_or(PriceError::Overflow)?;

        // Money::add also rejects mixed currencies.
        subtotal.add(vat_amount)?.add(delivery_fee)?.add(cod_fee)?;

        Ok(OrderTotals {
            subtotal,
            vat_rate: self.policy.vat_rate,
            vat_amount,
            delivery_fee,
            cod_fee,
            total: Money::from_minor(total_minor, subtotal.currency()),
        })
    }
}

/// Compute totals under the default German policy.
///
/// # Errors
///
/// Returns a [`TotalsError`] if any amount overflows.
pub fn compute_totals(
    items: &[CartLineItem],
    delivery: DeliveryMethod,
    payment: PaymentMethod,
) -> Result<OrderTotals, TotalsError> {
    TotalsCalculator::default().compute(items, delivery, payment)
}

/// Sum of all line totals. An empty list sums to zero euros.
///
/// # Errors
///
/// Returns a [`PriceError`] on overflow or mixed currencies.
pub fn subtotal(items: &[CartLineItem]) -> Result<Price, PriceError> {
    items.iter().try_fold(zero(), |acc, item| {
        let line = item.line_total()?;

        acc.to_minor_units()
            .checked_add(line.to_minor_units())
            .ok_or(PriceError::Overflow)?;

        Ok(acc.add(line)?)
    })
}

/// Apply a percentage to minor units, rounding half away from zero.
fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, TotalsError> {
    let minor = Decimal::from_i64(minor).ok_or(TotalsError::PercentConversion)?;

    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(TotalsError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(TotalsError::PercentConversion)
}
