//! Orders
//!
//! A completed order freezes its line items and totals. The JSON payload is
//! the contract with order storage; reading it back carries the stored totals
//! over verbatim so a regenerated invoice shows what checkout showed.

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::Cart,
    items::{CartLineItem, LineItemKind},
    prices::{PriceError, from_decimal, to_decimal},
    pricing::AgeYears,
    totals::{
        DeliveryMethod, OrderTotals, PaymentMethod, TotalsCalculator, TotalsError, TotalsPolicy,
    },
};

/// Order errors
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout must not proceed without items.
    #[error("an order needs at least one item")]
    EmptyOrder,

    /// A payload line has quantity zero.
    #[error("item {0} has quantity zero")]
    ZeroQuantity(String),

    /// A plant line in the payload is missing its age.
    #[error("plant item {0} has no age")]
    MissingAge(String),

    /// Wrapped totals error.
    #[error(transparent)]
    Totals(#[from] TotalsError),

    /// Wrapped price conversion error.
    #[error(transparent)]
    Price(#[from] PriceError),

    /// JSON encoding or decoding failed.
    #[error("invalid order JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Order number and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHeader {
    /// Order number; also the bank transfer reference
    pub id: String,

    /// Order date
    pub date: Date,
}

/// Billing customer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Full name
    pub name: String,

    /// Street and number
    pub street: String,

    /// Postal code
    pub postal_code: String,

    /// City
    pub city: String,

    /// Country, when not domestic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Email address
    pub email: String,

    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone)]
pub struct Order {
    /// Order number and date
    pub header: OrderHeader,

    /// Billing customer
    pub customer: Customer,

    /// Frozen line items
    pub items: Vec<CartLineItem>,

    /// Frozen totals
    pub totals: OrderTotals,

    /// Payment method
    pub payment: PaymentMethod,

    /// Delivery method
    pub delivery: DeliveryMethod,
}

impl Order {
    /// Assemble an order from already computed totals.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyOrder`] if `items` is empty.
    pub fn new(
        header: OrderHeader,
        customer: Customer,
        items: Vec<CartLineItem>,
        totals: OrderTotals,
        payment: PaymentMethod,
        delivery: DeliveryMethod,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        Ok(Self {
            header,
            customer,
            items,
            totals,
            payment,
            delivery,
        })
    }

    /// Place an order from a cart, computing its totals once.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderError`] if the cart is empty or totals overflow.
    pub fn place(
        header: OrderHeader,
        customer: Customer,
        cart: Cart,
        delivery: DeliveryMethod,
        payment: PaymentMethod,
        calculator: &TotalsCalculator,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let totals = calculator.compute(cart.items(), delivery, payment)?;

        Self::new(header, customer, cart.into_items(), totals, payment, delivery)
    }

    /// File name of the PDF invoice for this order.
    ///
    /// Anything in the order id other than ASCII letters, digits, `-` and `_`
    /// becomes `_`, so the name never leaves the directory it is written to.
    pub fn invoice_file_name(&self) -> String {
        let id = self
            .header
            .id
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') {
                    ch
                } else {
                    '_'
                }
            })
            .collect::<String>();

        format!("invoice_{id}.pdf")
    }

    /// Wire payload for the order-creation endpoint.
    pub fn to_payload(&self) -> OrderPayload {
        OrderPayload {
            order_number: self.header.id.clone(),
            order_date: self.header.date,
            customer: self.customer.clone(),
            delivery: DeliveryPayload {
                method: self.delivery,
            },
            payment: PaymentPayload {
                method: self.payment,
            },
            subtotal: to_decimal(&self.totals.subtotal),
            shipping: to_decimal(&self.totals.delivery_fee),
            vat_amount: to_decimal(&self.totals.vat_amount),
            cod_fee: to_decimal(&self.totals.cod_fee),
            total_amount: to_decimal(&self.totals.total),
            items: self.items.iter().map(ItemPayload::from).collect(),
        }
    }

    /// Encode the wire payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, OrderError> {
        Ok(serde_json::to_string(&self.to_payload())?)
    }

    /// Rebuild an order from a stored payload.
    ///
    /// The VAT rate is not part of the payload and is taken from `policy`.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderError`] for empty orders, zero quantities, plant lines
    /// without an age, or amounts that do not fit in cents.
    pub fn from_payload(payload: OrderPayload, policy: &TotalsPolicy) -> Result<Self, OrderError> {
        let items = payload
            .items
            .into_iter()
            .map(CartLineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let totals = OrderTotals {
            subtotal: from_decimal(payload.subtotal)?,
            vat_rate: policy.vat_rate,
            vat_amount: from_decimal(payload.vat_amount)?,
            delivery_fee: from_decimal(payload.shipping)?,
            cod_fee: from_decimal(payload.cod_fee)?,
            total: from_decimal(payload.total_amount)?,
        };

        Self::new(
            OrderHeader {
                id: payload.order_number,
                date: payload.order_date,
            },
            payload.customer,
            items,
            totals,
            payload.payment.method,
            payload.delivery.method,
        )
    }

    /// Decode a stored JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderError`] if the JSON is malformed or the payload is invalid.
    pub fn from_json(json: &str, policy: &TotalsPolicy) -> Result<Self, OrderError> {
        let payload: OrderPayload = serde_json::from_str(json)?;

        Self::from_payload(payload, policy)
    }
}

/// Order-creation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    /// Order number
    pub order_number: String,

    /// Order date (ISO 8601)
    pub order_date: Date,

    /// Billing customer
    pub customer: Customer,

    /// Delivery block
    pub delivery: DeliveryPayload,

    /// Payment block
    pub payment: PaymentPayload,

    /// Net subtotal
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,

    /// Delivery fee
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,

    /// VAT amount
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_amount: Decimal,

    /// Cash-on-delivery surcharge; absent in payloads written before it existed
    #[serde(default, with = "rust_decimal::serde::float")]
    pub cod_fee: Decimal,

    /// Amount due
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,

    /// Line items
    pub items: Vec<ItemPayload>,
}

/// Delivery block of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPayload {
    /// Delivery method
    pub method: DeliveryMethod,
}

/// Payment block of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPayload {
    /// Payment method
    pub method: PaymentMethod,
}

/// Line item type on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A plant specimen
    Plant,

    /// A catalog product
    Product,
}

/// A line item on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    /// Plant or product id
    pub id: String,

    /// Plant or product
    #[serde(rename = "type")]
    pub item_type: ItemType,

    /// Display name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Image reference
    #[serde(default)]
    pub image: Option<String>,

    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Quantity
    pub quantity: u32,

    /// Cultivar name (plants only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultivar_name: Option<String>,

    /// Age in years (plants only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<AgeYears>,

    /// Height in centimetres (plants only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl From<&CartLineItem> for ItemPayload {
    fn from(item: &CartLineItem) -> Self {
        let (item_type, cultivar_name, age, height) = match &item.kind {
            LineItemKind::Plant {
                cultivar,
                age,
                height_cm,
            } => (
                ItemType::Plant,
                Some(cultivar.clone()),
                Some(*age),
                *height_cm,
            ),
            LineItemKind::Product => (ItemType::Product, None, None, None),
        };

        Self {
            id: item.id.clone(),
            item_type,
            name: item.name.clone(),
            description: item.description.clone(),
            image: item.image.clone(),
            price: to_decimal(&item.unit_price),
            quantity: item.quantity,
            cultivar_name,
            age,
            height,
        }
    }
}

impl TryFrom<ItemPayload> for CartLineItem {
    type Error = OrderError;

    fn try_from(payload: ItemPayload) -> Result<Self, Self::Error> {
        if payload.quantity == 0 {
            return Err(OrderError::ZeroQuantity(payload.id));
        }

        let kind = match payload.item_type {
            ItemType::Plant => LineItemKind::Plant {
                cultivar: payload
                    .cultivar_name
                    .unwrap_or_else(|| payload.name.clone()),
                age: payload
                    .age
                    .ok_or_else(|| OrderError::MissingAge(payload.id.clone()))?,
                height_cm: payload.height,
            },
            ItemType::Product => LineItemKind::Product,
        };

        Ok(Self {
            unit_price: from_decimal(payload.price)?,
            id: payload.id,
            name: payload.name,
            description: payload.description,
            image: payload.image,
            kind,
            quantity: payload.quantity,
        })
    }
}
