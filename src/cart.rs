//! Cart
//!
//! The cart is a plain value handed to the totals calculator; nothing about it
//! is global. Plant prices are resolved when the plant is added, so a cart
//! only ever holds priced lines.

use rusty_money::iso::{Currency, EUR};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    catalog::{Cultivar, Plant, Product},
    items::CartLineItem,
    prices::Price,
    pricing::{PriceTable, Unavailable, resolve_plant_price},
};

/// Errors related to cart construction.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A plant could not be priced and was not added.
    #[error("{name} cannot be priced: {reason}")]
    Unpriceable {
        /// Cultivar name of the rejected plant
        name: String,
        /// Why no price was available
        reason: Unavailable,
    },

    /// A line was added or updated with quantity zero.
    #[error("quantity of {0} must be at least 1")]
    ZeroQuantity(String),

    /// An item's currency differs from the cart currency (index, item currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// An item was not found in the cart.
    #[error("Item {0} not found")]
    ItemNotFound(usize),
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart {
    items: Vec<CartLineItem>,
    currency: &'static Currency,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Create an empty euro cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            currency: EUR,
        }
    }

    /// Create a cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a line is not in euros or has quantity zero.
    pub fn with_items(items: impl Into<Vec<CartLineItem>>) -> Result<Self, CartError> {
        let items = items.into();
        let currency = EUR;

        items.iter().enumerate().try_for_each(|(i, item)| {
            let item_currency = item.unit_price.currency();

            if item_currency != currency {
                return Err(CartError::CurrencyMismatch(
                    i,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if item.quantity == 0 {
                return Err(CartError::ZeroQuantity(item.name.clone()));
            }

            Ok(())
        })?;

        Ok(Cart { items, currency })
    }

    /// Add a product at its list price.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the quantity is zero or the product is not
    /// priced in the cart currency.
    pub fn add_product(&mut self, product: &Product, quantity: u32) -> Result<(), CartError> {
        self.push(CartLineItem::product(product, quantity))
    }

    /// Add a plant, resolving its unit price now.
    ///
    /// `manual_override` prices a plant whose cultivar has no price group.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Unpriceable`] if no price can be resolved; the plant
    /// stays out of the cart and out of every total.
    pub fn add_plant(
        &mut self,
        table: &PriceTable,
        plant: &Plant,
        cultivar: &Cultivar,
        quantity: u32,
        manual_override: Option<Price>,
    ) -> Result<(), CartError> {
        let unit_price = resolve_plant_price(table, cultivar, plant, manual_override)
            .into_result()
            .map_err(|reason| {
                if reason.is_data_integrity() {
                    warn!(
                        cultivar = %cultivar.name,
                        plant = %plant.id,
                        %reason,
                        "price group has no bands"
                    );
                } else {
                    debug!(
                        cultivar = %cultivar.name,
                        plant = %plant.id,
                        %reason,
                        "plant is not priceable"
                    );
                }

                CartError::Unpriceable {
                    name: cultivar.name.clone(),
                    reason,
                }
            })?;

        self.push(CartLineItem::plant(plant, cultivar, unit_price, quantity))
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the index is out of range.
    pub fn remove(&mut self, item: usize) -> Result<CartLineItem, CartError> {
        if item >= self.items.len() {
            return Err(CartError::ItemNotFound(item));
        }

        Ok(self.items.remove(item))
    }

    /// Change the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the line does not exist or the quantity is zero.
    pub fn set_quantity(&mut self, item: usize, quantity: u32) -> Result<(), CartError> {
        let line = self
            .items
            .get_mut(item)
            .ok_or(CartError::ItemNotFound(item))?;

        if quantity == 0 {
            return Err(CartError::ZeroQuantity(line.name.clone()));
        }

        line.quantity = quantity;

        Ok(())
    }

    /// Get a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ItemNotFound` if the item is not found.
    pub fn get_item(&self, item: usize) -> Result<&CartLineItem, CartError> {
        self.items.get(item).ok_or(CartError::ItemNotFound(item))
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartLineItem> {
        self.items.iter()
    }

    /// All lines, in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Consume the cart, returning its lines.
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Append a line, merging it into an identical existing line.
    fn push(&mut self, line: CartLineItem) -> Result<(), CartError> {
        if line.quantity == 0 {
            return Err(CartError::ZeroQuantity(line.name));
        }

        let line_currency = line.unit_price.currency();

        if line_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                self.items.len(),
                line_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let existing = self.items.iter_mut().find(|item| {
            item.id == line.id && item.kind == line.kind && item.unit_price == line.unit_price
        });

        match existing {
            Some(item) => item.quantity = item.quantity.saturating_add(line.quantity),
            None => self.items.push(line),
        }

        Ok(())
    }
}
