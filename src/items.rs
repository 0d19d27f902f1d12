//! Items

use crate::{
    catalog::{Cultivar, Plant, Product},
    pricing::AgeYears,
    prices::{Price, PriceError, checked_times},
};

/// What a cart line sells.
#[derive(Clone, Debug, PartialEq)]
pub enum LineItemKind {
    /// A specific plant, priced from its cultivar's group and its age.
    Plant {
        /// Cultivar name
        cultivar: String,
        /// Plant age
        age: AgeYears,
        /// Height in centimetres, when measured
        height_cm: Option<u32>,
    },

    /// A catalog product with a fixed price.
    Product,
}

/// A priced line of a cart or order.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLineItem {
    /// Plant or product id
    pub id: String,

    /// Display name
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Image reference
    pub image: Option<String>,

    /// What is being sold
    pub kind: LineItemKind,

    /// Resolved unit price
    pub unit_price: Price,

    /// Number of units
    pub quantity: u32,
}

impl CartLineItem {
    /// A product line at the product's list price.
    pub fn product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            image: product.image.clone(),
            kind: LineItemKind::Product,
            unit_price: product.price,
            quantity,
        }
    }

    /// A plant line at an already resolved unit price.
    pub fn plant(plant: &Plant, cultivar: &Cultivar, unit_price: Price, quantity: u32) -> Self {
        Self {
            id: plant.id.clone(),
            name: cultivar.name.clone(),
            description: cultivar.description.clone(),
            image: plant.image.clone().or_else(|| cultivar.image.clone()),
            kind: LineItemKind::Plant {
                cultivar: cultivar.name.clone(),
                age: plant.age,
                height_cm: plant.height_cm,
            },
            unit_price,
            quantity,
        }
    }

    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the line total does not fit in cents.
    pub fn line_total(&self) -> Result<Price, PriceError> {
        checked_times(&self.unit_price, self.quantity)
    }

    /// Whether this line sells a plant.
    pub fn is_plant(&self) -> bool {
        matches!(self.kind, LineItemKind::Plant { .. })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        catalog::CultivarKey,
        prices::eur,
        pricing::PriceGroup,
    };

    use super::*;

    #[test]
    fn line_total_multiplies_quantity() -> TestResult {
        let product = Product {
            id: "soil-20l".to_string(),
            name: "Potting soil 20 l".to_string(),
            description: String::new(),
            price: eur(850),
            image: None,
        };

        let line = CartLineItem::product(&product, 3);

        assert_eq!(line.line_total()?, eur(2550));
        assert!(!line.is_plant());

        Ok(())
    }

    #[test]
    fn plant_line_carries_cultivar_metadata() {
        let mut cultivar = Cultivar::new("Bloodgood", Some(PriceGroup::A));
        cultivar.image = Some("bloodgood.jpg".to_string());

        let plant = Plant::new("p-7", CultivarKey::default(), AgeYears(5)).with_height(120);
        let line = CartLineItem::plant(&plant, &cultivar, eur(5500), 1);

        assert_eq!(line.id, "p-7");
        assert_eq!(line.image.as_deref(), Some("bloodgood.jpg"));
        assert_eq!(
            line.kind,
            LineItemKind::Plant {
                cultivar: "Bloodgood".to_string(),
                age: AgeYears(5),
                height_cm: Some(120),
            }
        );
    }

    #[test]
    fn line_total_overflow_errors() {
        let line = CartLineItem {
            id: "x".to_string(),
            name: "x".to_string(),
            description: String::new(),
            image: None,
            kind: LineItemKind::Product,
            unit_price: eur(i64::MAX / 2),
            quantity: 3,
        };

        assert_eq!(line.line_total(), Err(PriceError::Overflow));
    }
}
