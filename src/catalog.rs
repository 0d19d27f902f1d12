//! Catalog
//!
//! Master data the pricing engine reads: cultivars (which carry the price
//! group), individual plants (which carry the age) and plain products.

use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::{
    format::format_money,
    locale::Locale,
    prices::Price,
    pricing::{AgeYears, PriceGroup, PriceLookup, PriceRange, PriceTable, Unavailable},
};

new_key_type! {
    /// Cultivar Key
    pub struct CultivarKey;

    /// Plant Key
    pub struct PlantKey;

    /// Product Key
    pub struct ProductKey;
}

/// Catalog errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A plant references a cultivar that is not in the catalog.
    #[error("plant {0} references an unknown cultivar")]
    UnknownCultivar(String),
}

/// A named plant variety.
#[derive(Debug, Clone, PartialEq)]
pub struct Cultivar {
    /// Cultivar name
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Price tier; `None` means "price on request"
    pub price_group: Option<PriceGroup>,

    /// Image reference
    pub image: Option<String>,
}

impl Cultivar {
    /// Create a cultivar with no description or image.
    pub fn new(name: impl Into<String>, price_group: Option<PriceGroup>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price_group,
            image: None,
        }
    }
}

/// A physical, inventory-tracked specimen of a cultivar.
#[derive(Debug, Clone, PartialEq)]
pub struct Plant {
    /// Inventory id
    pub id: String,

    /// Cultivar of this plant
    pub cultivar: CultivarKey,

    /// Age in years; drives the price within the cultivar's group
    pub age: AgeYears,

    /// Height in centimetres, when measured
    pub height_cm: Option<u32>,

    /// Image reference
    pub image: Option<String>,
}

impl Plant {
    /// Create a plant without height or image.
    pub fn new(id: impl Into<String>, cultivar: CultivarKey, age: AgeYears) -> Self {
        Self {
            id: id.into(),
            cultivar,
            age,
            height_cm: None,
            image: None,
        }
    }

    /// Set the measured height.
    #[must_use]
    pub fn with_height(mut self, height_cm: u32) -> Self {
        self.height_cm = Some(height_cm);
        self
    }
}

/// A non-plant article with a fixed price (soil, pots, tools).
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product id
    pub id: String,

    /// Product name
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Unit price
    pub price: Price,

    /// Image reference
    pub image: Option<String>,
}

/// Cultivars, plants and products keyed by slot.
#[derive(Debug, Default)]
pub struct Catalog {
    cultivars: SlotMap<CultivarKey, Cultivar>,
    plants: SlotMap<PlantKey, Plant>,
    products: SlotMap<ProductKey, Product>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cultivar.
    pub fn insert_cultivar(&mut self, cultivar: Cultivar) -> CultivarKey {
        self.cultivars.insert(cultivar)
    }

    /// Add a plant.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownCultivar`] if the plant's cultivar is not
    /// in this catalog.
    pub fn insert_plant(&mut self, plant: Plant) -> Result<PlantKey, CatalogError> {
        if !self.cultivars.contains_key(plant.cultivar) {
            return Err(CatalogError::UnknownCultivar(plant.id));
        }

        Ok(self.plants.insert(plant))
    }

    /// Add a product.
    pub fn insert_product(&mut self, product: Product) -> ProductKey {
        self.products.insert(product)
    }

    /// Look up a cultivar.
    pub fn cultivar(&self, key: CultivarKey) -> Option<&Cultivar> {
        self.cultivars.get(key)
    }

    /// Look up a plant.
    pub fn plant(&self, key: PlantKey) -> Option<&Plant> {
        self.plants.get(key)
    }

    /// Look up a plant together with its cultivar.
    pub fn plant_with_cultivar(&self, key: PlantKey) -> Option<(&Plant, &Cultivar)> {
        let plant = self.plants.get(key)?;
        let cultivar = self.cultivars.get(plant.cultivar)?;

        Some((plant, cultivar))
    }

    /// Look up a product.
    pub fn product(&self, key: ProductKey) -> Option<&Product> {
        self.products.get(key)
    }

    /// Iterate over all cultivars.
    pub fn cultivars(&self) -> impl Iterator<Item = (CultivarKey, &Cultivar)> {
        self.cultivars.iter()
    }

    /// Iterate over all plants of one cultivar.
    pub fn plants_of(&self, cultivar: CultivarKey) -> impl Iterator<Item = (PlantKey, &Plant)> {
        self.plants
            .iter()
            .filter(move |(_, plant)| plant.cultivar == cultivar)
    }
}

/// Price range of a cultivar for listing pages.
pub fn cultivar_price_range(cultivar: &Cultivar, table: &PriceTable) -> PriceLookup<PriceRange> {
    match cultivar.price_group {
        Some(group) => table.price_range(group),
        None => PriceLookup::Unavailable(Unavailable::NoPriceGroup),
    }
}

/// Listing text for a cultivar: a single price, a `min – max` range, or the
/// localized "price on request" / "price not available" notice.
pub fn display_price_range(cultivar: &Cultivar, table: &PriceTable, locale: Locale) -> String {
    match cultivar_price_range(cultivar, table) {
        PriceLookup::Priced(range) if range.min == range.max => format_money(&range.min, locale),
        PriceLookup::Priced(range) => format!(
            "{} – {}",
            format_money(&range.min, locale),
            format_money(&range.max, locale)
        ),
        PriceLookup::Unavailable(reason) => reason.label(locale).to_string(),
    }
}
