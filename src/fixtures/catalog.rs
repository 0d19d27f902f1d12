//! Catalog Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    catalog::{Cultivar, CultivarKey, Plant, Product},
    fixtures::FixtureError,
    prices::parse_price,
    pricing::{AgeYears, PriceGroup},
};

/// Wrapper for catalog records in YAML
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFixture {
    /// Map of cultivar key -> cultivar fixture
    #[serde(default)]
    pub cultivars: FxHashMap<String, CultivarFixture>,

    /// Map of plant id -> plant fixture
    #[serde(default)]
    pub plants: FxHashMap<String, PlantFixture>,

    /// Map of product id -> product fixture
    #[serde(default)]
    pub products: FxHashMap<String, ProductFixture>,
}

/// Cultivar Fixture
#[derive(Debug, Deserialize)]
pub struct CultivarFixture {
    /// Cultivar name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Price group; absent means "price on request"
    #[serde(default)]
    pub price_group: Option<PriceGroup>,

    /// Image reference
    #[serde(default)]
    pub image: Option<String>,
}

impl From<CultivarFixture> for Cultivar {
    fn from(fixture: CultivarFixture) -> Self {
        Cultivar {
            name: fixture.name,
            description: fixture.description,
            price_group: fixture.price_group,
            image: fixture.image,
        }
    }
}

/// Plant Fixture
#[derive(Debug, Deserialize)]
pub struct PlantFixture {
    /// Cultivar key
    pub cultivar: String,

    /// Age in years
    pub age: AgeYears,

    /// Height in centimetres
    #[serde(default)]
    pub height: Option<u32>,

    /// Image reference
    #[serde(default)]
    pub image: Option<String>,
}

impl PlantFixture {
    /// Build the plant once its cultivar key is known.
    pub fn into_plant(self, id: String, cultivar: CultivarKey) -> Plant {
        Plant {
            id,
            cultivar,
            age: self.age,
            height_cm: self.height,
            image: self.image,
        }
    }
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Product price (e.g., "8.50 EUR")
    pub price: String,

    /// Image reference
    #[serde(default)]
    pub image: Option<String>,
}

impl ProductFixture {
    /// Build the product under the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the price does not parse.
    pub fn into_product(self, id: String) -> Result<Product, FixtureError> {
        Ok(Product {
            id,
            name: self.name,
            description: self.description,
            price: parse_price(&self.price)?,
            image: self.image,
        })
    }
}
