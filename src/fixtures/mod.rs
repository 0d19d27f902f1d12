//! Fixtures
//!
//! YAML fixture sets for tests and demos. A set named `nursery` is made of
//! `price_groups/nursery.yml`, `catalog/nursery.yml` and `carts/nursery.yml`
//! under the fixture base path.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    catalog::{Catalog, CatalogError, Cultivar, CultivarKey, Plant, PlantKey, Product, ProductKey},
    fixtures::{
        carts::{CartFixture, CartLineFixture},
        catalog::CatalogFixture,
        price_groups::PriceGroupsFixture,
    },
    prices::{PriceError, parse_price},
    pricing::{AboveRangePolicy, PriceTable, PriceTableError},
};

pub mod carts;
pub mod catalog;
pub mod price_groups;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price or percentage
    #[error(transparent)]
    Price(#[from] PriceError),

    /// Price table rejected the bands
    #[error(transparent)]
    PriceTable(#[from] PriceTableError),

    /// Catalog rejected a record
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Cart rejected a line
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Cultivar not found
    #[error("Cultivar not found: {0}")]
    CultivarNotFound(String),

    /// Plant not found
    #[error("Plant not found: {0}")]
    PlantNotFound(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A cart line names both or neither of a plant and a product
    #[error("Cart line {0} must name exactly one plant or product")]
    InvalidCartLine(usize),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Reference price data
    price_table: PriceTable,

    /// Cultivars, plants and products
    catalog: Catalog,

    /// String key -> `SlotMap` key mappings for lookups
    cultivar_keys: FxHashMap<String, CultivarKey>,
    plant_keys: FxHashMap<String, PlantKey>,
    product_keys: FxHashMap<String, ProductKey>,

    /// Cart lines, in file order
    cart_lines: Vec<CartLineFixture>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            price_table: PriceTable::default(),
            catalog: Catalog::new(),
            cultivar_keys: FxHashMap::default(),
            plant_keys: FxHashMap::default(),
            product_keys: FxHashMap::default(),
            cart_lines: Vec::new(),
        }
    }

    fn read(&self, category: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));

        Ok(fs::read_to_string(file_path)?)
    }

    /// Load a price table from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the bands
    /// do not form a valid table.
    pub fn load_price_groups(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: PriceGroupsFixture = serde_norway::from_str(&self.read("price_groups", name)?)?;

        self.price_table = fixture.try_into()?;

        Ok(self)
    }

    /// Load cultivars, plants and products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a plant
    /// references an unknown cultivar.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CatalogFixture = serde_norway::from_str(&self.read("catalog", name)?)?;

        for (key, cultivar) in fixture.cultivars {
            let cultivar_key = self.catalog.insert_cultivar(cultivar.into());

            self.cultivar_keys.insert(key, cultivar_key);
        }

        for (key, plant_fixture) in fixture.plants {
            let cultivar_key = self
                .cultivar_keys
                .get(&plant_fixture.cultivar)
                .copied()
                .ok_or_else(|| FixtureError::CultivarNotFound(plant_fixture.cultivar.clone()))?;

            let plant_key = self
                .catalog
                .insert_plant(plant_fixture.into_plant(key.clone(), cultivar_key))?;

            self.plant_keys.insert(key, plant_key);
        }

        for (key, product_fixture) in fixture.products {
            let product = product_fixture.into_product(key.clone())?;
            let product_key = self.catalog.insert_product(product);

            self.product_keys.insert(key, product_key);
        }

        Ok(self)
    }

    /// Load cart lines from a YAML fixture file
    ///
    /// Lines are resolved against the catalog by [`Fixture::cart`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartFixture = serde_norway::from_str(&self.read("carts", name)?)?;

        self.cart_lines = fixture.lines;

        Ok(self)
    }

    /// Load a complete fixture set (price groups, catalog and cart with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_price_groups(name)?
            .load_catalog(name)?
            .load_cart(name)?;

        Ok(fixture)
    }

    /// Override how ages beyond the oldest band are priced.
    pub fn set_above_range(&mut self, above_range: AboveRangePolicy) -> &mut Self {
        self.price_table = std::mem::take(&mut self.price_table).with_above_range(above_range);

        self
    }

    /// Reference price data
    pub fn price_table(&self) -> &PriceTable {
        &self.price_table
    }

    /// Loaded catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Get a cultivar by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the cultivar is not found.
    pub fn cultivar(&self, key: &str) -> Result<&Cultivar, FixtureError> {
        self.cultivar_keys
            .get(key)
            .and_then(|cultivar_key| self.catalog.cultivar(*cultivar_key))
            .ok_or_else(|| FixtureError::CultivarNotFound(key.to_string()))
    }

    /// Get a plant and its cultivar by the plant's string key
    ///
    /// # Errors
    ///
    /// Returns an error if the plant is not found.
    pub fn plant(&self, key: &str) -> Result<(&Plant, &Cultivar), FixtureError> {
        self.plant_keys
            .get(key)
            .and_then(|plant_key| self.catalog.plant_with_cultivar(*plant_key))
            .ok_or_else(|| FixtureError::PlantNotFound(key.to_string()))
    }

    /// Get a product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product, FixtureError> {
        self.product_keys
            .get(key)
            .and_then(|product_key| self.catalog.product(*product_key))
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Build a cart from the loaded cart lines
    ///
    /// Plant prices are resolved against the loaded price table.
    ///
    /// # Errors
    ///
    /// Returns an error if a line references an unknown record, is malformed,
    /// or names a plant that cannot be priced.
    pub fn cart(&self) -> Result<Cart, FixtureError> {
        let mut cart = Cart::new();

        for (idx, line) in self.cart_lines.iter().enumerate() {
            match (&line.plant, &line.product) {
                (Some(plant_key), None) => {
                    let (plant, cultivar) = self.plant(plant_key)?;
                    let manual_override = line.price_override.as_deref().map(parse_price).transpose()?;

                    cart.add_plant(
                        &self.price_table,
                        plant,
                        cultivar,
                        line.quantity,
                        manual_override,
                    )?;
                }
                (None, Some(product_key)) => {
                    cart.add_product(self.product(product_key)?, line.quantity)?;
                }
                _ => return Err(FixtureError::InvalidCartLine(idx)),
            }
        }

        Ok(cart)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
