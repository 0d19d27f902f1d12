//! Cart Fixtures

use serde::Deserialize;

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Lines in cart order
    pub lines: Vec<CartLineFixture>,
}

/// Cart Line Fixture; names exactly one of `plant` or `product`
#[derive(Debug, Clone, Deserialize)]
pub struct CartLineFixture {
    /// Plant id
    #[serde(default)]
    pub plant: Option<String>,

    /// Product id
    #[serde(default)]
    pub product: Option<String>,

    /// Quantity
    #[serde(default = "one")]
    pub quantity: u32,

    /// Manual price for a cultivar without a price group (e.g., "60.00 EUR")
    #[serde(default)]
    pub price_override: Option<String>,
}

fn one() -> u32 {
    1
}
