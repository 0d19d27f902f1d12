//! Price Group Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    prices::parse_price,
    pricing::{AboveRangePolicy, AgeYears, PriceBand, PriceGroup, PriceTable},
};

/// Wrapper for price groups in YAML
#[derive(Debug, Deserialize)]
pub struct PriceGroupsFixture {
    /// Handling of plants older than the oldest band
    #[serde(default)]
    pub above_range: AboveRangePolicy,

    /// Map of price group -> bands
    pub groups: FxHashMap<PriceGroup, Vec<BandFixture>>,
}

/// Price Band Fixture
#[derive(Debug, Deserialize)]
pub struct BandFixture {
    /// Plant age in years
    pub age: AgeYears,

    /// Unit price (e.g., "45.00 EUR")
    pub price: String,
}

impl TryFrom<PriceGroupsFixture> for PriceTable {
    type Error = FixtureError;

    fn try_from(fixture: PriceGroupsFixture) -> Result<Self, Self::Error> {
        let mut bands = Vec::new();

        for (group, group_bands) in fixture.groups {
            for band in group_bands {
                bands.push((
                    group,
                    PriceBand {
                        age: band.age,
                        price: parse_price(&band.price)?,
                    },
                ));
            }
        }

        Ok(PriceTable::from_bands(bands, fixture.above_range)?)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{pricing::PriceLookup, prices::eur};

    use super::*;

    #[test]
    fn bands_become_a_validated_table() -> TestResult {
        let fixture: PriceGroupsFixture = serde_norway::from_str(
            "above_range: unavailable\ngroups:\n  B:\n    - { age: 3, price: 69.00 EUR }\n    - { age: 4, price: 85.00 EUR }\n",
        )?;

        let table = PriceTable::try_from(fixture)?;

        assert_eq!(table.above_range(), AboveRangePolicy::Unavailable);
        assert_eq!(
            table.unit_price(PriceGroup::B, AgeYears(4)),
            PriceLookup::Priced(eur(8500))
        );

        Ok(())
    }

    #[test]
    fn invalid_price_is_rejected() -> TestResult {
        let fixture: PriceGroupsFixture =
            serde_norway::from_str("groups:\n  A:\n    - { age: 3, price: cheap }\n")?;

        assert!(matches!(
            PriceTable::try_from(fixture),
            Err(FixtureError::Price(_))
        ));

        Ok(())
    }
}
