//! Pricing
//!
//! Resolves a concrete unit price for a plant from its cultivar's
//! [`PriceGroup`] and the plant's age. Each group carries a price curve made
//! of [`PriceBand`]s; the curve must never get cheaper as plants get older.

use std::{collections::BTreeMap, fmt, str::FromStr};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::{Cultivar, Plant},
    locale::Locale,
    prices::Price,
};

/// Price tier of a cultivar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceGroup {
    /// Standard
    A,

    /// Premium
    B,

    /// Rare
    C,
}

impl PriceGroup {
    /// All groups, cheapest tier first.
    pub const ALL: [PriceGroup; 3] = [PriceGroup::A, PriceGroup::B, PriceGroup::C];
}

impl fmt::Display for PriceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            PriceGroup::A => "A",
            PriceGroup::B => "B",
            PriceGroup::C => "C",
        };

        f.write_str(code)
    }
}

/// Error returned when parsing an unknown price group code.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown price group: {0}")]
pub struct UnknownPriceGroup(pub String);

impl FromStr for PriceGroup {
    type Err = UnknownPriceGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(PriceGroup::A),
            "B" | "b" => Ok(PriceGroup::B),
            "C" | "c" => Ok(PriceGroup::C),
            other => Err(UnknownPriceGroup(other.to_string())),
        }
    }
}

/// Age of a plant in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgeYears(pub u32);

impl fmt::Display for AgeYears {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single point on a group's price curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    /// Plant age this band prices
    pub age: AgeYears,

    /// Unit price for plants of this age
    pub price: Price,
}

/// Display range of a group, before a specific age is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    /// Cheapest band of the group
    pub min: Price,

    /// Most expensive band of the group
    pub max: Price,
}

/// What happens when a plant is older than the oldest band of its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AboveRangePolicy {
    /// Charge the price of the oldest band.
    #[default]
    Clamp,

    /// Treat the plant as unpriceable.
    Unavailable,
}

/// Why no price could be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// The cultivar has no price group ("price on request").
    NoPriceGroup,

    /// The group is referenced but has no bands at all.
    NoBands(PriceGroup),

    /// The plant is younger than the youngest band.
    BelowLowestBand {
        /// Group that was consulted
        group: PriceGroup,
        /// Requested age
        age: AgeYears,
        /// Youngest priced age
        lowest: AgeYears,
    },

    /// The plant is older than the oldest band and the policy refuses to clamp.
    AboveHighestBand {
        /// Group that was consulted
        group: PriceGroup,
        /// Requested age
        age: AgeYears,
        /// Oldest priced age
        highest: AgeYears,
    },
}

impl Unavailable {
    /// Customer-facing text for this state.
    pub fn label(self, locale: Locale) -> &'static str {
        let labels = locale.labels();

        match self {
            Unavailable::NoPriceGroup => labels.price_on_request,
            _ => labels.price_not_available,
        }
    }

    /// True when the missing price points at broken reference data.
    pub fn is_data_integrity(self) -> bool {
        matches!(self, Unavailable::NoBands(_))
    }
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::NoPriceGroup => f.write_str("no price group assigned"),
            Unavailable::NoBands(group) => write!(f, "price group {group} has no bands"),
            Unavailable::BelowLowestBand { group, age, lowest } => write!(
                f,
                "age {age} is below the youngest band ({lowest}) of price group {group}"
            ),
            Unavailable::AboveHighestBand {
                group,
                age,
                highest,
            } => write!(
                f,
                "age {age} is above the oldest band ({highest}) of price group {group}"
            ),
        }
    }
}

/// Outcome of a price lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceLookup<T> {
    /// A price was resolved.
    Priced(T),

    /// No price can be shown; the reason says which message to display.
    Unavailable(Unavailable),
}

impl<T> PriceLookup<T> {
    /// The resolved value, if any.
    pub fn priced(self) -> Option<T> {
        match self {
            PriceLookup::Priced(value) => Some(value),
            PriceLookup::Unavailable(_) => None,
        }
    }

    /// Whether a value was resolved.
    pub fn is_priced(&self) -> bool {
        matches!(self, PriceLookup::Priced(_))
    }

    /// Convert into a `Result`, keeping the unavailable reason as the error.
    ///
    /// # Errors
    ///
    /// Returns the [`Unavailable`] reason when no value was resolved.
    pub fn into_result(self) -> Result<T, Unavailable> {
        match self {
            PriceLookup::Priced(value) => Ok(value),
            PriceLookup::Unavailable(reason) => Err(reason),
        }
    }
}

/// Errors raised while building a [`PriceTable`].
#[derive(Debug, Error, PartialEq)]
pub enum PriceTableError {
    /// Two bands price the same age in the same group.
    #[error("price group {group} defines age {age} twice")]
    DuplicateBand {
        /// Group with the duplicate
        group: PriceGroup,
        /// Duplicated age
        age: AgeYears,
    },

    /// A band is priced in a currency other than the table's.
    #[error("price group {group} age {age} is priced in {found}, expected {expected}")]
    CurrencyMismatch {
        /// Group with the offending band
        group: PriceGroup,
        /// Age of the offending band
        age: AgeYears,
        /// Currency of the band
        found: &'static str,
        /// Currency of the table
        expected: &'static str,
    },

    /// A band is cheaper than a younger band of the same group.
    #[error(
        "price group {group} gets cheaper with age: {younger} years cost {younger_minor} but {older} years cost {older_minor} (minor units)"
    )]
    NonMonotonic {
        /// Group with the inversion
        group: PriceGroup,
        /// Younger age
        younger: AgeYears,
        /// Price of the younger age in minor units
        younger_minor: i64,
        /// Older age
        older: AgeYears,
        /// Price of the older age in minor units
        older_minor: i64,
    },

    /// A band carries a negative price.
    #[error("price group {group} age {age} has a negative price")]
    NegativePrice {
        /// Group with the offending band
        group: PriceGroup,
        /// Age of the offending band
        age: AgeYears,
    },
}

/// Reference price data: one ordered price curve per group.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    groups: FxHashMap<PriceGroup, BTreeMap<AgeYears, Price>>,
    above_range: AboveRangePolicy,
}

impl PriceTable {
    /// Create an empty table with the given above-range policy.
    pub fn new(above_range: AboveRangePolicy) -> Self {
        Self {
            groups: FxHashMap::default(),
            above_range,
        }
    }

    /// Build and validate a table from `(group, band)` pairs.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceTableError`] if a band is duplicated, negative, in the
    /// wrong currency, or if any group's curve decreases with age.
    pub fn from_bands(
        bands: impl IntoIterator<Item = (PriceGroup, PriceBand)>,
        above_range: AboveRangePolicy,
    ) -> Result<Self, PriceTableError> {
        let mut table = Self::new(above_range);

        for (group, band) in bands {
            table.insert(group, band)?;
        }

        table.validate()?;

        Ok(table)
    }

    /// Insert a single band between its younger and older neighbours.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceTableError`] for duplicate ages, negative prices, a
    /// currency that differs from the rest of the table, or a price that would
    /// make the group's curve decrease with age.
    pub fn insert(&mut self, group: PriceGroup, band: PriceBand) -> Result<(), PriceTableError> {
        if band.price.to_minor_units() < 0 {
            return Err(PriceTableError::NegativePrice {
                group,
                age: band.age,
            });
        }

        if let Some(existing) = self.any_price() {
            let expected = existing.currency().iso_alpha_code;
            let found = band.price.currency().iso_alpha_code;

            if expected != found {
                return Err(PriceTableError::CurrencyMismatch {
                    group,
                    age: band.age,
                    found,
                    expected,
                });
            }
        }

        if let Some(curve) = self.groups.get(&group) {
            check_neighbours(group, curve, band)?;
        }

        self.groups
            .entry(group)
            .or_default()
            .insert(band.age, band.price);

        Ok(())
    }

    /// Check that every group's price is non-decreasing by age.
    ///
    /// # Errors
    ///
    /// Returns [`PriceTableError::NonMonotonic`] for the first inversion found,
    /// checking groups in `A`, `B`, `C` order.
    pub fn validate(&self) -> Result<(), PriceTableError> {
        for group in PriceGroup::ALL {
            let Some(curve) = self.groups.get(&group) else {
                continue;
            };

            let mut previous: Option<(AgeYears, i64)> = None;

            for (&age, price) in curve {
                let minor = price.to_minor_units();

                match previous {
                    Some((younger, younger_minor)) if minor < younger_minor => {
                        return Err(PriceTableError::NonMonotonic {
                            group,
                            younger,
                            younger_minor,
                            older: age,
                            older_minor: minor,
                        });
                    }
                    _ => {}
                }

                previous = Some((age, minor));
            }
        }

        Ok(())
    }

    /// Policy applied to ages above the oldest band.
    pub fn above_range(&self) -> AboveRangePolicy {
        self.above_range
    }

    /// Replace the above-range policy.
    #[must_use]
    pub fn with_above_range(mut self, above_range: AboveRangePolicy) -> Self {
        self.above_range = above_range;
        self
    }

    /// Bands of a group, youngest first.
    pub fn bands(&self, group: PriceGroup) -> impl Iterator<Item = PriceBand> + '_ {
        self.groups
            .get(&group)
            .into_iter()
            .flat_map(|curve| curve.iter())
            .map(|(&age, &price)| PriceBand { age, price })
    }

    /// Min and max unit price across all bands of `group`.
    pub fn price_range(&self, group: PriceGroup) -> PriceLookup<PriceRange> {
        let mut bands = self.bands(group);

        let Some(first) = bands.next() else {
            return PriceLookup::Unavailable(Unavailable::NoBands(group));
        };

        let (min, max) = bands.fold((first.price, first.price), |(min, max), band| {
            let minor = band.price.to_minor_units();

            (
                if minor < min.to_minor_units() {
                    band.price
                } else {
                    min
                },
                if minor > max.to_minor_units() {
                    band.price
                } else {
                    max
                },
            )
        });

        PriceLookup::Priced(PriceRange { min, max })
    }

    /// Unit price for a plant of `age` in `group`.
    ///
    /// An exact band wins. Between bands, the nearest younger band applies.
    /// Below the youngest band the plant is unpriceable; above the oldest band
    /// the table's [`AboveRangePolicy`] decides.
    pub fn unit_price(&self, group: PriceGroup, age: AgeYears) -> PriceLookup<Price> {
        let Some(curve) = self.groups.get(&group).filter(|curve| !curve.is_empty()) else {
            return PriceLookup::Unavailable(Unavailable::NoBands(group));
        };

        if let Some(price) = curve.get(&age) {
            return PriceLookup::Priced(*price);
        }

        let (Some((&lowest, _)), Some((&highest, &highest_price))) =
            (curve.first_key_value(), curve.last_key_value())
        else {
            return PriceLookup::Unavailable(Unavailable::NoBands(group));
        };

        if age < lowest {
            return PriceLookup::Unavailable(Unavailable::BelowLowestBand { group, age, lowest });
        }

        if age > highest {
            return match self.above_range {
                AboveRangePolicy::Clamp => PriceLookup::Priced(highest_price),
                AboveRangePolicy::Unavailable => {
                    PriceLookup::Unavailable(Unavailable::AboveHighestBand {
                        group,
                        age,
                        highest,
                    })
                }
            };
        }

        match curve.range(..age).next_back() {
            Some((_, price)) => PriceLookup::Priced(*price),
            None => PriceLookup::Unavailable(Unavailable::BelowLowestBand { group, age, lowest }),
        }
    }

    /// Any price in the table, used to pin the table currency.
    fn any_price(&self) -> Option<&Price> {
        self.groups.values().find_map(|curve| curve.values().next())
    }
}

/// A new band must keep its group's curve keyed by unique ages and
/// non-decreasing in price.
fn check_neighbours(
    group: PriceGroup,
    curve: &BTreeMap<AgeYears, Price>,
    band: PriceBand,
) -> Result<(), PriceTableError> {
    if curve.contains_key(&band.age) {
        return Err(PriceTableError::DuplicateBand {
            group,
            age: band.age,
        });
    }

    let minor = band.price.to_minor_units();

    if let Some((&younger, price)) = curve.range(..band.age).next_back() {
        let younger_minor = price.to_minor_units();

        if minor < younger_minor {
            return Err(PriceTableError::NonMonotonic {
                group,
                younger,
                younger_minor,
                older: band.age,
                older_minor: minor,
            });
        }
    }

    if let Some((&older, price)) = curve.range(band.age..).next() {
        let older_minor = price.to_minor_units();

        if older_minor < minor {
            return Err(PriceTableError::NonMonotonic {
                group,
                younger: band.age,
                younger_minor: minor,
                older,
                older_minor,
            });
        }
    }

    Ok(())
}

/// Localized tier name of a price group.
pub fn description(group: PriceGroup, locale: Locale) -> &'static str {
    match (group, locale) {
        (PriceGroup::A, _) => "Standard",
        (PriceGroup::B, _) => "Premium",
        (PriceGroup::C, Locale::De) => "Rarität",
        (PriceGroup::C, Locale::En) => "Rare",
    }
}

/// Resolve the unit price of a specific plant.
///
/// A manual override always wins, which is how a "price on request" cultivar
/// becomes sellable.
pub fn resolve_plant_price(
    table: &PriceTable,
    cultivar: &Cultivar,
    plant: &Plant,
    manual_override: Option<Price>,
) -> PriceLookup<Price> {
    if let Some(price) = manual_override {
        return PriceLookup::Priced(price);
    }

    match cultivar.price_group {
        Some(group) => table.unit_price(group, plant.age),
        None => PriceLookup::Unavailable(Unavailable::NoPriceGroup),
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use crate::{catalog::CultivarKey, prices::eur};

    use super::*;

    fn band(age: u32, minor: i64) -> PriceBand {
        PriceBand {
            age: AgeYears(age),
            price: eur(minor),
        }
    }

    fn standard_table() -> Result<PriceTable, PriceTableError> {
        PriceTable::from_bands(
            [
                (PriceGroup::A, band(3, 3500)),
                (PriceGroup::A, band(4, 4500)),
                (PriceGroup::A, band(5, 5500)),
                (PriceGroup::A, band(6, 6900)),
                (PriceGroup::B, band(4, 6000)),
                (PriceGroup::B, band(6, 8000)),
            ],
            AboveRangePolicy::Clamp,
        )
    }

    #[test]
    fn exact_band_hit() -> TestResult {
        let table = standard_table()?;

        assert_eq!(
            table.unit_price(PriceGroup::A, AgeYears(3)),
            PriceLookup::Priced(eur(3500))
        );

        Ok(())
    }

    #[test]
    fn older_ages_cost_at_least_as_much() -> TestResult {
        let table = standard_table()?;
        let base = table
            .unit_price(PriceGroup::A, AgeYears(3))
            .priced()
            .ok_or("age 3 should be priced")?;

        for age in 4..=6 {
            let price = table
                .unit_price(PriceGroup::A, AgeYears(age))
                .priced()
                .ok_or("age should be priced")?;

            assert!(
                price.to_minor_units() >= base.to_minor_units(),
                "age {age} is cheaper than age 3"
            );
        }

        Ok(())
    }

    #[test]
    fn below_lowest_band_is_unavailable() -> TestResult {
        let table = standard_table()?;

        assert_eq!(
            table.unit_price(PriceGroup::B, AgeYears(3)),
            PriceLookup::Unavailable(Unavailable::BelowLowestBand {
                group: PriceGroup::B,
                age: AgeYears(3),
                lowest: AgeYears(4),
            })
        );

        assert!(!table.unit_price(PriceGroup::A, AgeYears(0)).is_priced());

        Ok(())
    }

    #[test]
    fn gap_uses_nearest_younger_band() -> TestResult {
        let table = standard_table()?;

        assert_eq!(
            table.unit_price(PriceGroup::B, AgeYears(5)),
            PriceLookup::Priced(eur(6000))
        );

        Ok(())
    }

    #[test]
    fn above_highest_band_clamps_by_default() -> TestResult {
        let table = standard_table()?;

        assert_eq!(
            table.unit_price(PriceGroup::A, AgeYears(12)),
            PriceLookup::Priced(eur(6900))
        );

        Ok(())
    }

    #[test]
    fn above_highest_band_can_be_unavailable() -> TestResult {
        let table = standard_table()?.with_above_range(AboveRangePolicy::Unavailable);

        assert_eq!(
            table.unit_price(PriceGroup::A, AgeYears(7)),
            PriceLookup::Unavailable(Unavailable::AboveHighestBand {
                group: PriceGroup::A,
                age: AgeYears(7),
                highest: AgeYears(6),
            })
        );

        Ok(())
    }

    #[test]
    fn group_without_bands_is_unavailable() -> TestResult {
        let table = standard_table()?;

        assert_eq!(
            table.unit_price(PriceGroup::C, AgeYears(4)),
            PriceLookup::Unavailable(Unavailable::NoBands(PriceGroup::C))
        );
        assert_eq!(
            table.price_range(PriceGroup::C),
            PriceLookup::Unavailable(Unavailable::NoBands(PriceGroup::C))
        );
        assert!(Unavailable::NoBands(PriceGroup::C).is_data_integrity());

        Ok(())
    }

    #[test]
    fn price_range_spans_all_bands() -> TestResult {
        let table = standard_table()?;

        let range = table
            .price_range(PriceGroup::A)
            .priced()
            .ok_or("group A has bands")?;

        assert_eq!(range.min, eur(3500));
        assert_eq!(range.max, eur(6900));

        Ok(())
    }

    #[test]
    fn single_band_range_is_degenerate() -> TestResult {
        let table =
            PriceTable::from_bands([(PriceGroup::C, band(5, 12_000))], AboveRangePolicy::Clamp)?;

        let range = table
            .price_range(PriceGroup::C)
            .priced()
            .ok_or("group C has a band")?;

        assert_eq!(range.min, range.max);

        Ok(())
    }

    #[test]
    fn decreasing_curve_is_rejected() {
        let result = PriceTable::from_bands(
            [
                (PriceGroup::A, band(3, 4000)),
                (PriceGroup::A, band(4, 3900)),
            ],
            AboveRangePolicy::Clamp,
        );

        assert_eq!(
            result.err(),
            Some(PriceTableError::NonMonotonic {
                group: PriceGroup::A,
                younger: AgeYears(3),
                younger_minor: 4000,
                older: AgeYears(4),
                older_minor: 3900,
            })
        );
    }

    #[test]
    fn insert_checks_both_neighbours() -> TestResult {
        let mut table = PriceTable::new(AboveRangePolicy::Clamp);

        table.insert(PriceGroup::B, band(3, 6900))?;
        table.insert(PriceGroup::B, band(6, 11_900))?;

        assert_eq!(
            table.insert(PriceGroup::B, band(4, 6000)),
            Err(PriceTableError::NonMonotonic {
                group: PriceGroup::B,
                younger: AgeYears(3),
                younger_minor: 6900,
                older: AgeYears(4),
                older_minor: 6000,
            })
        );
        assert_eq!(
            table.insert(PriceGroup::B, band(5, 12_500)),
            Err(PriceTableError::NonMonotonic {
                group: PriceGroup::B,
                younger: AgeYears(5),
                younger_minor: 12_500,
                older: AgeYears(6),
                older_minor: 11_900,
            })
        );

        table.insert(PriceGroup::B, band(5, 9900))?;

        assert_eq!(
            table.unit_price(PriceGroup::B, AgeYears(4)),
            PriceLookup::Priced(eur(6900))
        );
        assert_eq!(table.bands(PriceGroup::B).count(), 3);

        Ok(())
    }

    #[test]
    fn equal_prices_are_monotonic() -> TestResult {
        PriceTable::from_bands(
            [
                (PriceGroup::A, band(3, 4000)),
                (PriceGroup::A, band(4, 4000)),
            ],
            AboveRangePolicy::Clamp,
        )?;

        Ok(())
    }

    #[test]
    fn duplicate_band_is_rejected() {
        let result = PriceTable::from_bands(
            [
                (PriceGroup::A, band(3, 4000)),
                (PriceGroup::A, band(3, 4100)),
            ],
            AboveRangePolicy::Clamp,
        );

        assert!(matches!(
            result,
            Err(PriceTableError::DuplicateBand { age: AgeYears(3), .. })
        ));
    }

    #[test]
    fn negative_and_foreign_prices_are_rejected() {
        let mut table = PriceTable::default();

        assert!(matches!(
            table.insert(PriceGroup::A, band(3, -1)),
            Err(PriceTableError::NegativePrice { .. })
        ));

        assert!(table.insert(PriceGroup::A, band(3, 100)).is_ok());

        let foreign = PriceBand {
            age: AgeYears(4),
            price: Money::from_minor(200, GBP),
        };

        assert!(matches!(
            table.insert(PriceGroup::A, foreign),
            Err(PriceTableError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn descriptions_are_localized() {
        assert_eq!(description(PriceGroup::A, Locale::En), "Standard");
        assert_eq!(description(PriceGroup::B, Locale::De), "Premium");
        assert_eq!(description(PriceGroup::C, Locale::En), "Rare");
        assert_eq!(description(PriceGroup::C, Locale::De), "Rarität");
    }

    #[test]
    fn price_group_parses_codes() -> TestResult {
        assert_eq!("B".parse::<PriceGroup>()?, PriceGroup::B);
        assert_eq!("c".parse::<PriceGroup>()?, PriceGroup::C);
        assert!("D".parse::<PriceGroup>().is_err());

        Ok(())
    }

    #[test]
    fn manual_override_wins_over_missing_group() -> TestResult {
        let table = standard_table()?;
        let cultivar = Cultivar::new("Acer palmatum 'Katsura'", None);
        let plant = Plant::new("plant-1", CultivarKey::default(), AgeYears(4));

        assert_eq!(
            resolve_plant_price(&table, &cultivar, &plant, None),
            PriceLookup::Unavailable(Unavailable::NoPriceGroup)
        );
        assert_eq!(
            resolve_plant_price(&table, &cultivar, &plant, Some(eur(9900))),
            PriceLookup::Priced(eur(9900))
        );

        Ok(())
    }

    #[test]
    fn unavailable_labels() {
        assert_eq!(Unavailable::NoPriceGroup.label(Locale::En), "Price on request");
        assert_eq!(
            Unavailable::NoBands(PriceGroup::A).label(Locale::De),
            "Preis nicht verfügbar"
        );
    }
}
