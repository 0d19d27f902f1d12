//! Verdant
//!
//! Verdant prices plants and products for a nursery storefront, computes order
//! totals with German VAT and payment surcharges, and renders matching HTML and
//! PDF invoices in German or English.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod company;
pub mod config;
pub mod fixtures;
pub mod format;
pub mod invoice;
pub mod items;
pub mod locale;
pub mod order;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod summary;
pub mod totals;
pub mod utils;
