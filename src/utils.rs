//! Utils

use std::path::PathBuf;

use clap::Parser;

use crate::{
    locale::Locale,
    totals::{DeliveryMethod, PaymentMethod},
};

/// Arguments for the invoice demo
#[derive(Debug, Parser)]
pub struct ExampleInvoiceArgs {
    /// Fixture set to use for the catalog, price groups and cart
    #[clap(short, long, default_value = "nursery")]
    pub fixture: String,

    /// Store configuration file
    #[clap(short, long, default_value = "config/store.yml")]
    pub config: PathBuf,

    /// Invoice locale; defaults to the configured locale
    #[clap(short, long)]
    pub locale: Option<Locale>,

    /// Delivery method (pickup, delivery)
    #[clap(short, long, default_value = "pickup")]
    pub delivery: DeliveryMethod,

    /// Payment method (cod, bank_transfer, credit_card)
    #[clap(short, long, default_value = "bank_transfer")]
    pub payment: PaymentMethod,

    /// Directory the invoice files are written to
    #[clap(short, long, default_value = "target/invoices")]
    pub out: PathBuf,
}
