//! Invoice Example
//!
//! Builds a cart from a fixture set, places the order, prints the checkout
//! summary and writes the HTML and PDF invoice into an outbox directory.
//!
//! Use `-f` to load a fixture set by name
//! Use `-l` to pick the invoice locale (de, en)
//! Use `-p` / `-d` to choose payment and delivery methods
//!
//! Run with: `cargo run --example invoice -- -l en -p cod`

use std::{fs::create_dir_all, io};

use anyhow::Result;
use clap::Parser;
use jiff::Zoned;
use tracing_subscriber::EnvFilter;
use verdant::{
    checkout::{OutboxDispatch, complete_order},
    config::StoreConfig,
    fixtures::Fixture,
    order::{Customer, Order, OrderHeader},
    summary::CheckoutSummary,
    utils::ExampleInvoiceArgs,
};

/// Invoice Example
#[tokio::main]
#[expect(clippy::print_stdout, reason = "Example code")]
pub async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_err| EnvFilter::new("info,verdant=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = ExampleInvoiceArgs::parse();

    let config = StoreConfig::load(&args.config)?;
    let locale = args.locale.unwrap_or(config.invoice.default_locale);

    let mut fixture = Fixture::from_set(&args.fixture)?;
    fixture.set_above_range(config.pricing.above_range);

    let cart = fixture.cart()?;

    let order = Order::place(
        OrderHeader {
            id: "2024-0042".to_string(),
            date: Zoned::now().date(),
        },
        Customer {
            name: "Erika Mustermann".to_string(),
            street: "Gartenweg 3".to_string(),
            postal_code: "26655".to_string(),
            city: "Westerstede".to_string(),
            country: None,
            email: "erika@example.org".to_string(),
            phone: None,
        },
        cart,
        args.delivery,
        args.payment,
        &config.calculator(),
    )?;

    CheckoutSummary::for_order(&order, locale)?.write_to(io::stdout())?;

    create_dir_all(&args.out)?;

    let completion = complete_order(
        &order,
        &config.company,
        locale,
        &config.logo_source(),
        &OutboxDispatch::new(&args.out),
        config.invoice.logo_timeout,
    )
    .await?;

    if let Some(warning) = &completion.warning {
        println!("Warning: {warning}");
    }

    println!(
        "Invoice {} written to {}",
        completion.invoice.file_name,
        args.out.display()
    );

    Ok(())
}
