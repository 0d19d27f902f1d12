//! Verdant prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError},
    catalog::{Catalog, Cultivar, CultivarKey, Plant, PlantKey, Product, ProductKey},
    checkout::{
        CompletionWarning, DispatchError, InvoiceDispatch, OrderCompletion, OutboxDispatch,
        complete_order,
    },
    company::{BankDetails, CompanyProfile},
    config::{ConfigError, StoreConfig},
    format::{format_date, format_money, format_percent},
    invoice::{
        InvoiceDocument, InvoiceError, RenderedInvoice,
        logo::{FileLogo, Logo, LogoError, LogoSource, NoLogo, resolve_logo},
        render,
    },
    items::{CartLineItem, LineItemKind},
    locale::Locale,
    order::{Customer, Order, OrderError, OrderHeader},
    prices::{Price, PriceError, eur},
    pricing::{
        AboveRangePolicy, AgeYears, PriceBand, PriceGroup, PriceLookup, PriceRange, PriceTable,
        PriceTableError, Unavailable,
    },
    summary::{CheckoutSummary, SummaryError},
    totals::{
        DeliveryMethod, OrderTotals, PaymentMethod, TotalsCalculator, TotalsError, TotalsPolicy,
        compute_totals,
    },
};
