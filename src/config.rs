//! Store configuration
//!
//! A single YAML file describes the seller, the totals policy, how prices
//! above the oldest band are handled, and where the invoice logo lives.
//!
//! ```yaml
//! company:
//!   name: Baumschule Grünfeld
//!   street: Lindenallee 12
//!   postal_code: "26655"
//!   city: Westerstede
//!   bank:
//!     bank_name: Landessparkasse
//!     iban: DE02 2805 0100 0000 1234 56
//!     bic: SLZODE22XXX
//! totals:
//!   vat_rate: 19%
//!   cod_fee: 5.00 EUR
//! pricing:
//!   above_range: clamp
//! invoice:
//!   logo_path: logo.jpg
//!   logo_timeout_ms: 2000
//!   default_locale: de
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    company::CompanyProfile,
    invoice::logo::FileLogo,
    locale::Locale,
    prices::{PriceError, parse_percentage, parse_price},
    pricing::AboveRangePolicy,
    totals::{TotalsCalculator, TotalsPolicy},
};

const DEFAULT_LOGO_TIMEOUT_MS: u64 = 2000;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A configured amount or rate is invalid.
    #[error(transparent)]
    Price(#[from] PriceError),
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    company: CompanyProfile,

    #[serde(default)]
    totals: RawTotals,

    #[serde(default)]
    pricing: PricingConfig,

    #[serde(default)]
    invoice: RawInvoice,
}

#[derive(Debug, Default, Deserialize)]
struct RawTotals {
    vat_rate: Option<String>,
    cod_fee: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawInvoice {
    logo_path: Option<PathBuf>,
    logo_timeout_ms: Option<u64>,

    #[serde(default)]
    default_locale: Locale,
}

/// Price resolution settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PricingConfig {
    /// Handling of plants older than the oldest band
    #[serde(default)]
    pub above_range: AboveRangePolicy,
}

/// Invoice rendering settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceConfig {
    /// JPEG logo; a text header is used when absent
    pub logo_path: Option<PathBuf>,

    /// How long to wait for the logo before falling back
    pub logo_timeout: Duration,

    /// Locale used when the customer has none
    pub default_locale: Locale,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            logo_path: None,
            logo_timeout: Duration::from_millis(DEFAULT_LOGO_TIMEOUT_MS),
            default_locale: Locale::default(),
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Seller printed on invoices
    pub company: CompanyProfile,

    /// VAT rate and surcharges
    pub totals: TotalsPolicy,

    /// Price resolution settings
    pub pricing: PricingConfig,

    /// Invoice rendering settings
    pub invoice: InvoiceConfig,
}

impl StoreConfig {
    /// Load configuration from a YAML file.
    ///
    /// A relative `logo_path` is resolved against the config file's directory.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_yaml(&contents)?;

        if let Some(logo) = config.invoice.logo_path.take() {
            let resolved = match path.parent() {
                Some(dir) if logo.is_relative() => dir.join(logo),
                _ => logo,
            };

            config.invoice.logo_path = Some(resolved);
        }

        Ok(config)
    }

    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the YAML or any amount is invalid.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_norway::from_str(yaml)?;
        let defaults = TotalsPolicy::default();

        let totals = TotalsPolicy {
            vat_rate: raw
                .totals
                .vat_rate
                .as_deref()
                .map(parse_percentage)
                .transpose()?
                .unwrap_or(defaults.vat_rate),
            cod_fee: raw
                .totals
                .cod_fee
                .as_deref()
                .map(parse_price)
                .transpose()?
                .unwrap_or(defaults.cod_fee),
        };

        Ok(Self {
            company: raw.company,
            totals,
            pricing: raw.pricing,
            invoice: InvoiceConfig {
                logo_path: raw.invoice.logo_path,
                logo_timeout: Duration::from_millis(
                    raw.invoice
                        .logo_timeout_ms
                        .unwrap_or(DEFAULT_LOGO_TIMEOUT_MS),
                ),
                default_locale: raw.invoice.default_locale,
            },
        })
    }

    /// Totals calculator for the configured policy.
    pub fn calculator(&self) -> TotalsCalculator {
        TotalsCalculator::new(self.totals)
    }

    /// Logo source for the configured path, if any.
    pub fn logo_source(&self) -> Option<FileLogo> {
        self.invoice.logo_path.as_ref().map(FileLogo::new)
    }
}
