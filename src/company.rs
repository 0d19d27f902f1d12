//! Company profile printed on invoices.

use serde::{Deserialize, Serialize};

/// Seller details.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Trading name
    pub name: String,

    /// Street and number
    pub street: String,

    /// Postal code
    pub postal_code: String,

    /// City
    pub city: String,

    /// Country
    #[serde(default)]
    pub country: Option<String>,

    /// Contact email
    #[serde(default)]
    pub email: Option<String>,

    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,

    /// VAT identification number
    #[serde(default)]
    pub vat_id: Option<String>,

    /// Account for bank transfers
    pub bank: BankDetails,
}

/// Bank account shown for bank-transfer orders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BankDetails {
    /// Bank name
    pub bank_name: String,

    /// IBAN
    pub iban: String,

    /// BIC
    pub bic: String,
}

impl CompanyProfile {
    /// Address lines, name first.
    pub fn address_lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.name.clone(),
            self.street.clone(),
            format!("{} {}", self.postal_code, self.city),
        ];

        lines.extend(self.country.clone());

        lines
    }
}
