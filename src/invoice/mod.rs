//! Invoice
//!
//! An [`InvoiceDocument`] is a layout-neutral rendering of an order: every
//! figure is already formatted, every label already localized. The HTML and
//! PDF renderers only place these strings, so the two forms cannot disagree.
//!
//! Totals are taken from the order as they are. Nothing here re-derives a
//! subtotal, VAT or grand total.
//!
//! Free text (names, addresses, bank details) passes through [`printable`]
//! first, so characters the PDF fonts lack are replaced the same way in both
//! forms.

use smallvec::{SmallVec, smallvec};
use thiserror::Error;
use tracing::warn;

use crate::{
    company::CompanyProfile,
    format::{format_date, format_money, format_percent},
    items::{CartLineItem, LineItemKind},
    locale::Locale,
    order::Order,
    prices::PriceError,
    totals::{DeliveryMethod, OrderTotals, PaymentMethod},
};

pub mod html;
pub mod logo;
pub mod pdf;

use logo::Logo;

/// Errors that can occur when building an invoice.
#[derive(Debug, Error, PartialEq)]
pub enum InvoiceError {
    /// A line total could not be computed.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// One row of the four-column line-item table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRow {
    /// Item description
    pub description: String,

    /// Quantity
    pub quantity: String,

    /// Formatted unit price
    pub unit_price: String,

    /// Formatted line total
    pub line_total: String,
}

/// A label/value line of the totals block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalLine {
    /// Localized label
    pub label: String,

    /// Formatted amount or policy text
    pub value: String,

    /// Rendered bold (grand total)
    pub emphasized: bool,
}

/// Payment instructions selected by payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentBlock {
    /// Block heading
    pub heading: &'static str,

    /// Lines of the block
    pub lines: SmallVec<[String; 5]>,
}

/// Layout-neutral invoice content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDocument {
    /// Locale the content is written in
    pub locale: Locale,

    /// Document title
    pub title: &'static str,

    /// Order number
    pub order_id: String,

    /// Order number and date as label/value pairs
    pub meta: Vec<(&'static str, String)>,

    /// Seller name
    pub company_name: String,

    /// Seller address and contact lines
    pub company_lines: Vec<String>,

    /// Heading above the customer block
    pub customer_heading: &'static str,

    /// Customer address lines
    pub customer_lines: Vec<String>,

    /// Localized column headers
    pub columns: [&'static str; 4],

    /// Line items
    pub rows: Vec<InvoiceRow>,

    /// Totals block, grand total last
    pub totals: Vec<TotalLine>,

    /// Payment instructions, absent for unknown payment methods
    pub payment: Option<PaymentBlock>,

    /// Closing line
    pub closing: &'static str,
}

impl InvoiceDocument {
    /// Build the invoice content for an order.
    ///
    /// # Errors
    ///
    /// Returns an [`InvoiceError`] if a line total overflows.
    pub fn new(
        order: &Order,
        company: &CompanyProfile,
        locale: Locale,
    ) -> Result<Self, InvoiceError> {
        let labels = locale.labels();

        let mut company_lines = company.address_lines().into_iter().skip(1).collect::<Vec<_>>();
        company_lines.extend(company.email.clone());
        company_lines.extend(company.phone.clone());
        company_lines.extend(
            company
                .vat_id
                .as_ref()
                .map(|vat_id| format!("{} {vat_id}", labels.vat_id)),
        );

        let customer = &order.customer;
        let mut customer_lines = vec![
            customer.name.clone(),
            customer.street.clone(),
            format!("{} {}", customer.postal_code, customer.city),
        ];
        customer_lines.extend(customer.country.clone());
        customer_lines.push(customer.email.clone());

        let payment = payment_block(order.payment, &order.header.id, company, locale);

        if payment.is_none() {
            warn!(
                order = %order.header.id,
                payment = %order.payment,
                "unrecognized payment method; invoice has no payment block"
            );
        }

        let order_id = printable(&order.header.id);

        Ok(Self {
            locale,
            title: labels.invoice,
            order_id: order_id.clone(),
            meta: vec![
                (labels.order_number, order_id),
                (labels.date, format_date(order.header.date, locale)),
            ],
            company_name: printable(&company.name),
            company_lines: company_lines.iter().map(|line| printable(line)).collect(),
            customer_heading: labels.bill_to,
            customer_lines: customer_lines.iter().map(|line| printable(line)).collect(),
            columns: column_headers(locale),
            rows: line_rows(&order.items, locale)?,
            totals: totals_lines(&order.totals, order.delivery, locale),
            payment,
            closing: labels.thank_you,
        })
    }

    /// The grand total line.
    pub fn grand_total(&self) -> Option<&TotalLine> {
        self.totals.last()
    }
}

/// Rendered invoice in both forms.
#[derive(Debug, Clone)]
pub struct RenderedInvoice {
    /// Download name of the PDF, `invoice_<order id>.pdf`
    pub file_name: String,

    /// Printable HTML
    pub html: String,

    /// PDF bytes
    pub pdf: Vec<u8>,
}

/// Render an order as HTML and PDF.
///
/// Without a logo both forms fall back to a text header.
///
/// # Errors
///
/// Returns an [`InvoiceError`] if the invoice content cannot be built.
pub fn render(
    order: &Order,
    company: &CompanyProfile,
    locale: Locale,
    logo: Option<&Logo>,
) -> Result<RenderedInvoice, InvoiceError> {
    let document = InvoiceDocument::new(order, company, locale)?;

    Ok(RenderedInvoice {
        file_name: order.invoice_file_name(),
        html: html::render_html(&document, logo),
        pdf: pdf::render_pdf(&document, logo),
    })
}

/// Localized headers of the line-item table, in fixed order.
pub fn column_headers(locale: Locale) -> [&'static str; 4] {
    let labels = locale.labels();

    [
        labels.description,
        labels.quantity,
        labels.unit_price,
        labels.line_total,
    ]
}

/// Table rows for line items.
///
/// # Errors
///
/// Returns [`InvoiceError::Price`] if a line total overflows.
pub fn line_rows(items: &[CartLineItem], locale: Locale) -> Result<Vec<InvoiceRow>, InvoiceError> {
    items
        .iter()
        .map(|item| {
            Ok(InvoiceRow {
                description: item_description(item, locale),
                quantity: item.quantity.to_string(),
                unit_price: format_money(&item.unit_price, locale),
                line_total: format_money(&item.line_total()?, locale),
            })
        })
        .collect()
}

/// Totals block lines: subtotal, delivery, VAT, optional COD fee, total.
pub fn totals_lines(
    totals: &OrderTotals,
    delivery: DeliveryMethod,
    locale: Locale,
) -> Vec<TotalLine> {
    let labels = locale.labels();

    let mut lines = vec![
        TotalLine {
            label: labels.subtotal.to_string(),
            value: format_money(&totals.subtotal, locale),
            emphasized: false,
        },
        TotalLine {
            label: labels.delivery.to_string(),
            value: delivery_text(totals, delivery, locale),
            emphasized: false,
        },
        TotalLine {
            label: format!("{} {}", labels.vat, format_percent(totals.vat_rate, locale)),
            value: format_money(&totals.vat_amount, locale),
            emphasized: false,
        },
    ];

    if totals.cod_fee.to_minor_units() != 0 {
        lines.push(TotalLine {
            label: labels.cod_fee.to_string(),
            value: format_money(&totals.cod_fee, locale),
            emphasized: false,
        });
    }

    lines.push(TotalLine {
        label: labels.total.to_string(),
        value: format_money(&totals.total, locale),
        emphasized: true,
    });

    lines
}

/// Delivery line text. A zero fee prints the policy text, anything else the amount.
pub fn delivery_text(totals: &OrderTotals, delivery: DeliveryMethod, locale: Locale) -> String {
    let labels = locale.labels();

    if totals.delivery_fee.to_minor_units() != 0 {
        return format_money(&totals.delivery_fee, locale);
    }

    match delivery {
        DeliveryMethod::Pickup => labels.delivery_free.to_string(),
        DeliveryMethod::Delivery => labels.delivery_by_arrangement.to_string(),
    }
}

/// Payment instructions for a payment method; `None` for unknown methods.
pub fn payment_block(
    payment: PaymentMethod,
    order_id: &str,
    company: &CompanyProfile,
    locale: Locale,
) -> Option<PaymentBlock> {
    let labels = locale.labels();

    let lines: SmallVec<[String; 5]> = match payment {
        PaymentMethod::BankTransfer => smallvec![
            labels.bank_transfer_notice.to_string(),
            format!("{}: {}", labels.bank, company.bank.bank_name),
            format!("{}: {}", labels.iban, company.bank.iban),
            format!("{}: {}", labels.bic, company.bank.bic),
            format!("{}: {order_id}", labels.reference),
        ],
        PaymentMethod::Cod => smallvec![labels.cod_notice.to_string()],
        PaymentMethod::CreditCard => smallvec![labels.credit_card_notice.to_string()],
        PaymentMethod::Unknown => return None,
    };

    Some(PaymentBlock {
        heading: labels.payment_information,
        lines: lines.iter().map(|line| printable(line)).collect(),
    })
}

fn item_description(item: &CartLineItem, locale: Locale) -> String {
    let description = match &item.kind {
        LineItemKind::Plant { age, height_cm, .. } => {
            let years = locale.labels().years;

            match height_cm {
                Some(height) => format!("{} ({age} {years}, {height} cm)", item.name),
                None => format!("{} ({age} {years})", item.name),
            }
        }
        LineItemKind::Product => item.name.clone(),
    };

    printable(&description)
}

/// Text as both invoice forms print it.
///
/// Characters outside the PDF font encoding become their base letter
/// (`ō` prints as `o`). Combining accents are dropped and anything else
/// becomes `?`.
pub fn printable(text: &str) -> String {
    text.chars()
        .filter_map(|ch| match pdf::win_ansi(ch) {
            Some(_) => Some(ch),
            None => fold(ch),
        })
        .collect()
}

/// Plain-letter spelling of a Latin Extended-A character.
fn fold(ch: char) -> Option<char> {
    let folded = match ch {
        '\u{300}'..='\u{36f}' => return None,
        'Ā' | 'Ă' | 'Ą' => 'A',
        'ā' | 'ă' | 'ą' => 'a',
        'Ć' | 'Ĉ' | 'Ċ' | 'Č' => 'C',
        'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'Ď' | 'Đ' => 'D',
        'ď' | 'đ' => 'd',
        'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => 'E',
        'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => 'G',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'Ĥ' | 'Ħ' => 'H',
        'ĥ' | 'ħ' => 'h',
        'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => 'I',
        'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'Ĵ' => 'J',
        'ĵ' => 'j',
        'Ķ' => 'K',
        'ķ' | 'ĸ' => 'k',
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' => 'L',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'Ń' | 'Ņ' | 'Ň' | 'Ŋ' => 'N',
        'ń' | 'ņ' | 'ň' | 'ŉ' | 'ŋ' => 'n',
        'Ō' | 'Ŏ' | 'Ő' => 'O',
        'ō' | 'ŏ' | 'ő' => 'o',
        'Ŕ' | 'Ŗ' | 'Ř' => 'R',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'Ś' | 'Ŝ' | 'Ş' => 'S',
        'ś' | 'ŝ' | 'ş' | 'ſ' => 's',
        'Ţ' | 'Ť' | 'Ŧ' => 'T',
        'ţ' | 'ť' | 'ŧ' => 't',
        'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => 'U',
        'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'Ŵ' => 'W',
        'ŵ' => 'w',
        'Ŷ' => 'Y',
        'ŷ' => 'y',
        'Ź' | 'Ż' => 'Z',
        'ź' | 'ż' => 'z',
        '\u{2010}' | '\u{2011}' | '\u{2212}' => '-',
        '\u{2009}' | '\u{202f}' => ' ',
        _ => '?',
    };

    Some(folded)
}
