//! Checkout summary
//!
//! Terminal rendering of a cart and its totals, shown before the order is
//! placed. Rows and totals come from the same builders the invoice uses.

use std::io;

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    invoice::{InvoiceError, InvoiceRow, TotalLine, column_headers, line_rows, totals_lines},
    items::CartLineItem,
    locale::Locale,
    order::Order,
    totals::{DeliveryMethod, OrderTotals},
};

/// Errors that can occur when writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// A line total could not be formatted.
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Cart rows and totals, formatted for one locale.
#[derive(Debug, Clone)]
pub struct CheckoutSummary {
    columns: [&'static str; 4],
    rows: Vec<InvoiceRow>,
    totals: Vec<TotalLine>,
}

impl CheckoutSummary {
    /// Summarize cart lines and their computed totals.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Invoice`] if a line total overflows.
    pub fn new(
        items: &[CartLineItem],
        totals: &OrderTotals,
        delivery: DeliveryMethod,
        locale: Locale,
    ) -> Result<Self, SummaryError> {
        Ok(Self {
            columns: column_headers(locale),
            rows: line_rows(items, locale)?,
            totals: totals_lines(totals, delivery, locale),
        })
    }

    /// Summarize a placed order.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Invoice`] if a line total overflows.
    pub fn for_order(order: &Order, locale: Locale) -> Result<Self, SummaryError> {
        Self::new(&order.items, &order.totals, order.delivery, locale)
    }

    /// Formatted totals, grand total last.
    pub fn totals(&self) -> &[TotalLine] {
        &self.totals
    }

    /// Write the summary table and totals.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        let mut builder = Builder::default();

        builder.push_record(self.columns);

        for row in &self.rows {
            builder.push_record([
                row.description.as_str(),
                row.quantity.as_str(),
                row.unit_price.as_str(),
                row.line_total.as_str(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| SummaryError::IO)?;

        let label_width = self
            .totals
            .iter()
            .map(|line| line.label.chars().count())
            .max()
            .unwrap_or(0);

        let value_width = self
            .totals
            .iter()
            .map(|line| line.value.chars().count())
            .max()
            .unwrap_or(0);

        for line in &self.totals {
            write_total_line(&mut out, line, label_width, value_width)?;
        }

        writeln!(out).map_err(|_err| SummaryError::IO)
    }
}

/// Right-aligned label and value columns; the grand total is bold.
fn write_total_line(
    out: &mut impl io::Write,
    line: &TotalLine,
    label_width: usize,
    value_width: usize,
) -> Result<(), SummaryError> {
    let label = format!("{:>label_width$}", line.label);
    let value = format!("{:>value_width$}", line.value);

    let written = if line.emphasized {
        writeln!(out, " \x1b[1m{label}:  {value}\x1b[0m")
    } else {
        writeln!(out, " {label}:  {value}")
    };

    written.map_err(|_err| SummaryError::IO)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        invoice::tests::order,
        totals::PaymentMethod,
    };

    use super::*;

    #[test]
    fn writes_rows_and_totals() -> TestResult {
        let order = order(PaymentMethod::Cod)?;
        let summary = CheckoutSummary::for_order(&order, Locale::De)?;

        let mut out = Vec::new();
        summary.write_to(&mut out)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Bloodgood (3 Jahre, 90 cm)"));
        assert!(text.contains("Beschreibung"));
        assert!(text.contains("Nachnahmegebühr"));
        assert!(text.contains("122,22 €"));

        Ok(())
    }

    #[test]
    fn totals_match_invoice_figures() -> TestResult {
        let order = order(PaymentMethod::BankTransfer)?;
        let summary = CheckoutSummary::for_order(&order, Locale::En)?;

        let values = summary
            .totals()
            .iter()
            .map(|line| line.value.as_str())
            .collect::<Vec<_>>();

        assert_eq!(values, ["€98.50", "free", "€18.72", "€117.22"]);

        Ok(())
    }
}
