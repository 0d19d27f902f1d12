//! Checkout completion
//!
//! Once an order is placed the invoice is rendered and handed to a
//! dispatcher (usually email). A dispatch failure never fails the checkout:
//! the rendered invoice is returned with a warning so it can still be
//! downloaded or printed.

use std::{
    fmt, io,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    company::CompanyProfile,
    invoice::{
        InvoiceError, RenderedInvoice,
        logo::{LogoSource, resolve_logo},
        render,
    },
    locale::Locale,
    order::Order,
};

/// Errors raised by an invoice dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The customer has no usable address.
    #[error("no recipient address for order {0}")]
    NoRecipient(String),

    /// The transport refused the message.
    #[error("invoice was rejected: {0}")]
    Rejected(String),

    /// Writing the invoice failed.
    #[error("failed to write invoice to {path}: {source}")]
    Io {
        /// Target path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
}

/// Delivers a rendered invoice to the customer.
pub trait InvoiceDispatch {
    /// Send the invoice for `order`.
    async fn send(&self, order: &Order, invoice: &RenderedInvoice) -> Result<(), DispatchError>;
}

/// Writes invoices into an outbox directory for a mailer to pick up.
#[derive(Debug, Clone)]
pub struct OutboxDispatch {
    dir: PathBuf,
}

impl OutboxDispatch {
    /// Outbox rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Outbox directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), DispatchError> {
        let path = self.dir.join(name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| DispatchError::Io { path, source })
    }
}

impl InvoiceDispatch for OutboxDispatch {
    async fn send(&self, order: &Order, invoice: &RenderedInvoice) -> Result<(), DispatchError> {
        if order.customer.email.trim().is_empty() {
            return Err(DispatchError::NoRecipient(order.header.id.clone()));
        }

        let html_name = invoice
            .file_name
            .strip_suffix(".pdf")
            .map_or_else(|| format!("{}.html", invoice.file_name), |stem| format!("{stem}.html"));

        self.write(&invoice.file_name, &invoice.pdf).await?;
        self.write(&html_name, invoice.html.as_bytes()).await?;

        debug!(
            order = %order.header.id,
            recipient = %order.customer.email,
            outbox = %self.dir.display(),
            "queued invoice"
        );

        Ok(())
    }
}

/// Something the customer should be told after checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionWarning {
    /// The invoice could not be sent; it is still available for download.
    DispatchFailed(String),
}

impl fmt::Display for CompletionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionWarning::DispatchFailed(reason) => {
                write!(f, "invoice could not be sent: {reason}")
            }
        }
    }
}

/// Result of completing a checkout.
#[derive(Debug, Clone)]
pub struct OrderCompletion {
    /// Rendered invoice, always available
    pub invoice: RenderedInvoice,

    /// Set when dispatch failed
    pub warning: Option<CompletionWarning>,
}

impl OrderCompletion {
    /// Whether the invoice reached the dispatcher.
    pub fn dispatched(&self) -> bool {
        self.warning.is_none()
    }
}

/// Render the invoice for a placed order and dispatch it.
///
/// The logo is resolved first and falls back to a text header on failure or
/// timeout.
///
/// # Errors
///
/// Returns an [`InvoiceError`] only if the invoice cannot be rendered.
/// Dispatch failures are reported through [`OrderCompletion::warning`].
pub async fn complete_order<S, D>(
    order: &Order,
    company: &CompanyProfile,
    locale: Locale,
    logo_source: &S,
    dispatch: &D,
    logo_timeout: Duration,
) -> Result<OrderCompletion, InvoiceError>
where
    S: LogoSource,
    D: InvoiceDispatch,
{
    let logo = resolve_logo(logo_source, logo_timeout).await;
    let invoice = render(order, company, locale, logo.as_ref())?;

    let warning = match dispatch.send(order, &invoice).await {
        Ok(()) => None,
        Err(err) => {
            warn!(
                order = %order.header.id,
                error = %err,
                "invoice dispatch failed; invoice remains available for download"
            );

            Some(CompletionWarning::DispatchFailed(err.to_string()))
        }
    };

    Ok(OrderCompletion { invoice, warning })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        invoice::{
            logo::NoLogo,
            tests::{company, order},
        },
        totals::PaymentMethod,
    };

    use super::*;

    struct Refusing;

    impl InvoiceDispatch for Refusing {
        async fn send(
            &self,
            _order: &Order,
            _invoice: &RenderedInvoice,
        ) -> Result<(), DispatchError> {
            Err(DispatchError::Rejected("mailbox full".to_string()))
        }
    }

    #[tokio::test]
    async fn dispatch_failure_is_a_warning() -> TestResult {
        let order = order(PaymentMethod::BankTransfer)?;

        let completion = complete_order(
            &order,
            &company(),
            Locale::De,
            &NoLogo,
            &Refusing,
            Duration::from_secs(1),
        )
        .await?;

        assert!(!completion.dispatched());
        assert_eq!(
            completion.warning,
            Some(CompletionWarning::DispatchFailed(
                "invoice was rejected: mailbox full".to_string()
            ))
        );
        assert_eq!(completion.invoice.file_name, "invoice_2024-0042.pdf");
        assert!(completion.invoice.pdf.starts_with(b"%PDF"));

        Ok(())
    }

    #[tokio::test]
    async fn outbox_receives_pdf_and_html() -> TestResult {
        let dir = tempfile::tempdir()?;
        let order = order(PaymentMethod::Cod)?;

        let completion = complete_order(
            &order,
            &company(),
            Locale::En,
            &NoLogo,
            &OutboxDispatch::new(dir.path()),
            Duration::from_secs(1),
        )
        .await?;

        assert!(completion.dispatched());
        assert_eq!(
            std::fs::read(dir.path().join("invoice_2024-0042.pdf"))?,
            completion.invoice.pdf
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("invoice_2024-0042.html"))?,
            completion.invoice.html
        );

        Ok(())
    }

    #[tokio::test]
    async fn order_id_with_separators_stays_in_outbox() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut order = order(PaymentMethod::BankTransfer)?;
        order.header.id = "2024/0042".to_string();

        let completion = complete_order(
            &order,
            &company(),
            Locale::De,
            &NoLogo,
            &OutboxDispatch::new(dir.path()),
            Duration::from_secs(1),
        )
        .await?;

        assert!(completion.dispatched());
        assert_eq!(completion.invoice.file_name, "invoice_2024_0042.pdf");
        assert!(dir.path().join("invoice_2024_0042.pdf").is_file());
        assert!(dir.path().join("invoice_2024_0042.html").is_file());

        Ok(())
    }

    #[tokio::test]
    async fn missing_outbox_is_a_warning() -> TestResult {
        let order = order(PaymentMethod::Cod)?;

        let completion = complete_order(
            &order,
            &company(),
            Locale::En,
            &NoLogo,
            &OutboxDispatch::new("/nonexistent/verdant/outbox"),
            Duration::from_secs(1),
        )
        .await?;

        assert!(matches!(
            completion.warning,
            Some(CompletionWarning::DispatchFailed(_))
        ));
        assert!(!completion.invoice.html.is_empty());

        Ok(())
    }
}
