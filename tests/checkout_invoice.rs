//! Order totals and invoice rendering over the `nursery` fixture set.
//!
//! The fixture cart holds two three-year-old Bloodgood maples at 45.00 and a
//! bag of potting soil at 8.50.

use std::{io::Write, time::Duration};

use jiff::civil::date;
use testresult::TestResult;

use verdant::{
    checkout::{DispatchError, InvoiceDispatch, OutboxDispatch, complete_order},
    company::{BankDetails, CompanyProfile},
    fixtures::Fixture,
    invoice::{
        RenderedInvoice,
        logo::{FileLogo, NoLogo},
        pdf::encode_text,
        render,
    },
    locale::Locale,
    order::{Customer, Order, OrderHeader},
    prices::eur,
    totals::{DeliveryMethod, PaymentMethod, TotalsCalculator, TotalsPolicy},
};

const LOGO_TIMEOUT: Duration = Duration::from_secs(5);

fn company() -> CompanyProfile {
    CompanyProfile {
        name: "Baumschule Grünfeld".to_string(),
        street: "Lindenallee 12".to_string(),
        postal_code: "26655".to_string(),
        city: "Westerstede".to_string(),
        country: None,
        email: None,
        phone: None,
        vat_id: None,
        bank: BankDetails {
            bank_name: "Landessparkasse".to_string(),
            iban: "DE02 2805 0100 0000 1234 56".to_string(),
            bic: "SLZODE22XXX".to_string(),
        },
    }
}

fn place(payment: PaymentMethod) -> TestResult<Order> {
    let fixture = Fixture::from_set("nursery")?;

    let order = Order::place(
        OrderHeader {
            id: "2024-0042".to_string(),
            date: date(2024, 6, 15),
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
        fixture.cart()?,
        DeliveryMethod::Pickup,
        payment,
        &TotalsCalculator::default(),
    )?;

    Ok(order)
}

/// SOI, APP0 and a baseline frame header; enough for the logo loader.
fn tiny_jpeg(width: u16, height: u16) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    bytes.extend_from_slice(b"JFIF\0");
    bytes.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
    bytes.extend_from_slice(&[0xFF, 0xD9]);

    bytes
}

fn pdf_text(invoice: &RenderedInvoice) -> String {
    String::from_utf8_lossy(&invoice.pdf).into_owned()
}

#[test]
fn bank_transfer_totals() -> TestResult {
    let order = place(PaymentMethod::BankTransfer)?;

    assert_eq!(order.totals.subtotal, eur(9850));
    assert_eq!(order.totals.vat_amount, eur(1872));
    assert_eq!(order.totals.delivery_fee, eur(0));
    assert_eq!(order.totals.cod_fee, eur(0));
    assert_eq!(order.totals.total, eur(11722));

    Ok(())
}

#[test]
fn cash_on_delivery_adds_flat_fee_after_vat() -> TestResult {
    let order = place(PaymentMethod::Cod)?;

    assert_eq!(order.totals.vat_amount, eur(1872));
    assert_eq!(order.totals.cod_fee, eur(500));
    assert_eq!(order.totals.total, eur(12222));

    Ok(())
}

#[test]
fn html_and_pdf_agree_in_both_locales() -> TestResult {
    let order = place(PaymentMethod::BankTransfer)?;

    let de = render(&order, &company(), Locale::De, None)?;
    let en = render(&order, &company(), Locale::En, None)?;

    assert_eq!(de.file_name, "invoice_2024-0042.pdf");
    assert_eq!(en.file_name, de.file_name);

    for (invoice, total, header, notice) in [
        (&de, "117,22 €", "Einzelpreis", "Verwendungszweck"),
        (&en, "€117.22", "Unit price", "Reference"),
    ] {
        assert!(invoice.html.contains(total), "html misses {total}");
        assert!(invoice.html.contains(header));
        assert!(invoice.html.contains(notice));

        let pdf = pdf_text(invoice);

        assert!(pdf.contains(&encode_text(total)), "pdf misses {total}");
        assert!(pdf.contains(&encode_text(header)));
        assert!(pdf.contains(&encode_text(notice)));
        assert!(pdf.contains("DE02 2805 0100 0000 1234 56"));
    }

    assert!(!de.html.contains("Unit price"));
    assert!(!en.html.contains("Einzelpreis"));

    Ok(())
}

#[test]
fn payment_text_follows_payment_method() -> TestResult {
    let cod = render(&place(PaymentMethod::Cod)?, &company(), Locale::En, None)?;
    let card = render(&place(PaymentMethod::CreditCard)?, &company(), Locale::De, None)?;

    assert!(cod.html.contains("Payment is due in cash on delivery."));
    assert!(cod.html.contains("Cash on delivery fee"));
    assert!(cod.html.contains("€122.22"));
    assert!(!cod.html.contains("DE02 2805"));

    assert!(card.html.contains("Kreditkarte"));
    assert!(!card.html.contains("Nachnahmegebühr"));
    assert!(!card.html.contains("Verwendungszweck"));

    Ok(())
}

#[test]
fn rendering_is_idempotent() -> TestResult {
    let order = place(PaymentMethod::BankTransfer)?;

    let first = render(&order, &company(), Locale::De, None)?;
    let second = render(&order, &company(), Locale::De, None)?;

    assert_eq!(first.html, second.html);
    assert_eq!(first.pdf, second.pdf);

    Ok(())
}

#[test]
fn stored_order_renders_the_same_invoice() -> TestResult {
    let order = place(PaymentMethod::Cod)?;
    let json = order.to_json()?;
    let restored = Order::from_json(&json, &TotalsPolicy::default())?;

    let original = render(&order, &company(), Locale::De, None)?;
    let reloaded = render(&restored, &company(), Locale::De, None)?;

    assert_eq!(original.html, reloaded.html);
    assert_eq!(original.pdf, reloaded.pdf);

    Ok(())
}

#[tokio::test]
async fn missing_logo_falls_back_to_text_header() -> TestResult {
    let order = place(PaymentMethod::BankTransfer)?;
    let outbox = tempfile::tempdir()?;

    let completion = complete_order(
        &order,
        &company(),
        Locale::De,
        &FileLogo::new("/nonexistent/verdant/logo.jpg"),
        &OutboxDispatch::new(outbox.path()),
        LOGO_TIMEOUT,
    )
    .await?;

    assert!(completion.dispatched());
    assert!(!completion.invoice.html.contains("<img"));
    assert!(completion.invoice.html.contains("Baumschule Grünfeld"));
    assert!(!pdf_text(&completion.invoice).contains("/Im1"));
    assert!(outbox.path().join("invoice_2024-0042.pdf").exists());
    assert!(outbox.path().join("invoice_2024-0042.html").exists());

    Ok(())
}

#[tokio::test]
async fn logo_is_embedded_in_both_forms() -> TestResult {
    let order = place(PaymentMethod::BankTransfer)?;
    let outbox = tempfile::tempdir()?;

    let mut logo = tempfile::NamedTempFile::new()?;
    logo.write_all(&tiny_jpeg(200, 60))?;

    let completion = complete_order(
        &order,
        &company(),
        Locale::En,
        &FileLogo::new(logo.path()),
        &OutboxDispatch::new(outbox.path()),
        LOGO_TIMEOUT,
    )
    .await?;

    assert!(completion.invoice.html.contains("data:image/jpeg;base64,"));

    let pdf = pdf_text(&completion.invoice);

    assert!(pdf.contains("/Subtype /Image"));
    assert!(pdf.contains("/Filter /DCTDecode"));

    Ok(())
}

#[tokio::test]
async fn failed_dispatch_still_returns_the_invoice() -> TestResult {
    struct Offline;

    impl InvoiceDispatch for Offline {
        async fn send(&self, _order: &Order, _invoice: &RenderedInvoice) -> Result<(), DispatchError> {
            Err(DispatchError::Rejected("smtp unreachable".to_string()))
        }
    }

    let order = place(PaymentMethod::BankTransfer)?;

    let completion =
        complete_order(&order, &company(), Locale::De, &NoLogo, &Offline, LOGO_TIMEOUT).await?;

    assert!(!completion.dispatched());
    assert!(completion.invoice.html.contains("117,22 €"));
    assert_eq!(
        completion.warning.map(|warning| warning.to_string()),
        Some("invoice could not be sent: invoice was rejected: smtp unreachable".to_string())
    );

    Ok(())
}
