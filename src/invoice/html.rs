//! Printable HTML invoice.

use std::fmt::Write;

use base64::{Engine, engine::general_purpose::STANDARD};

use super::{InvoiceDocument, logo::Logo};

const STYLE: &str = "\
body{font-family:Helvetica,Arial,sans-serif;font-size:10pt;color:#222;margin:2em}\
header{display:flex;justify-content:space-between;align-items:flex-start}\
.logo{max-height:60px}\
.brand{font-size:18pt;font-weight:bold;color:#2f5d2f}\
.seller p,.customer p{margin:0}\
h1{font-size:16pt;margin:1.5em 0 .5em}\
table{width:100%;border-collapse:collapse;margin-top:1em}\
th,td{padding:4px 6px;border-bottom:1px solid #ccc}\
th{text-align:left;background:#eef3ee}\
.num{text-align:right;white-space:nowrap}\
.totals{width:auto;margin-left:auto}\
.totals .grand td{font-weight:bold;border-top:2px solid #222}\
.payment{margin-top:2em}\
@media print{body{margin:0}}";

/// Render the invoice as a standalone HTML page.
pub fn render_html(document: &InvoiceDocument, logo: Option<&Logo>) -> String {
    let mut out = String::with_capacity(4096);

    _ = writeln!(out, "<!DOCTYPE html>");
    _ = writeln!(out, "<html lang=\"{}\">", document.locale.tag());
    _ = writeln!(out, "<head>");
    _ = writeln!(out, "<meta charset=\"utf-8\">");
    _ = writeln!(
        out,
        "<title>{} {}</title>",
        escape(document.title),
        escape(&document.order_id)
    );
    _ = writeln!(out, "<style>{STYLE}</style>");
    _ = writeln!(out, "</head>");
    _ = writeln!(out, "<body>");

    _ = writeln!(out, "<header>");
    match logo {
        Some(logo) => {
            _ = writeln!(
                out,
                "<img class=\"logo\" alt=\"{}\" src=\"data:{};base64,{}\">",
                escape(&document.company_name),
                logo.mime_type(),
                STANDARD.encode(logo.bytes())
            );
        }
        None => {
            _ = writeln!(
                out,
                "<div class=\"brand\">{}</div>",
                escape(&document.company_name)
            );
        }
    }
    _ = writeln!(out, "<div class=\"seller\">");
    for line in &document.company_lines {
        _ = writeln!(out, "<p>{}</p>", escape(line));
    }
    _ = writeln!(out, "</div>");
    _ = writeln!(out, "</header>");

    _ = writeln!(out, "<h1>{}</h1>", escape(document.title));
    _ = writeln!(out, "<table class=\"meta\">");
    for (label, value) in &document.meta {
        _ = writeln!(
            out,
            "<tr><th>{}</th><td>{}</td></tr>",
            escape(label),
            escape(value)
        );
    }
    _ = writeln!(out, "</table>");

    _ = writeln!(out, "<section class=\"customer\">");
    _ = writeln!(out, "<h2>{}</h2>", escape(document.customer_heading));
    for line in &document.customer_lines {
        _ = writeln!(out, "<p>{}</p>", escape(line));
    }
    _ = writeln!(out, "</section>");

    let [description, quantity, unit_price, line_total] = document.columns;

    _ = writeln!(out, "<table class=\"items\">");
    _ = writeln!(
        out,
        "<thead><tr><th>{}</th><th class=\"num\">{}</th><th class=\"num\">{}</th><th class=\"num\">{}</th></tr></thead>",
        escape(description),
        escape(quantity),
        escape(unit_price),
        escape(line_total)
    );
    _ = writeln!(out, "<tbody>");
    for row in &document.rows {
        _ = writeln!(
            out,
            "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
            escape(&row.description),
            escape(&row.quantity),
            escape(&row.unit_price),
            escape(&row.line_total)
        );
    }
    _ = writeln!(out, "</tbody>");
    _ = writeln!(out, "</table>");

    _ = writeln!(out, "<table class=\"totals\">");
    for line in &document.totals {
        let class = if line.emphasized { " class=\"grand\"" } else { "" };

        _ = writeln!(
            out,
            "<tr{class}><td>{}</td><td class=\"num\">{}</td></tr>",
            escape(&line.label),
            escape(&line.value)
        );
    }
    _ = writeln!(out, "</table>");

    if let Some(payment) = &document.payment {
        _ = writeln!(out, "<section class=\"payment\">");
        _ = writeln!(out, "<h2>{}</h2>", escape(payment.heading));
        for line in &payment.lines {
            _ = writeln!(out, "<p>{}</p>", escape(line));
        }
        _ = writeln!(out, "</section>");
    }

    _ = writeln!(out, "<footer><p>{}</p></footer>", escape(document.closing));
    _ = writeln!(out, "</body>");
    _ = writeln!(out, "</html>");

    out
}

/// Escape text for element content and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }

    out
}
