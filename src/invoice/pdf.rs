//! PDF invoice.
//!
//! Writes a minimal PDF 1.4 file by hand: the base-14 Helvetica faces in
//! WinAnsiEncoding, uncompressed content streams, and the logo embedded as a
//! DCT image. Output carries no timestamps, so the same document always
//! produces the same bytes.
//!
//! Line items flow over as many A4 pages as they need. Descriptions wider
//! than their column wrap onto extra lines. The table header is
//! repeated on each page, the totals and payment block follow the last row,
//! and every page carries an `n / total` footer.

use std::fmt::Write;

use super::{InvoiceDocument, logo::Logo};

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const RIGHT: f32 = PAGE_WIDTH - MARGIN;
const BOTTOM: f32 = 70.0;
const ROW_HEIGHT: f32 = 16.0;
const LINE_HEIGHT: f32 = 13.0;

const QUANTITY_RIGHT: f32 = 350.0;
const UNIT_PRICE_RIGHT: f32 = 450.0;
const DESCRIPTION_WIDTH: f32 = 240.0;
const TOTALS_LABEL_X: f32 = 320.0;

const LOGO_MAX_WIDTH: f32 = 200.0;
const LOGO_MAX_HEIGHT: f32 = 50.0;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, //
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, //
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, //
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for ASCII 32..=126.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, //
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, //
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, //
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            Font::Regular => &HELVETICA,
            Font::Bold => &HELVETICA_BOLD,
        }
    }

    fn char_width(self, ch: char) -> u16 {
        let ch = base_letter(ch);

        match ch {
            ' '..='~' => {
                let idx = usize::from(u8::try_from(ch).unwrap_or(b'?') - b' ');

                self.widths().get(idx).copied().unwrap_or(556)
            }
            '…' | '‰' | '™' | 'Œ' | 'Æ' | '—' => 1000,
            'œ' => 944,
            'æ' => 889,
            'ß' => 611,
            '•' => 350,
            '“' | '”' | '„' => 333,
            '‘' | '’' | '‚' => 222,
            _ => 556,
        }
    }

    /// Width of `text` in points at `size`.
    fn measure(self, text: &str, size: f32) -> f32 {
        text.chars()
            .map(|ch| f32::from(self.char_width(ch)))
            .sum::<f32>()
            * size
            / 1000.0
    }
}

/// Accented Latin-1 letters share the advance width of their base letter.
fn base_letter(ch: char) -> char {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        'Š' => 'S',
        'š' => 's',
        'Ž' => 'Z',
        'ž' => 'z',
        'Ý' | 'Ÿ' => 'Y',
        'ý' | 'ÿ' => 'y',
        '\u{a0}' => ' ',
        _ => ch,
    }
}

/// WinAnsiEncoding byte for a character, if the fonts can show it.
pub(crate) fn win_ansi(ch: char) -> Option<u8> {
    let byte = match ch {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => match u8::try_from(ch) {
            Ok(byte @ (0x20..=0x7E | 0xA0..=0xFF)) => byte,
            _ => return None,
        },
    };

    Some(byte)
}

/// Encode text as the body of a PDF literal string.
///
/// Bytes outside printable ASCII are written as octal escapes so content
/// streams stay 7-bit.
pub fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for ch in text.chars() {
        match win_ansi(ch).unwrap_or(b'?') {
            byte @ (b'(' | b')' | b'\\') => {
                out.push('\\');
                out.push(char::from(byte));
            }
            byte @ 0x20..=0x7E => out.push(char::from(byte)),
            byte => {
                _ = write!(out, "\\{byte:03o}");
            }
        }
    }

    out
}

/// Break `text` into lines no wider than `max_width`.
///
/// Lines break between words; a single word wider than a line is split
/// between characters. Always yields at least one line.
fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };

        if font.measure(&candidate, size) <= max_width {
            line = candidate;
            continue;
        }

        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }

        for ch in word.chars() {
            line.push(ch);

            if font.measure(&line, size) > max_width && line.chars().count() > 1 {
                line.pop();
                lines.push(std::mem::take(&mut line));
                line.push(ch);
            }
        }
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }

    lines
}

/// Logo placement on the first page.
#[derive(Debug, Clone, Copy)]
struct LogoBox {
    width: f32,
    height: f32,
}

impl LogoBox {
    fn for_logo(logo: &Logo) -> Self {
        let width = f32::from(logo.width());
        let height = f32::from(logo.height());
        let scale = (LOGO_MAX_WIDTH / width).min(LOGO_MAX_HEIGHT / height);

        Self {
            width: width * scale,
            height: height * scale,
        }
    }
}

/// Lays the document out into page content streams.
struct Layout<'a> {
    document: &'a InvoiceDocument,
    logo: Option<LogoBox>,
    pages: Vec<String>,
    current: String,
    y: f32,
}

impl<'a> Layout<'a> {
    fn new(document: &'a InvoiceDocument, logo: Option<LogoBox>) -> Self {
        Self {
            document,
            logo,
            pages: Vec::new(),
            current: String::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn text(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str) {
        _ = writeln!(
            self.current,
            "BT /{} {size:.1} Tf {x:.2} {y:.2} Td ({}) Tj ET",
            font.resource(),
            encode_text(text)
        );
    }

    fn text_right(&mut self, font: Font, size: f32, right: f32, y: f32, text: &str) {
        let x = right - font.measure(text, size);

        self.text(font, size, x, y, text);
    }

    fn rule(&mut self, y: f32, x0: f32, width: f32) {
        _ = writeln!(
            self.current,
            "{width:.1} w {x0:.2} {y:.2} m {RIGHT:.2} {y:.2} l S"
        );
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);

        let heading = format!("{} {}", self.document.title, self.document.order_id);
        self.text(Font::Bold, 10.0, MARGIN, PAGE_HEIGHT - MARGIN, &heading);

        self.y = PAGE_HEIGHT - MARGIN - 30.0;
    }

    fn first_page_header(&mut self) {
        let document = self.document;
        let top = PAGE_HEIGHT - MARGIN;

        match self.logo {
            Some(logo) => {
                _ = writeln!(
                    self.current,
                    "q {:.2} 0 0 {:.2} {MARGIN:.2} {:.2} cm /Im1 Do Q",
                    logo.width,
                    logo.height,
                    top - logo.height
                );
            }
            None => self.text(Font::Bold, 18.0, MARGIN, top - 18.0, &document.company_name),
        }

        let mut y = top - 8.0;
        for line in &document.company_lines {
            self.text_right(Font::Regular, 9.0, RIGHT, y, line);
            y -= 11.0;
        }

        self.y = (top - LOGO_MAX_HEIGHT).min(y) - 40.0;

        let y = self.y;
        self.text(Font::Bold, 16.0, MARGIN, y, document.title);
        self.y -= 22.0;

        for (label, value) in &document.meta {
            let y = self.y;
            self.text(Font::Regular, 10.0, MARGIN, y, label);
            self.text(Font::Regular, 10.0, MARGIN + 100.0, y, value);
            self.y -= LINE_HEIGHT + 1.0;
        }

        self.y -= 16.0;

        let y = self.y;
        self.text(Font::Bold, 10.0, MARGIN, y, document.customer_heading);
        self.y -= LINE_HEIGHT + 2.0;

        for line in &document.customer_lines {
            let y = self.y;
            self.text(Font::Regular, 10.0, MARGIN, y, line);
            self.y -= LINE_HEIGHT;
        }

        self.y -= 24.0;
    }

    fn table_header(&mut self) {
        let [description, quantity, unit_price, line_total] = self.document.columns;
        let y = self.y;

        self.text(Font::Bold, 10.0, MARGIN, y, description);
        self.text_right(Font::Bold, 10.0, QUANTITY_RIGHT, y, quantity);
        self.text_right(Font::Bold, 10.0, UNIT_PRICE_RIGHT, y, unit_price);
        self.text_right(Font::Bold, 10.0, RIGHT, y, line_total);
        self.rule(y - 5.0, MARGIN, 0.5);

        self.y -= ROW_HEIGHT + 4.0;
    }

    fn rows(&mut self) {
        let document = self.document;

        for row in &document.rows {
            let lines = wrap(&row.description, Font::Regular, 10.0, DESCRIPTION_WIDTH);
            let height = ROW_HEIGHT + lines.iter().skip(1).map(|_| LINE_HEIGHT).sum::<f32>();

            if self.y - height < BOTTOM {
                self.new_page();
                self.table_header();
            }

            let y = self.y;

            self.text_right(Font::Regular, 10.0, QUANTITY_RIGHT, y, &row.quantity);
            self.text_right(Font::Regular, 10.0, UNIT_PRICE_RIGHT, y, &row.unit_price);
            self.text_right(Font::Regular, 10.0, RIGHT, y, &row.line_total);

            let mut line_y = y;
            for line in &lines {
                self.text(Font::Regular, 10.0, MARGIN, line_y, line);
                line_y -= LINE_HEIGHT;
            }

            self.y -= height;
        }
    }

    /// Vertical space the totals, payment block and closing line take.
    fn closing_height(&self) -> f32 {
        let document = self.document;

        let totals = (0..document.totals.len()).map(|_| ROW_HEIGHT).sum::<f32>();
        let payment = document.payment.as_ref().map_or(0.0, |block| {
            20.0 + (0..=block.lines.len()).map(|_| LINE_HEIGHT).sum::<f32>()
        });

        totals + payment + 40.0
    }

    fn totals(&mut self) {
        if self.y - self.closing_height() < BOTTOM {
            self.new_page();
        }

        self.rule(self.y + ROW_HEIGHT - 8.0, TOTALS_LABEL_X, 0.5);
        self.y -= 4.0;

        let document = self.document;

        for line in &document.totals {
            let font = if line.emphasized {
                Font::Bold
            } else {
                Font::Regular
            };
            let y = self.y;

            if line.emphasized {
                self.rule(y + 11.0, TOTALS_LABEL_X, 1.0);
            }

            self.text(font, 10.0, TOTALS_LABEL_X, y, &line.label);
            self.text_right(font, 10.0, RIGHT, y, &line.value);

            self.y -= ROW_HEIGHT;
        }
    }

    fn payment(&mut self) {
        let document = self.document;

        let Some(block) = &document.payment else {
            return;
        };

        self.y -= 20.0;

        let y = self.y;
        self.text(Font::Bold, 10.0, MARGIN, y, block.heading);
        self.y -= LINE_HEIGHT + 2.0;

        for line in &block.lines {
            let y = self.y;
            self.text(Font::Regular, 9.0, MARGIN, y, line);
            self.y -= LINE_HEIGHT;
        }
    }

    fn closing(&mut self) {
        self.y -= 20.0;

        let y = self.y;
        self.text(Font::Regular, 10.0, MARGIN, y, self.document.closing);
    }

    /// Lay out every section and stamp page footers.
    fn run(mut self) -> Vec<String> {
        self.first_page_header();
        self.table_header();
        self.rows();
        self.totals();
        self.payment();
        self.closing();

        let last = std::mem::take(&mut self.current);
        self.pages.push(last);

        let count = self.pages.len();
        let mut pages = std::mem::take(&mut self.pages);

        for (idx, page) in pages.iter_mut().enumerate() {
            self.current = std::mem::take(page);

            let footer = format!("{} / {count}", idx + 1);
            let x = (PAGE_WIDTH - Font::Regular.measure(&footer, 8.0)) / 2.0;
            self.text(Font::Regular, 8.0, x, 30.0, &footer);

            *page = std::mem::take(&mut self.current);
        }

        pages
    }
}

/// Sequential object writer that records offsets for the xref table.
#[derive(Debug, Default)]
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut writer = Self::default();

        writer.buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        writer
    }

    /// Write the next object; objects must be written in id order.
    fn object(&mut self, body: &str) {
        self.offsets.push(self.buf.len());

        let id = self.offsets.len();

        self.buf
            .extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
    }

    fn stream(&mut self, dict: &str, data: &[u8]) {
        self.offsets.push(self.buf.len());

        let id = self.offsets.len();

        self.buf.extend_from_slice(
            format!(
                "{id} 0 obj\n<< {dict} /Length {} >>\nstream\n",
                data.len()
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self, root: usize, info: usize) -> Vec<u8> {
        let xref = self.buf.len();
        let size = self.offsets.len() + 1;

        let mut table = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            _ = writeln!(table, "{offset:010} 00000 n ");
        }
        _ = write!(
            table,
            "trailer\n<< /Size {size} /Root {root} 0 R /Info {info} 0 R >>\nstartxref\n{xref}\n%%EOF\n"
        );

        self.buf.extend_from_slice(table.as_bytes());
        self.buf
    }
}

const CATALOG: usize = 1;
const PAGES: usize = 2;
const FONT_REGULAR: usize = 3;
const FONT_BOLD: usize = 4;
const INFO: usize = 5;
const IMAGE: usize = 6;

/// Render the invoice as PDF bytes.
pub fn render_pdf(document: &InvoiceDocument, logo: Option<&Logo>) -> Vec<u8> {
    let pages = Layout::new(document, logo.map(LogoBox::for_logo)).run();

    let first_page = if logo.is_some() { IMAGE + 1 } else { IMAGE };
    let page_ids = (0..pages.len())
        .map(|idx| first_page + 2 * idx)
        .collect::<Vec<_>>();

    let mut writer = PdfWriter::new();

    writer.object(&format!("<< /Type /Catalog /Pages {PAGES} 0 R >>"));

    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    writer.object(&format!(
        "<< /Type /Pages /Kids [{kids}] /Count {} >>",
        page_ids.len()
    ));

    for base in ["Helvetica", "Helvetica-Bold"] {
        writer.object(&format!(
            "<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>"
        ));
    }

    writer.object(&format!(
        "<< /Title ({}) /Author ({}) /Producer (verdant) >>",
        encode_text(&format!("{} {}", document.title, document.order_id)),
        encode_text(&document.company_name)
    ));

    let mut resources = format!("/Font << /F1 {FONT_REGULAR} 0 R /F2 {FONT_BOLD} 0 R >>");

    if let Some(logo) = logo {
        let color_space = match logo.components() {
            1 => "/DeviceGray",
            4 => "/DeviceCMYK",
            _ => "/DeviceRGB",
        };

        writer.stream(
            &format!(
                "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {color_space} /BitsPerComponent 8 /Filter /DCTDecode",
                logo.width(),
                logo.height()
            ),
            logo.bytes(),
        );

        _ = write!(resources, " /XObject << /Im1 {IMAGE} 0 R >>");
    }

    for (content, page_id) in pages.iter().zip(&page_ids) {
        writer.object(&format!(
            "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] /Resources << {resources} >> /Contents {} 0 R >>",
            page_id + 1
        ));
        writer.stream("", content.as_bytes());
    }

    writer.finish(CATALOG, INFO)
}
