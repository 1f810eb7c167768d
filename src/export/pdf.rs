//! Per-date PDF report export.

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::ExporterKind;
use crate::error::{RecapError, RecapResult};
use crate::models::{DateRecap, Record};

use super::{ExportArtifact, Exporter, file_safe};

/// MIME type of `.pdf` files.
pub const PDF_MIME_TYPE: &str = "application/pdf";

// A4 landscape, millimetres.
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 12.0;
const LINE_HEIGHT: f32 = 5.0;
const LAYER_NAME: &str = "Layer 1";

const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 10.0;
const TABLE_SIZE: f32 = 8.0;

/// Approximate Helvetica advance at [`TABLE_SIZE`], in millimetres per char.
const TABLE_CHAR_WIDTH: f32 = 1.6;
/// Characters per wrapped header line at [`BODY_SIZE`].
const BODY_LINE_CHARS: usize = 140;

/// Table columns: title and width in millimetres. Widths add up to the
/// printable page width.
const COLUMNS: [(&str, f32); 9] = [
    ("Job Name", 40.0),
    ("Last Name", 32.0),
    ("Earning", 26.0),
    ("Reimbursement", 28.0),
    ("Deduction Name", 40.0),
    ("Deduction Amt", 28.0),
    ("Tax Amount", 26.0),
    ("Child Support/401k", 28.0),
    ("Other Ded", 25.0),
];

/// Writes a one-date report as `paychex_report_{check_date}.pdf`.
///
/// The report opens with the check date, the total salary, the total of
/// withholding deductions, and the distinct projects and employees. A table
/// of every record follows, continuing onto new pages as needed.
#[derive(Debug, Clone, Default)]
pub struct PdfExporter;

impl PdfExporter {
    /// Creates the exporter.
    pub fn new() -> Self {
        Self
    }

    /// Renders the report, returning the bytes and the page count.
    fn render(&self, recap: &DateRecap) -> Result<(Vec<u8>, usize), String> {
        let title = format!("Paychex Report {}", recap.check_date);
        let mut writer = PdfWriter::new(&title)?;

        writer.line(&title, TITLE_SIZE, MARGIN, true);
        writer.advance(3.0);
        writer.line(
            &format!("Salary: {:.2}", recap.table.total().salary),
            BODY_SIZE,
            MARGIN,
            false,
        );
        writer.line(
            &format!("Deductions: {:.2}", recap.total_deductions()),
            BODY_SIZE,
            MARGIN,
            false,
        );
        for text in wrap(&format!("Projects: {}", recap.projects().join(", ")), BODY_LINE_CHARS) {
            writer.line(&text, BODY_SIZE, MARGIN, false);
        }
        for text in wrap(&format!("Employees: {}", recap.employees().join(", ")), BODY_LINE_CHARS) {
            writer.line(&text, BODY_SIZE, MARGIN, false);
        }
        writer.advance(LINE_HEIGHT);

        let headings = COLUMNS.map(|(title, _)| title.to_string());
        writer.table_row(&headings, true);
        for record in recap.records.iter() {
            if writer.needs_page() {
                writer.new_page();
                writer.table_row(&headings, true);
            }
            writer.table_row(&record_cells(record), false);
        }

        writer.finish()
    }
}

impl Exporter for PdfExporter {
    fn kind(&self) -> ExporterKind {
        ExporterKind::Pdf
    }

    fn file_name(&self, check_date: &str) -> String {
        format!("paychex_report_{}.pdf", file_safe(check_date))
    }

    fn export(&self, recap: &DateRecap) -> RecapResult<ExportArtifact> {
        let file_name = self.file_name(&recap.check_date);
        let (bytes, pages) = self
            .render(recap)
            .map_err(|message| RecapError::ExportError {
                file_name: file_name.clone(),
                message,
            })?;

        debug!(
            check_date = %recap.check_date,
            file_name = %file_name,
            pages,
            bytes = bytes.len(),
            "Rendered recap report"
        );

        Ok(ExportArtifact {
            file_name,
            mime_type: PDF_MIME_TYPE.to_string(),
            bytes,
        })
    }
}

/// Cursor-based page writer. `y` is the baseline of the next line, measured
/// from the bottom of the page.
struct PdfWriter {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self, String> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| e.to_string())?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| e.to_string())?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            regular,
            bold,
            layer,
            y: PAGE_HEIGHT - MARGIN,
            pages: 1,
        })
    }

    fn advance(&mut self, height: f32) {
        self.y -= height;
    }

    /// True once the cursor has reached the footer area.
    fn needs_page(&self) -> bool {
        self.y < MARGIN + LINE_HEIGHT
    }

    fn line(&mut self, text: &str, size: f32, x: f32, bold: bool) {
        if self.needs_page() {
            self.new_page();
        }
        self.text_at(text, size, x, bold);
        self.advance(LINE_HEIGHT.max(size * 0.45));
    }

    fn text_at(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn table_row(&mut self, cells: &[String], bold: bool) {
        let mut x = MARGIN;
        for (cell, (_, width)) in cells.iter().zip(COLUMNS) {
            let max_chars = (width / TABLE_CHAR_WIDTH) as usize;
            self.text_at(&truncate(cell, max_chars), TABLE_SIZE, x, bold);
            x += width;
        }
        self.advance(LINE_HEIGHT);
    }

    fn footer(&self) {
        self.layer.use_text(
            format!("Page {}", self.pages),
            TABLE_SIZE,
            Mm(PAGE_WIDTH - MARGIN - 15.0),
            Mm(MARGIN / 2.0),
            &self.regular,
        );
    }

    fn new_page(&mut self) {
        self.footer();
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
        self.pages += 1;
    }

    fn finish(self) -> Result<(Vec<u8>, usize), String> {
        self.footer();
        let pages = self.pages;
        let bytes = self.doc.save_to_bytes().map_err(|e| e.to_string())?;
        Ok((bytes, pages))
    }
}

/// One table row for a record. Blank values print as `0`.
fn record_cells(record: &Record) -> [String; 9] {
    [
        or_zero(&record.job_name),
        or_zero(&record.last_name_and_suffix),
        amount(record.earning_amount),
        amount(record.reimbursement_other_payment_amount),
        or_zero(record.withholding_deduction_name.as_deref().unwrap_or_default()),
        amount(record.withholding_deduction_amt),
        amount(record.combined_company_and_employee_tax_amount),
        amount(record.child_support_401k),
        amount(record.other_ded),
    ]
}

fn or_zero(text: &str) -> String {
    if text.trim().is_empty() {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn amount(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(2)).collect();
    format!("{}..", kept)
}

/// Greedy word wrap. Words longer than a line are kept whole.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecapTable, RecordSet};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn recap_with(count: usize) -> DateRecap {
        let records = (0..count)
            .map(|i| Record {
                job_name: "Sales".to_string(),
                last_name_and_suffix: format!("Employee {}", i),
                check_date: "2024-01-01".to_string(),
                earning_amount: dec("100.50"),
                ..Default::default()
            })
            .collect::<RecordSet>();

        DateRecap {
            check_date: "2024-01-01".to_string(),
            records,
            table: RecapTable::from_rows(vec![]).unwrap(),
            audit_steps: vec![],
        }
    }

    #[test]
    fn test_file_name_uses_check_date() {
        assert_eq!(
            PdfExporter::new().file_name("2024-01-01"),
            "paychex_report_2024-01-01.pdf"
        );
    }

    #[test]
    fn test_export_produces_pdf_bytes() {
        let artifact = PdfExporter::new().export(&recap_with(3)).unwrap();
        assert_eq!(artifact.mime_type, PDF_MIME_TYPE);
        assert!(artifact.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_short_report_fits_one_page() {
        let (_, pages) = PdfExporter::new().render(&recap_with(5)).unwrap();
        assert_eq!(pages, 1);
    }

    #[test]
    fn test_long_report_continues_on_new_pages() {
        let (_, pages) = PdfExporter::new().render(&recap_with(120)).unwrap();
        assert!(pages >= 3, "expected at least 3 pages, got {}", pages);
    }

    #[test]
    fn test_blank_values_print_as_zero() {
        let cells = record_cells(&Record::default());
        assert_eq!(cells[0], "0");
        assert_eq!(cells[4], "0");
        assert_eq!(cells[2], "0.00");
    }

    #[test]
    fn test_truncate_long_cells() {
        assert_eq!(truncate("Sales", 10), "Sales");
        assert_eq!(truncate("Maintenance Crew", 8), "Mainte..");
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        let lines = wrap("Projects: Misc, Office, Sales", 16);
        assert_eq!(lines, vec!["Projects: Misc,", "Office, Sales"]);
        assert_eq!(wrap("", 10), vec![String::new()]);
    }
}
