//! Report assembly: content streams plus lopdf document construction.

use audit_types::AnalysisResult;
use chrono::Utc;
use lopdf::{Dictionary, Document, Object, Stream};

use crate::error::ReportError;
use crate::layout::{
    artifact_file_name, chars_per_line, fresh_page_row_budget, lines_that_fit, row_height,
    table_width, wrap_text, BASELINE_DROP, BODY_SIZE, CELL_PADDING, LINE_HEIGHT, MARGIN,
    META_SIZE, PAGE_HEIGHT, PAGE_WIDTH, TABLE_COLUMNS, TITLE_SIZE,
};

/// Heading printed at the top of every report
pub const REPORT_TITLE: &str = "ClauseLens Audit Report";

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

const TITLE_COLOR: (f64, f64, f64) = (0.145, 0.388, 0.922);
const META_COLOR: (f64, f64, f64) = (0.392, 0.392, 0.392);
const HEADER_FILL: (f64, f64, f64) = (0.118, 0.161, 0.231);
const WHITE: (f64, f64, f64) = (1.0, 1.0, 1.0);
const BLACK: (f64, f64, f64) = (0.0, 0.0, 0.0);

/// A generated report ready to hand to the host for download
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: u32,
}

/// Render the report for `result`, stamped with the current UTC time.
pub fn generate(result: &AnalysisResult) -> Result<ReportArtifact, ReportError> {
    let generated_on = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
    let pages = layout_pages(result, &generated_on);
    let bytes = assemble_document(&pages)?;
    Ok(ReportArtifact {
        file_name: artifact_file_name(&result.file_name),
        bytes,
        page_count: pages.len() as u32,
    })
}

/// Render the report with a caller-chosen date line.
///
/// This is the deterministic core: the same result and `generated_on`
/// always produce byte-identical output. No object ids, timestamps or
/// compression settings vary between runs.
pub fn render_report(
    result: &AnalysisResult,
    generated_on: &str,
) -> Result<Vec<u8>, ReportError> {
    let pages = layout_pages(result, generated_on);
    assemble_document(&pages)
}

/// Escape special characters for PDF string literals.
///
/// Printable ASCII passes through. Other characters with a WinAnsi code
/// become octal escapes, which the fonts' /WinAnsiEncoding maps back to
/// the accented glyph; the stream itself stays ASCII-only.
fn escape_pdf_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '(' => "\\(".to_string(),
            ')' => "\\)".to_string(),
            '\\' => "\\\\".to_string(),
            _ if c.is_ascii_graphic() || c == ' ' => c.to_string(),
            _ => match win_ansi_code(c) {
                Some(code) => format!("\\{:03o}", code),
                None => "?".to_string(), // Outside WinAnsi, no glyph to map
            },
        })
        .collect()
}

/// WinAnsi (CP1252) byte for `c`, when the encoding has one
fn win_ansi_code(c: char) -> Option<u8> {
    match c {
        _ if c.is_ascii() => Some(c as u8),
        // The Latin-1 block maps through unchanged
        '\u{00A0}'..='\u{00FF}' => Some((c as u32) as u8),
        '\u{20AC}' => Some(0x80),
        '\u{201A}' => Some(0x82),
        '\u{0192}' => Some(0x83),
        '\u{201E}' => Some(0x84),
        '\u{2026}' => Some(0x85),
        '\u{2020}' => Some(0x86),
        '\u{2021}' => Some(0x87),
        '\u{02C6}' => Some(0x88),
        '\u{2030}' => Some(0x89),
        '\u{0160}' => Some(0x8A),
        '\u{2039}' => Some(0x8B),
        '\u{0152}' => Some(0x8C),
        '\u{017D}' => Some(0x8E),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201C}' => Some(0x93),
        '\u{201D}' => Some(0x94),
        '\u{2022}' => Some(0x95),
        '\u{2013}' => Some(0x96),
        '\u{2014}' => Some(0x97),
        '\u{02DC}' => Some(0x98),
        '\u{2122}' => Some(0x99),
        '\u{0161}' => Some(0x9A),
        '\u{203A}' => Some(0x9B),
        '\u{0153}' => Some(0x9C),
        '\u{017E}' => Some(0x9E),
        '\u{0178}' => Some(0x9F),
        _ => None,
    }
}

/// Accumulates content stream operators, one finished String per page
struct PageWriter {
    finished: Vec<String>,
    ops: String,
    y: f64,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            ops: String::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn break_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.ops));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn text(&mut self, font: &str, size: f64, x: f64, baseline: f64, color: (f64, f64, f64), text: &str) {
        if text.is_empty() {
            return;
        }
        self.ops.push_str(&format!(
            "{:.3} {:.3} {:.3} rg\nBT\n/{} {} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
            color.0,
            color.1,
            color.2,
            font,
            size,
            x,
            baseline,
            escape_pdf_string(text)
        ));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: (f64, f64, f64)) {
        self.ops.push_str(&format!(
            "{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re f\n",
            color.0, color.1, color.2, x, y, width, height
        ));
    }

    fn finish(mut self) -> Vec<String> {
        self.finished.push(self.ops);
        self.finished
    }
}

/// Lay the full report out into per-page content streams
fn layout_pages(result: &AnalysisResult, generated_on: &str) -> Vec<String> {
    let mut writer = PageWriter::new();
    render_heading(&mut writer, result, generated_on);
    render_table(&mut writer, result);
    writer.finish()
}

fn render_heading(writer: &mut PageWriter, result: &AnalysisResult, generated_on: &str) {
    writer.y -= TITLE_SIZE;
    writer.text(FONT_BOLD, TITLE_SIZE, MARGIN, writer.y, TITLE_COLOR, REPORT_TITLE);
    writer.y -= 20.0;

    let meta_lines = [
        format!("Analyzed document: {}", result.file_name),
        format!("Compliance score: {}", result.compliance_score),
        format!("Audit date: {}", generated_on),
    ];
    for line in &meta_lines {
        writer.y -= META_SIZE;
        writer.text(FONT_REGULAR, META_SIZE, MARGIN, writer.y, META_COLOR, line);
        writer.y -= 4.0;
    }
    writer.y -= 12.0;
}

fn render_table(writer: &mut PageWriter, result: &AnalysisResult) {
    draw_header_row(writer);

    for finding in &result.details {
        let cells = [
            wrap_cell(finding.clause.as_deref(), TABLE_COLUMNS[0].1),
            wrap_cell(finding.reference.as_deref(), TABLE_COLUMNS[1].1),
            wrap_cell(finding.status.as_deref(), TABLE_COLUMNS[2].1),
        ];
        let total = cells.iter().map(|cell| cell.len()).max().unwrap_or(1);
        let height = row_height(total);

        // A row that fits somewhere stays whole; only a row taller than a
        // full page is sliced across pages
        if writer.y - height < MARGIN && height <= fresh_page_row_budget() {
            writer.break_page();
            draw_header_row(writer);
        }

        let mut start = 0;
        while start < total {
            let fit = lines_that_fit(writer.y);
            if fit == 0 {
                writer.break_page();
                draw_header_row(writer);
                continue;
            }
            let take = (total - start).min(fit);
            draw_row_slice(writer, &cells, start, take, FONT_REGULAR, BLACK);
            start += take;
            if start < total {
                writer.break_page();
                draw_header_row(writer);
            }
        }
    }
}

fn wrap_cell(value: Option<&str>, column_width: f64) -> Vec<String> {
    wrap_text(value.unwrap_or(""), chars_per_line(column_width))
}

fn draw_header_row(writer: &mut PageWriter) {
    let height = row_height(1);
    writer.fill_rect(MARGIN, writer.y - height, table_width(), height, HEADER_FILL);
    let labels: [Vec<String>; 3] = [
        vec![TABLE_COLUMNS[0].0.to_string()],
        vec![TABLE_COLUMNS[1].0.to_string()],
        vec![TABLE_COLUMNS[2].0.to_string()],
    ];
    draw_row(writer, &labels, FONT_BOLD, WHITE);
}

/// Draw one table row at the writer's cursor and advance past it
fn draw_row(writer: &mut PageWriter, cells: &[Vec<String>; 3], font: &str, color: (f64, f64, f64)) {
    let lines = cells.iter().map(|cell| cell.len()).max().unwrap_or(1);
    draw_row_slice(writer, cells, 0, lines, font, color);
}

/// Draw `count` wrapped lines of each cell starting at line `start`, then
/// advance past the drawn slice
fn draw_row_slice(
    writer: &mut PageWriter,
    cells: &[Vec<String>; 3],
    start: usize,
    count: usize,
    font: &str,
    color: (f64, f64, f64),
) {
    let mut x = MARGIN;
    for (column, cell) in TABLE_COLUMNS.iter().zip(cells.iter()) {
        for (line_no, line) in cell.iter().skip(start).take(count).enumerate() {
            let baseline =
                writer.y - CELL_PADDING - BASELINE_DROP - line_no as f64 * LINE_HEIGHT;
            writer.text(font, BODY_SIZE, x + CELL_PADDING, baseline, color, line);
        }
        x += column.1;
    }
    writer.y -= row_height(count);
}

/// Build the PDF document around the finished content streams
fn assemble_document(pages: &[String]) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let resources_id = doc.new_object_id();

    // Shared font resources: Helvetica for body text, the bold cut for
    // the title and the table header. WinAnsiEncoding pairs with the
    // octal escapes emitted by escape_pdf_string.
    let mut regular = Dictionary::new();
    regular.set("Type", Object::Name(b"Font".to_vec()));
    regular.set("Subtype", Object::Name(b"Type1".to_vec()));
    regular.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    regular.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));

    let mut bold = Dictionary::new();
    bold.set("Type", Object::Name(b"Font".to_vec()));
    bold.set("Subtype", Object::Name(b"Type1".to_vec()));
    bold.set("BaseFont", Object::Name(b"Helvetica-Bold".to_vec()));
    bold.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));

    let mut fonts = Dictionary::new();
    fonts.set(FONT_REGULAR, Object::Dictionary(regular));
    fonts.set(FONT_BOLD, Object::Dictionary(bold));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    doc.objects.insert(resources_id, Object::Dictionary(resources));

    let mut kids = Vec::new();
    for ops in pages {
        let content_id = doc.new_object_id();
        doc.objects.insert(
            content_id,
            Object::Stream(Stream::new(Dictionary::new(), ops.clone().into_bytes())),
        );

        let page_id = doc.new_object_id();
        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH as f32),
                Object::Real(PAGE_HEIGHT as f32),
            ]),
        );
        page.set("Resources", Object::Reference(resources_id));
        doc.objects.insert(page_id, Object::Dictionary(page));
        kids.push(Object::Reference(page_id));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(pages.len() as i64));
    pages_dict.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    // Streams stay uncompressed: readable in tests, and equal inputs keep
    // producing equal bytes
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ReportError::RenderError(format!("Failed to save report PDF: {}", e)))?;
    Ok(buffer)
}


// Property tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use audit_types::ArticleFinding;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: arbitrary printable cell text always renders a loadable PDF
        #[test]
        fn arbitrary_findings_render_valid_pdf(
            cells in prop::collection::vec(("[ -~]{0,80}", "[ -~]{0,30}", "[ -~]{0,20}"), 0..8)
        ) {
            let details: Vec<ArticleFinding> = cells
                .into_iter()
                .map(|(clause, reference, status)| ArticleFinding {
                    article_number: None,
                    content: String::new(),
                    clause: Some(clause),
                    reference: Some(reference),
                    status: Some(status),
                })
                .collect();
            let result = AnalysisResult {
                file_name: "doc.pdf".to_string(),
                compliance_score: "Pending review".to_string(),
                special_count: details.len() as u32,
                details,
            };
            let bytes = render_report(&result, "2025-01-01 00:00 UTC").unwrap();
            prop_assert!(Document::load_mem(&bytes).is_ok());
        }

        /// Property: rendering is a pure function of its inputs
        #[test]
        fn rendering_is_deterministic(clause in "[ -~]{0,60}") {
            let result = AnalysisResult {
                file_name: "doc.pdf".to_string(),
                compliance_score: "Pending review".to_string(),
                special_count: 1,
                details: vec![ArticleFinding {
                    article_number: None,
                    content: String::new(),
                    clause: Some(clause),
                    reference: None,
                    status: None,
                }],
            };
            let first = render_report(&result, "2025-01-01 00:00 UTC").unwrap();
            let second = render_report(&result, "2025-01-01 00:00 UTC").unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
