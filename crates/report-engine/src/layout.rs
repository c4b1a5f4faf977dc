//! Page metrics and text layout for the report.
//!
//! All distances are PDF points. The table uses fixed column widths and an
//! approximate character budget per line, so layout is pure arithmetic with
//! no font metrics lookup.

/// A4 portrait page size
pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;

/// Uniform margin on all four sides
pub const MARGIN: f64 = 40.0;

pub const TITLE_SIZE: f64 = 20.0;
pub const META_SIZE: f64 = 10.0;
pub const BODY_SIZE: f64 = 9.0;

/// Baseline-to-baseline step for table text
pub const LINE_HEIGHT: f64 = 11.0;

/// Drop from a cell's top edge to its first text baseline
pub const BASELINE_DROP: f64 = 7.0;

pub const CELL_PADDING: f64 = 5.0;

/// Approximate Helvetica advance per character, as a fraction of the size
const AVG_CHAR_WIDTH: f64 = 0.5;

/// Findings table columns: header label and width in points. The widths
/// fill the printable width at the fixed margin.
pub const TABLE_COLUMNS: [(&str, f64); 3] =
    [("Clause", 300.0), ("Reference", 130.0), ("Status", 85.0)];

/// Fixed prefix of exported report file names
pub const ARTIFACT_PREFIX: &str = "ClauseLens_Audit_";

pub fn table_width() -> f64 {
    TABLE_COLUMNS.iter().map(|(_, width)| width).sum()
}

/// Height of a table row holding `line_count` wrapped lines
pub fn row_height(line_count: usize) -> f64 {
    line_count.max(1) as f64 * LINE_HEIGHT + 2.0 * CELL_PADDING
}

/// Character budget of one wrapped line in a column of the given width
pub fn chars_per_line(column_width: f64) -> usize {
    let budget = (column_width - 2.0 * CELL_PADDING) / (BODY_SIZE * AVG_CHAR_WIDTH);
    (budget as usize).max(1)
}

/// Wrapped lines of one row that fit between a cursor at `y` and the
/// bottom margin. Zero when not even a one-line row fits.
pub fn lines_that_fit(y: f64) -> usize {
    ((y - MARGIN - 2.0 * CELL_PADDING) / LINE_HEIGHT) as usize
}

/// Tallest row that fits a page holding only the table's header row
pub fn fresh_page_row_budget() -> f64 {
    PAGE_HEIGHT - 2.0 * MARGIN - row_height(1)
}

/// Greedy word wrap into lines of at most `max_chars` characters.
///
/// Words longer than the budget are hard-split. Whitespace runs collapse
/// to single spaces. Always returns at least one line, so an empty cell
/// still occupies one line of row height.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        for piece in split_word(word, max_chars) {
            let piece_len = piece.chars().count();
            if current_len == 0 {
                current = piece;
                current_len = piece_len;
            } else if current_len + 1 + piece_len <= max_chars {
                current.push(' ');
                current.push_str(&piece);
                current_len += 1 + piece_len;
            } else {
                lines.push(std::mem::take(&mut current));
                current = piece;
                current_len = piece_len;
            }
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Split one word into chunks of at most `max_chars` characters
fn split_word(word: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() <= max_chars {
        return vec![word.to_string()];
    }
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Suggested file name for the exported report.
///
/// The source document's final extension is dropped ("contract.pdf"
/// becomes "contract"); a name with no dot, or a bare dotfile name, is
/// kept whole so the stem is never empty.
pub fn artifact_file_name(source: &str) -> String {
    let stem = match source.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => source,
    };
    format!("{}{}.pdf", ARTIFACT_PREFIX, stem)
}


// Property tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: no wrapped line ever exceeds the budget
        #[test]
        fn wrapped_lines_fit_budget(text in ".{0,300}", max_chars in 1usize..80) {
            for line in wrap_text(&text, max_chars) {
                prop_assert!(line.chars().count() <= max_chars);
            }
        }

        /// Property: wrapping loses no non-whitespace characters and keeps their order
        #[test]
        fn wrapping_preserves_characters(text in "[a-zA-Z0-9 .,()-]{0,300}", max_chars in 1usize..80) {
            let wrapped: String = wrap_text(&text, max_chars)
                .concat()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            prop_assert_eq!(wrapped, original);
        }

        /// Property: there is always at least one line
        #[test]
        fn wrap_never_returns_empty(text in ".{0,120}", max_chars in 1usize..40) {
            prop_assert!(!wrap_text(&text, max_chars).is_empty());
        }

        /// Property: artifact names always carry the prefix and the pdf extension
        #[test]
        fn artifact_names_are_tagged(source in "[a-zA-Z0-9._-]{1,40}") {
            let name = artifact_file_name(&source);
            prop_assert!(name.starts_with(ARTIFACT_PREFIX));
            prop_assert!(name.ends_with(".pdf"));
        }
    }
}
