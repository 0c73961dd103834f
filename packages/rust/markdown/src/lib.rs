//! README table generation and splicing.
//!
//! The README carries a section introduced by a marker heading, followed by a
//! fixed Markdown table header and separator. Each run regenerates the rows
//! under that header and leaves every other byte of the document alone.

mod rows;

use tracing::{debug, instrument};

pub use rows::{format_date, render_row, render_rows};

/// Heading that introduces the listings section.
pub const DEFAULT_MARKER: &str = "## Latest Internships";

/// Literal table header row.
pub const TABLE_HEADER: &str = "| Company | Role | Locations | Terms | Deadline | Link |";

/// Literal separator row directly under the header.
pub const TABLE_SEPARATOR: &str = "| ------- | ---- | --------- | ----- | -------- | ---- |";

/// Start of the next section; bounds the replaced row region.
const SECTION_PREFIX: &str = "##";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The literal anchors located in the document, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub marker: String,
    pub header: String,
    pub separator: String,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            header: TABLE_HEADER.to_string(),
            separator: TABLE_SEPARATOR.to_string(),
        }
    }
}

impl TableLayout {
    /// Default header/separator under a custom marker heading.
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            ..Self::default()
        }
    }
}

/// Why a document could not be spliced. Always recoverable: the caller skips
/// publishing and leaves the document as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpliceError {
    #[error("Table section not found in README")]
    MarkerNotFound,
    #[error("Table header not found")]
    HeaderNotFound,
    #[error("Table separator not found")]
    SeparatorNotFound,
}

// ---------------------------------------------------------------------------
// Splicing
// ---------------------------------------------------------------------------

/// Replace the table rows in `content` with `rows`.
///
/// The row region starts one character past the separator line (its newline)
/// and runs up to the next `##` or the end of the document. The new region is
/// `rows` followed by a single `\n`.
#[instrument(skip_all, fields(content_len = content.len(), rows_len = rows.len()))]
pub fn splice_table(
    content: &str,
    layout: &TableLayout,
    rows: &str,
) -> Result<String, SpliceError> {
    let marker_pos = content
        .find(&layout.marker)
        .ok_or(SpliceError::MarkerNotFound)?;

    let header_pos = find_from(content, &layout.header, marker_pos)
        .ok_or(SpliceError::HeaderNotFound)?;

    let separator_pos = find_from(content, &layout.separator, header_pos)
        .ok_or(SpliceError::SeparatorNotFound)?;

    let separator_end = separator_pos + layout.separator.len();
    let rows_start = separator_end
        + content[separator_end..]
            .chars()
            .next()
            .map_or(0, char::len_utf8);

    let rows_end = find_from(content, SECTION_PREFIX, rows_start).unwrap_or(content.len());

    debug!(rows_start, rows_end, "table row region located");

    let mut out = String::with_capacity(content.len() + rows.len());
    out.push_str(&content[..rows_start]);
    out.push_str(rows);
    out.push('\n');
    out.push_str(&content[rows_end..]);
    Ok(out)
}

/// `str::find` starting at byte offset `from`, returning an absolute offset.
fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack[from..].find(needle).map(|pos| pos + from)
}
