//! Markdown row rendering for postings.

use chrono::DateTime;
use internwatch_shared::Posting;

/// Render `YYYY-MM-DD` (UTC) for an epoch-seconds timestamp.
///
/// `None`, `0`, and out-of-range values render as an empty cell.
pub fn format_date(epoch_secs: Option<i64>) -> String {
    match epoch_secs {
        Some(secs) if secs != 0 => DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// One table row. The "Deadline" cell shows `date_posted`.
pub fn render_row(posting: &Posting) -> String {
    format!(
        "| {} | {} | {} | {} | {} | [Apply Here]({}) |",
        posting.company_name,
        posting.title,
        posting.locations.join(", "),
        posting.terms.label(),
        format_date(posting.date_posted),
        posting.url,
    )
}

/// All rows joined by `\n`, without a trailing newline.
pub fn render_rows(postings: &[Posting]) -> String {
    postings
        .iter()
        .map(render_row)
        .collect::<Vec<_>>()
        .join("\n")
}
