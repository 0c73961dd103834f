//! Term label classification and ordering.
//!
//! A term label is `"<Season> <Year>"`. Two independent readings exist:
//! - [`is_past_term`] decides staleness and treats anything unreadable as
//!   *not* past.
//! - [`sort_key`] orders labels and pushes anything unreadable to the end;
//!   a readable year with an unknown season keeps its year and gets season 0.

use chrono::{Datelike, NaiveDate};
use internwatch_shared::{Season, Terms};

/// Sort key for terms that cannot be read.
pub const UNPARSED_SORT_KEY: (i32, u32) = (9999, 0);

/// Split a joined label into `(season name, year)`.
///
/// Exactly two whitespace-separated tokens are required, and the second must
/// parse as an integer.
fn split_label(label: &str) -> Option<(&str, i32)> {
    let mut parts = label.split_whitespace();
    let season = parts.next()?;
    let year = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let year = year.parse::<i32>().ok()?;
    Some((season, year))
}

/// True when the term has already started relative to `today`.
///
/// Same-year terms count as past once the current season has reached them:
/// "Summer 2026" is past from June 2026 on.
pub fn is_past_term(terms: &Terms, today: NaiveDate) -> bool {
    if terms.is_empty() {
        return false;
    }

    let label = terms.joined();
    let Some((season_name, year)) = split_label(&label) else {
        return false;
    };
    let Some(season) = Season::from_name(season_name) else {
        return false;
    };

    let current_year = today.year();
    let current_season = Season::from_month(today.month());

    match year.cmp(&current_year) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => season <= current_season,
    }
}

/// `(year, season ordinal)` ordering key.
pub fn sort_key(terms: &Terms) -> (i32, u32) {
    if terms.is_empty() {
        return UNPARSED_SORT_KEY;
    }

    let label = terms.joined();
    match split_label(&label) {
        Some((season_name, year)) => (
            year,
            Season::from_name(season_name).map_or(0, Season::ordinal),
        ),
        None => UNPARSED_SORT_KEY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn text(s: &str) -> Terms {
        Terms::from(s)
    }

    #[test]
    fn earlier_year_is_past() {
        assert!(is_past_term(&text("Fall 2020"), date(2021, 1, 15)));
        assert!(is_past_term(&text("Fall 2020"), date(2026, 10, 18)));
    }

    #[test]
    fn far_future_is_not_past() {
        assert!(!is_past_term(&text("Winter 2099"), date(2026, 10, 18)));
    }

    #[test]
    fn empty_is_not_past() {
        assert!(!is_past_term(&text(""), date(2026, 10, 18)));
        assert!(!is_past_term(&Terms::List(vec![]), date(2026, 10, 18)));
    }

    #[test]
    fn list_is_joined_before_parsing() {
        let terms = Terms::List(vec!["Spring".into(), "2025".into()]);
        assert!(is_past_term(&terms, date(2025, 3, 1)));
        assert!(!is_past_term(&terms, date(2025, 2, 28)));
        assert_eq!(sort_key(&terms), (2025, 2));
    }

    #[test]
    fn multi_term_list_is_not_parsable() {
        let terms = Terms::List(vec!["Summer 2020".into(), "Fall 2020".into()]);
        assert!(!is_past_term(&terms, date(2026, 10, 18)));
        assert_eq!(sort_key(&terms), UNPARSED_SORT_KEY);
    }

    #[test]
    fn same_year_compares_seasons() {
        let today = date(2026, 7, 1); // Summer
        assert!(is_past_term(&text("Winter 2026"), today));
        assert!(is_past_term(&text("Spring 2026"), today));
        assert!(is_past_term(&text("Summer 2026"), today));
        assert!(!is_past_term(&text("Fall 2026"), today));
    }

    #[test]
    fn december_counts_as_winter_of_same_year() {
        let today = date(2026, 12, 5);
        assert!(!is_past_term(&text("Spring 2026"), today));
        assert!(is_past_term(&text("Winter 2026"), today));
        assert!(!is_past_term(&text("Fall 2026"), today));
        assert!(!is_past_term(&text("Winter 2027"), today));
    }

    #[test]
    fn malformed_labels_are_not_past() {
        let today = date(2026, 10, 18);
        assert!(!is_past_term(&text("Summer"), today));
        assert!(!is_past_term(&text("Summer 2020 Extra"), today));
        assert!(!is_past_term(&text("Summer twenty"), today));
        assert!(!is_past_term(&text("Autumn 2020"), today));
        assert!(!is_past_term(&text("summer 2020"), today));
    }

    #[test]
    fn sort_key_fallbacks() {
        assert_eq!(sort_key(&text("")), UNPARSED_SORT_KEY);
        assert_eq!(sort_key(&text("Summer")), UNPARSED_SORT_KEY);
        assert_eq!(sort_key(&text("Summer 20x6")), UNPARSED_SORT_KEY);
        assert_eq!(sort_key(&text("Autumn 2026")), (2026, 0));
        assert_eq!(sort_key(&text("  Fall   2026 ")), (2026, 4));
    }

    #[test]
    fn sort_key_orders_seasons_within_year() {
        let mut labels = vec!["Fall 2025", "Spring 2025", "Summer 2025", "Winter 2025"];
        labels.sort_by_key(|l| sort_key(&text(l)));
        assert_eq!(labels, vec!["Winter 2025", "Spring 2025", "Summer 2025", "Fall 2025"]);
    }
}
