//! Selection of the current listing: open postings for upcoming terms, in
//! chronological term order.

use chrono::NaiveDate;
use internwatch_shared::Posting;

use crate::terms::{is_past_term, sort_key};

/// A posting is listed when it is active, names a term, and that term has
/// not started yet.
pub fn is_listable(posting: &Posting, today: NaiveDate) -> bool {
    posting.active && !posting.terms.is_empty() && !is_past_term(&posting.terms, today)
}

/// Filter `postings` down to listable ones and sort them by term.
///
/// The sort is stable: postings with equal keys keep their input order.
pub fn select_current(postings: &[Posting], today: NaiveDate) -> Vec<Posting> {
    let mut selected: Vec<Posting> = postings
        .iter()
        .filter(|p| is_listable(p, today))
        .cloned()
        .collect();

    selected.sort_by_key(|p| sort_key(&p.terms));
    selected
}
