//! Core domain types for internwatch listings.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A posting object exactly as it arrives from upstream or from disk, before
/// normalization. Keys may be missing or carry unexpected types.
pub type RawPosting = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

/// An academic/hiring season, ordered within a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Winter = 1,
    Spring = 2,
    Summer = 3,
    Fall = 4,
}

impl Season {
    /// Parse a season name. Matching is exact and case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Winter" => Some(Self::Winter),
            "Spring" => Some(Self::Spring),
            "Summer" => Some(Self::Summer),
            "Fall" => Some(Self::Fall),
            _ => None,
        }
    }

    /// The season a calendar month (1-12) falls in.
    ///
    /// December belongs to the Winter of the *same* calendar year.
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Self::Winter,
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            _ => Self::Fall,
        }
    }

    /// Numeric ordinal: Winter=1 .. Fall=4.
    pub fn ordinal(self) -> u32 {
        self as u32
    }
}

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

/// The `terms` field of a posting: either a single label ("Summer 2026") or a
/// list of labels, preserved in whichever shape the source used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Terms {
    Text(String),
    List(Vec<String>),
}

impl Default for Terms {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl Terms {
    /// True when there is nothing to classify: an empty string or empty list.
    ///
    /// A list holding only empty strings is *not* empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    /// Single-string form used for parsing; list items are joined with one space.
    pub fn joined(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::List(items) => Cow::Owned(items.join(" ")),
        }
    }

    /// Human-readable label for table cells.
    pub fn label(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::List(items) => Cow::Owned(items.join(", ")),
        }
    }
}

impl From<&str> for Terms {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Posting
// ---------------------------------------------------------------------------

/// A normalized internship posting as stored in `archived.json` and
/// `current.json`. Field order here is the on-disk field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub company_name: String,
    /// Primary key for the archive.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Whether the source still lists the posting as open.
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub terms: Terms,
    /// Epoch seconds.
    #[serde(default)]
    pub date_updated: Option<i64>,
    /// Epoch seconds. Rendered in the "Deadline" column.
    #[serde(default)]
    pub date_posted: Option<i64>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub degrees: Vec<String>,
}
