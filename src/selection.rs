//! Selection criteria for models, datasets, languages and tasks
//!
//! Language and task filters use [`FilterSelection`] instead of the `"all"`
//! string sentinel: `All` means "do not filter on this axis" and normalises
//! to a single [`Filter::Unfiltered`] entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Keyword accepted wherever a language or task list is parsed from text
pub const ALL_KEYWORD: &str = "all";

/// One entry of a normalised language or task filter list
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Filter {
    /// No filtering on this axis
    Unfiltered,
    /// A concrete language code (e.g. "da") or task code (e.g. "fill-mask")
    Code(String),
}

impl Filter {
    /// The code to send to the catalog, `None` when unfiltered
    pub fn as_code(&self) -> Option<&str> {
        match self {
            Self::Unfiltered => None,
            Self::Code(code) => Some(code),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        matches!(self, Self::Unfiltered)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unfiltered => write!(f, "any"),
            Self::Code(code) => write!(f, "{}", code),
        }
    }
}

/// Language or task selection as supplied by a caller
///
/// `all` is honoured inside a list as well as on its own, so `["da", "all"]`
/// selects everything rather than querying for a language called `all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFilterSelection", into = "RawFilterSelection")]
pub enum FilterSelection {
    /// Consider every language (or task), including non-Scandinavian ones
    All,
    /// Restrict to these codes, in order
    Codes(Vec<String>),
}

impl FilterSelection {
    /// Build a selection from user-supplied codes
    ///
    /// The keyword `all` anywhere in the input selects everything.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<String> = codes.into_iter().map(Into::into).collect();
        if codes.iter().any(|c| c == ALL_KEYWORD) {
            Self::All
        } else {
            Self::Codes(codes)
        }
    }

    /// Normalise into the list of filters used for catalog queries
    pub fn normalize(&self) -> Vec<Filter> {
        match self {
            Self::All => vec![Filter::Unfiltered],
            Self::Codes(codes) => codes.iter().cloned().map(Filter::Code).collect(),
        }
    }
}

impl From<&str> for FilterSelection {
    fn from(code: &str) -> Self {
        Self::from_codes([code])
    }
}

impl From<Vec<String>> for FilterSelection {
    fn from(codes: Vec<String>) -> Self {
        Self::from_codes(codes)
    }
}

impl From<Vec<&str>> for FilterSelection {
    fn from(codes: Vec<&str>) -> Self {
        Self::from_codes(codes)
    }
}

/// Accepts either `"all"`, a single code or a list of codes in config files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawFilterSelection {
    One(String),
    Many(Vec<String>),
}

impl From<RawFilterSelection> for FilterSelection {
    fn from(raw: RawFilterSelection) -> Self {
        match raw {
            RawFilterSelection::One(code) => Self::from_codes([code]),
            RawFilterSelection::Many(codes) => Self::from_codes(codes),
        }
    }
}

impl From<FilterSelection> for RawFilterSelection {
    fn from(selection: FilterSelection) -> Self {
        match selection {
            FilterSelection::All => RawFilterSelection::One(ALL_KEYWORD.to_string()),
            FilterSelection::Codes(codes) => RawFilterSelection::Many(codes),
        }
    }
}

/// Explicit model IDs or dataset keys, normalised to an ordered list
///
/// Duplicates are preserved as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(Vec<String>);

impl Selection {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.0.iter().any(|s| s == item)
    }
}

impl From<&str> for Selection {
    fn from(item: &str) -> Self {
        Self(vec![item.to_string()])
    }
}

impl From<String> for Selection {
    fn from(item: String) -> Self {
        Self(vec![item])
    }
}

impl From<Vec<String>> for Selection {
    fn from(items: Vec<String>) -> Self {
        Self(items)
    }
}

impl From<Vec<&str>> for Selection {
    fn from(items: Vec<&str>) -> Self {
        Self(items.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Selection {
    fn from(items: [&str; N]) -> Self {
        Self(items.iter().map(|s| s.to_string()).collect())
    }
}
