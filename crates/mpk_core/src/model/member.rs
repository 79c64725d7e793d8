//! Member directory records and name ordering.
//!
//! # Invariants
//! - `name` is trimmed and non-empty; unique case-sensitively.
//! - `org_unit` is trimmed; blank values are stored as `None`.
//! - `id` is stable for the lifetime of the member.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Storage-assigned member identifier.
pub type MemberId = i64;

/// One registered member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub org_unit: Option<String>,
}

/// One row of a bulk import. Rows without a usable name are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MemberUpsertRow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub org_unit: Option<String>,
}

impl MemberUpsertRow {
    pub fn new(name: impl Into<String>, org_unit: Option<&str>) -> Self {
        Self {
            name: Some(name.into()),
            org_unit: org_unit.map(str::to_string),
        }
    }

    /// Returns the trimmed `(name, org_unit)` pair, or `None` for a row that
    /// must be skipped.
    pub fn normalized(&self) -> Option<(&str, Option<&str>)> {
        let name = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        let org_unit = self
            .org_unit
            .as_deref()
            .map(str::trim)
            .filter(|unit| !unit.is_empty());
        Some((name, org_unit))
    }
}

/// List filters. Both are case-insensitive substring matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MemberFilter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub org_unit: Option<String>,
}

impl MemberFilter {
    /// Returns whether `member` satisfies every non-empty filter.
    pub fn matches(&self, member: &Member) -> bool {
        if let Some(needle) = active_needle(self.name.as_deref()) {
            if !contains_ignore_case(member.name.as_str(), needle.as_str()) {
                return false;
            }
        }
        if let Some(needle) = active_needle(self.org_unit.as_deref()) {
            match member.org_unit.as_deref() {
                Some(org_unit) if contains_ignore_case(org_unit, needle.as_str()) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Compares member names for display order.
///
/// Approximates root-locale collation in three levels: base letters without
/// diacritics and case, then accents (unaccented first), then case
/// (lowercase first).
pub fn compare_names(left: &str, right: &str) -> Ordering {
    base_letters(left)
        .cmp(base_letters(right))
        .then_with(|| folded_case(left).cmp(folded_case(right)))
        .then_with(|| right.nfd().cmp(left.nfd()))
}

fn base_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    folded_case(name).filter(|c| !is_combining_mark(*c))
}

fn folded_case(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd().flat_map(char::to_lowercase)
}

fn active_needle(filter: Option<&str>) -> Option<String> {
    filter
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}
