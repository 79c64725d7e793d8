//! Member identifier normalization.
//!
//! # Responsibility
//! - Turn externally supplied member ids (JSON numbers, text) into one
//!   canonical integer form.
//! - Reject malformed or precision-unsafe input with errors that name the
//!   offending element position.
//!
//! # Invariants
//! - `CanonicalId` always holds decimal text without leading zeros (`"0"` for
//!   zero, a leading `-` only for negatives), so equal integers compare equal
//!   regardless of input form.
//! - Numbers beyond `MAX_SAFE_NUMBER` in magnitude are rejected; text has no
//!   upper bound and is digits only, so negatives arrive as numbers.
//! - Normalization is pure.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Largest integer a JSON number carries without precision loss (2^53 - 1).
pub const MAX_SAFE_NUMBER: f64 = 9_007_199_254_740_991.0;

static ASCII_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid digit regex"));
static CANONICAL_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0|-?[1-9][0-9]*)$").expect("valid canonical id regex"));

/// Member id as received from a caller, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawMemberId {
    /// Numeric form (JSON number).
    Number(f64),
    /// Textual form, may carry surrounding whitespace and leading zeros.
    Text(String),
    /// Any other shape; `kind` names it for diagnostics (`null`, `boolean`...).
    Unsupported(&'static str),
}

impl From<i64> for RawMemberId {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<f64> for RawMemberId {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawMemberId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawMemberId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Normalized, arbitrary-precision member id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalId(String);

impl CanonicalId {
    /// Builds a canonical id from a digit string, stripping leading zeros.
    ///
    /// Returns `None` when `digits` is empty or holds anything but ASCII digits.
    pub fn from_digits(digits: &str) -> Option<Self> {
        if !ASCII_DIGITS_RE.is_match(digits) {
            return None;
        }
        let stripped = digits.trim_start_matches('0');
        if stripped.is_empty() {
            Some(Self("0".to_string()))
        } else {
            Some(Self(stripped.to_string()))
        }
    }

    /// Accepts text already in canonical form, e.g. as read back from storage.
    pub fn parse_canonical(text: &str) -> Option<Self> {
        CANONICAL_ID_RE
            .is_match(text)
            .then(|| Self(text.to_string()))
    }

    /// Canonical decimal text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the id as `i64` when it fits, e.g. to look up a member row.
    pub fn to_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    fn is_negative(&self) -> bool {
        self.0.starts_with('-')
    }

    fn magnitude(&self) -> &str {
        self.0.trim_start_matches('-')
    }
}

impl From<u64> for CanonicalId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for CanonicalId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<String> for CanonicalId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_canonical(value.as_str())
            .ok_or_else(|| format!("`{value}` is not a canonical member id"))
    }
}

impl From<CanonicalId> for String {
    fn from(value: CanonicalId) -> Self {
        value.0
    }
}

impl Display for CanonicalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Ord for CanonicalId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => compare_magnitudes(self.magnitude(), other.magnitude()),
            (true, true) => compare_magnitudes(other.magnitude(), self.magnitude()),
        }
    }
}

// Magnitudes carry no leading zeros, so length orders them first.
fn compare_magnitudes(left: &str, right: &str) -> Ordering {
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

impl PartialOrd for CanonicalId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-element normalization failure. `index` is zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberIdError {
    /// Not an integer, or an unsupported value type.
    InvalidIdentifier { index: usize },
    /// Numeric value outside the exact-integer range; must be sent as text.
    IdentifierTooLarge { index: usize },
    /// Text that is empty after trimming.
    EmptyIdentifier { index: usize },
    /// Text containing anything other than ASCII digits.
    NonNumericIdentifier { index: usize },
}

impl MemberIdError {
    /// Zero-based position of the rejected element.
    pub fn index(&self) -> usize {
        match self {
            Self::InvalidIdentifier { index }
            | Self::IdentifierTooLarge { index }
            | Self::EmptyIdentifier { index }
            | Self::NonNumericIdentifier { index } => *index,
        }
    }
}

impl Display for MemberIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier { index } => write!(
                f,
                "member id at index {index} must be an integer"
            ),
            Self::IdentifierTooLarge { index } => write!(
                f,
                "member id at index {index} is too large, send it as a string"
            ),
            Self::EmptyIdentifier { index } => {
                write!(f, "member id at index {index} must not be empty")
            }
            Self::NonNumericIdentifier { index } => {
                write!(f, "member id at index {index} must contain digits only")
            }
        }
    }
}

impl Error for MemberIdError {}

/// Normalizes one raw member id found at `index` of the caller's list.
pub fn normalize(value: &RawMemberId, index: usize) -> Result<CanonicalId, MemberIdError> {
    match value {
        RawMemberId::Number(number) => normalize_number(*number, index),
        RawMemberId::Text(text) => normalize_text(text, index),
        RawMemberId::Unsupported(_) => Err(MemberIdError::InvalidIdentifier { index }),
    }
}

/// Normalizes every element in order, failing on the first rejected one.
pub fn normalize_all(values: &[RawMemberId]) -> Result<Vec<CanonicalId>, MemberIdError> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| normalize(value, index))
        .collect()
}

fn normalize_number(number: f64, index: usize) -> Result<CanonicalId, MemberIdError> {
    if !number.is_finite() || number.fract() != 0.0 {
        return Err(MemberIdError::InvalidIdentifier { index });
    }
    if number.abs() > MAX_SAFE_NUMBER {
        return Err(MemberIdError::IdentifierTooLarge { index });
    }
    // Exact: integral and within 2^53; `-0.0` becomes `0`.
    Ok(CanonicalId::from(number as i64))
}

fn normalize_text(text: &str, index: usize) -> Result<CanonicalId, MemberIdError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(MemberIdError::EmptyIdentifier { index });
    }
    CanonicalId::from_digits(trimmed).ok_or(MemberIdError::NonNumericIdentifier { index })
}

#[cfg(test)]
mod tests {
    use super::{normalize, normalize_all, CanonicalId, MemberIdError, RawMemberId};

    #[test]
    fn text_with_leading_zeros_matches_number() {
        let from_text = normalize(&RawMemberId::from("007"), 0).unwrap();
        let from_number = normalize(&RawMemberId::from(7), 0).unwrap();
        assert_eq!(from_text, from_number);
        assert_eq!(from_text.as_str(), "7");
    }

    #[test]
    fn text_is_trimmed_and_zero_is_kept() {
        assert_eq!(normalize(&" 12 ".into(), 0).unwrap().as_str(), "12");
        assert_eq!(normalize(&"000".into(), 0).unwrap().as_str(), "0");
    }

    #[test]
    fn text_has_no_upper_bound() {
        let huge = "123456789012345678901234567890";
        let id = normalize(&huge.into(), 0).unwrap();
        assert_eq!(id.as_str(), huge);
        assert_eq!(id.to_i64(), None);
    }

    #[test]
    fn fractional_number_is_invalid() {
        assert_eq!(
            normalize(&RawMemberId::Number(3.5), 2),
            Err(MemberIdError::InvalidIdentifier { index: 2 })
        );
        assert_eq!(
            normalize(&RawMemberId::Number(f64::NAN), 0),
            Err(MemberIdError::InvalidIdentifier { index: 0 })
        );
    }

    #[test]
    fn number_beyond_safe_bound_is_too_large() {
        let value = 9_007_199_254_740_991.0 + 10.0;
        let err = normalize(&RawMemberId::Number(value), 4).unwrap_err();
        assert_eq!(err, MemberIdError::IdentifierTooLarge { index: 4 });
        assert!(err.to_string().contains("index 4"));
    }

    #[test]
    fn safe_bound_itself_is_accepted() {
        let id = normalize(&RawMemberId::Number(9_007_199_254_740_991.0), 0).unwrap();
        assert_eq!(id.as_str(), "9007199254740991");
    }

    #[test]
    fn negative_number_keeps_its_sign() {
        assert_eq!(normalize(&RawMemberId::Number(-5.0), 0).unwrap().as_str(), "-5");
        assert_eq!(normalize(&RawMemberId::Number(-0.0), 0).unwrap().as_str(), "0");
        let floor = normalize(&RawMemberId::Number(-9_007_199_254_740_991.0), 1).unwrap();
        assert_eq!(floor.as_str(), "-9007199254740991");
        assert_eq!(
            normalize(&RawMemberId::Number(-9_007_199_254_740_993.0), 1),
            Err(MemberIdError::IdentifierTooLarge { index: 1 })
        );
    }

    #[test]
    fn canonical_text_round_trips_through_serde_form() {
        assert!(CanonicalId::try_from("-42".to_string()).is_ok());
        assert!(CanonicalId::try_from("0".to_string()).is_ok());
        assert!(CanonicalId::try_from("-0".to_string()).is_err());
        assert!(CanonicalId::try_from("007".to_string()).is_err());
        assert!(CanonicalId::try_from("4a".to_string()).is_err());
    }

    #[test]
    fn blank_and_non_numeric_text_are_rejected() {
        assert_eq!(
            normalize(&"   ".into(), 3),
            Err(MemberIdError::EmptyIdentifier { index: 3 })
        );
        let err = normalize(&"abc".into(), 0).unwrap_err();
        assert_eq!(err, MemberIdError::NonNumericIdentifier { index: 0 });
        assert!(err.to_string().contains("index 0"));
        assert_eq!(
            normalize(&"-4".into(), 0),
            Err(MemberIdError::NonNumericIdentifier { index: 0 })
        );
        // Non-ASCII digits are not digits here.
        assert_eq!(
            normalize(&"١٢".into(), 0),
            Err(MemberIdError::NonNumericIdentifier { index: 0 })
        );
    }

    #[test]
    fn unsupported_values_are_invalid() {
        assert_eq!(
            normalize(&RawMemberId::Unsupported("boolean"), 5),
            Err(MemberIdError::InvalidIdentifier { index: 5 })
        );
    }

    #[test]
    fn normalize_all_reports_first_failing_index() {
        let values = vec![
            RawMemberId::from(1),
            RawMemberId::from("x"),
            RawMemberId::Number(2.5),
        ];
        assert_eq!(
            normalize_all(&values),
            Err(MemberIdError::NonNumericIdentifier { index: 1 })
        );
    }

    #[test]
    fn canonical_ids_order_numerically() {
        let mut ids = vec![
            CanonicalId::from(100u64),
            CanonicalId::from(9u64),
            CanonicalId::from_digits("12").unwrap(),
            CanonicalId::from(-3i64),
            CanonicalId::from(-20i64),
            CanonicalId::from(0u64),
        ];
        ids.sort();
        let rendered: Vec<&str> = ids.iter().map(CanonicalId::as_str).collect();
        assert_eq!(rendered, vec!["-20", "-3", "0", "9", "12", "100"]);
    }
}
