//! # Primitives
//!
//! Identifiers and values shared by the condition language and the survey
//! model.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Keyword for a response the participant chose to skip.
pub const SKIPPED_KEYWORD: &str = "SKIPPED";

/// Keyword for an item that was hidden by its condition.
pub const NOT_DISPLAYED_KEYWORD: &str = "NOT_DISPLAYED";

// =============================================================================
// ITEM ID
// =============================================================================

/// Identifier of a survey item.
///
/// Valid identifiers are non-empty, start with a letter or `_`, and contain
/// only ASCII letters, digits, `_`, `-` and `.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an identifier without checking its shape.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create an identifier if `id` has a valid shape.
    pub fn parse(id: &str) -> Option<Self> {
        Self::is_valid(id).then(|| Self(id.to_string()))
    }

    /// Check whether `id` has a valid identifier shape.
    pub fn is_valid(id: &str) -> bool {
        let mut chars = id.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        (first.is_ascii_alphabetic() || first == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// VALUE
// =============================================================================

/// A recorded response, or a literal in a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    /// The participant saw the item and skipped it.
    Skipped,
    /// The item was never shown (hidden by its condition or not reached).
    NotDisplayed,
}

impl Value {
    /// Numeric view of the value. Text counts when it parses as a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// True for `Skipped` and `NotDisplayed`.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Skipped | Self::NotDisplayed)
    }

    /// Equality as used by the `=` and `!=` relations.
    ///
    /// Numbers compare numerically, also against numeric text. Values of
    /// unrelated kinds are never equal.
    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Skipped, Self::Skipped) | (Self::NotDisplayed, Self::NotDisplayed) => true,
            (Self::Number(_), Self::Text(_)) | (Self::Text(_), Self::Number(_)) => {
                match (self.as_number(), other.as_number()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Ordering as used by `<`, `<=`, `>` and `>=`.
    ///
    /// Defined for number/number, text/text and number/numeric-text.
    /// Everything else is unordered.
    pub fn ordering(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Number(_), Self::Number(_))
            | (Self::Number(_), Self::Text(_))
            | (Self::Text(_), Self::Number(_)) => {
                let (a, b) = (self.as_number()?, other.as_number()?);
                a.partial_cmp(&b)
            }
            _ => None,
        }
    }

    /// Short name of the value kind, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Boolean(_) => "boolean",
            Self::Skipped => "skipped",
            Self::NotDisplayed => "not displayed",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            // Quote with the character the text does not contain.
            Self::Text(text) if text.contains('\'') => write!(f, "\"{}\"", text),
            Self::Text(text) => write!(f, "'{}'", text),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Skipped => f.write_str(SKIPPED_KEYWORD),
            Self::NotDisplayed => f.write_str(NOT_DISPLAYED_KEYWORD),
        }
    }
}

/// Recorded responses keyed by item.
///
/// Items without an entry resolve to [`Value::NotDisplayed`].
pub type Responses = BTreeMap<ItemId, Value>;

// =============================================================================
// TESTS
// =============================================================================
