//! Leaf fragments: literals and item references.

use super::error::ConditionError;
use crate::primitives::{ItemId, NOT_DISPLAYED_KEYWORD, Responses, SKIPPED_KEYWORD, Value};
use crate::survey::{ItemDefinition, ItemDefinitions, ItemKind};
use std::fmt;

static NOT_DISPLAYED: Value = Value::NotDisplayed;

/// A leaf of the condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Terminal {
    /// A constant written in the sentence.
    Literal(Value),
    /// The recorded response of a survey item.
    Item(ItemId),
}

/// What a terminal stands for once item definitions are known.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Operand<'a> {
    Item(&'a ItemDefinition),
    Literal(&'a Value),
}

impl Terminal {
    pub fn literal(value: Value) -> Self {
        Self::Literal(value)
    }

    pub fn item(id: impl Into<String>) -> Self {
        Self::Item(ItemId::new(id))
    }

    /// Parse a single word as a terminal.
    ///
    /// Literals win over item references: `true`, `5` and `SKIPPED` are
    /// never item ids. Returns `None` if the word is neither.
    pub fn parse(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("true") {
            return Some(Self::Literal(Value::Boolean(true)));
        }
        if word.eq_ignore_ascii_case("false") {
            return Some(Self::Literal(Value::Boolean(false)));
        }
        if word == SKIPPED_KEYWORD {
            return Some(Self::Literal(Value::Skipped));
        }
        if word == NOT_DISPLAYED_KEYWORD {
            return Some(Self::Literal(Value::NotDisplayed));
        }
        if let Some(text) = unquote(word) {
            return Some(Self::Literal(Value::Text(text.to_string())));
        }
        if let Some(number) = word.parse::<f64>().ok().filter(|n| n.is_finite()) {
            return Some(Self::Literal(Value::Number(number)));
        }
        ItemId::parse(word).map(Self::Item)
    }

    /// The value this terminal stands for in `responses`.
    ///
    /// Items without a recorded response resolve to `NotDisplayed`.
    pub fn resolve<'a>(&'a self, responses: &'a Responses) -> &'a Value {
        match self {
            Self::Literal(value) => value,
            Self::Item(id) => responses.get(id).unwrap_or(&NOT_DISPLAYED),
        }
    }

    /// Evaluate as a standalone condition: true iff it resolves to `true`.
    pub fn evaluate(&self, responses: &Responses) -> bool {
        matches!(self.resolve(responses), Value::Boolean(true))
    }

    /// Validate as a standalone condition: must be a boolean item or literal.
    pub fn validate(&self, items: &ItemDefinitions) -> Result<(), ConditionError> {
        match self.operand(items)? {
            Operand::Item(def) if matches!(def.kind, ItemKind::Boolean) => Ok(()),
            Operand::Literal(Value::Boolean(_)) => Ok(()),
            _ => Err(ConditionError::NotBoolean {
                subject: self.to_string(),
            }),
        }
    }

    pub(crate) fn operand<'a>(
        &'a self,
        items: &'a ItemDefinitions,
    ) -> Result<Operand<'a>, ConditionError> {
        match self {
            Self::Literal(value) => Ok(Operand::Literal(value)),
            Self::Item(id) => items
                .get(id)
                .map(Operand::Item)
                .ok_or_else(|| ConditionError::UnknownItem(id.clone())),
        }
    }

    pub fn item_id(&self) -> Option<&ItemId> {
        match self {
            Self::Item(id) => Some(id),
            Self::Literal(_) => None,
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{}", value),
            Self::Item(id) => write!(f, "{}", id),
        }
    }
}

fn unquote(word: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|quote| {
        word.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
            .filter(|inner| !inner.contains(quote))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_literals() {
        assert_eq!(
            Terminal::parse("TRUE"),
            Some(Terminal::Literal(Value::Boolean(true)))
        );
        assert_eq!(
            Terminal::parse("-2.5"),
            Some(Terminal::Literal(Value::Number(-2.5)))
        );
        assert_eq!(
            Terminal::parse("'yes'"),
            Some(Terminal::Literal(Value::Text("yes".into())))
        );
        assert_eq!(
            Terminal::parse("\"\""),
            Some(Terminal::Literal(Value::Text(String::new())))
        );
        assert_eq!(
            Terminal::parse("SKIPPED"),
            Some(Terminal::Literal(Value::Skipped))
        );
    }

    #[test]
    fn parse_item_reference() {
        assert_eq!(Terminal::parse("mood"), Some(Terminal::item("mood")));
        // non-finite numbers are not literals, and "nan" is a plain id
        assert_eq!(Terminal::parse("nan"), Some(Terminal::item("nan")));
        assert_eq!(Terminal::parse("(mood"), None);
        assert_eq!(Terminal::parse("'half"), None);
    }

    #[test]
    fn missing_response_resolves_to_not_displayed() {
        let responses = Responses::new();
        assert_eq!(
            Terminal::item("mood").resolve(&responses),
            &Value::NotDisplayed
        );
    }

    #[test]
    fn standalone_terminal_needs_true() {
        let mut responses = Responses::new();
        responses.insert(ItemId::new("smoker"), Value::Boolean(true));
        responses.insert(ItemId::new("mood"), Value::Number(1.0));

        assert!(Terminal::item("smoker").evaluate(&responses));
        assert!(!Terminal::item("mood").evaluate(&responses));
        assert!(!Terminal::item("absent").evaluate(&responses));
    }
}
