//! Binary relational fragments.

use super::error::ConditionError;
use super::terminal::{Operand, Terminal};
use crate::primitives::{Responses, Value};
use crate::survey::{ItemDefinition, ItemDefinitions, ItemKind};
use std::cmp::Ordering;
use std::fmt;

/// One of the six relations a comparator can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Relation {
    /// Recognise a comparator word. Word forms are case-insensitive.
    pub fn from_word(word: &str) -> Option<Self> {
        let relation = match word.to_ascii_lowercase().as_str() {
            "=" | "==" | "eq" => Self::Equal,
            "!=" | "<>" | "ne" => Self::NotEqual,
            "<" | "lt" => Self::Less,
            "<=" | "le" => Self::LessOrEqual,
            ">" | "gt" => Self::Greater,
            ">=" | "ge" => Self::GreaterOrEqual,
            _ => return None,
        };
        Some(relation)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }

    /// True for the four relations that need an ordering.
    pub fn is_ordering(&self) -> bool {
        !matches!(self, Self::Equal | Self::NotEqual)
    }

    /// Apply the relation. Unordered pairs fail every ordering relation.
    pub fn holds(&self, left: &Value, right: &Value) -> bool {
        match self {
            Self::Equal => left.equals(right),
            Self::NotEqual => !left.equals(right),
            Self::Less => left.ordering(right) == Some(Ordering::Less),
            Self::LessOrEqual => matches!(
                left.ordering(right),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Self::Greater => left.ordering(right) == Some(Ordering::Greater),
            Self::GreaterOrEqual => matches!(
                left.ordering(right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A relation between exactly two terminals.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparator {
    pub relation: Relation,
    pub left: Terminal,
    pub right: Terminal,
}

impl Comparator {
    pub fn new(relation: Relation, left: Terminal, right: Terminal) -> Self {
        Self {
            relation,
            left,
            right,
        }
    }

    pub fn evaluate(&self, responses: &Responses) -> bool {
        let left = self.left.resolve(responses);
        let right = self.right.resolve(responses);
        self.relation.holds(left, right)
    }

    pub fn validate(&self, items: &ItemDefinitions) -> Result<(), ConditionError> {
        let left = self.left.operand(items)?;
        let right = self.right.operand(items)?;

        match (left, right) {
            (Operand::Item(a), Operand::Item(b)) => self.check_items(a, b),
            (Operand::Item(def), Operand::Literal(value))
            | (Operand::Literal(value), Operand::Item(def)) => self.check_literal(def, value),
            (Operand::Literal(a), Operand::Literal(b)) => self.check_literals(a, b),
        }
    }

    fn check_items(&self, a: &ItemDefinition, b: &ItemDefinition) -> Result<(), ConditionError> {
        if a.kind.value_kind() != b.kind.value_kind() {
            return Err(ConditionError::TypeMismatch {
                subject: a.id.to_string(),
                expected: a.kind.value_kind(),
                found: format!("{} item '{}'", b.kind.value_kind(), b.id),
            });
        }
        if self.relation.is_ordering() && matches!(a.kind, ItemKind::Boolean) {
            return Err(ConditionError::UnsupportedRelation {
                relation: self.relation,
                subject: format!("boolean item '{}'", a.id),
            });
        }
        Ok(())
    }

    fn check_literals(&self, a: &Value, b: &Value) -> Result<(), ConditionError> {
        if !self.relation.is_ordering() {
            return Ok(());
        }
        match [a, b]
            .into_iter()
            .find(|value| value.is_missing() || matches!(value, Value::Boolean(_)))
        {
            Some(value) => Err(ConditionError::UnsupportedRelation {
                relation: self.relation,
                subject: value.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn check_literal(&self, def: &ItemDefinition, value: &Value) -> Result<(), ConditionError> {
        if value.is_missing() {
            if self.relation.is_ordering() {
                return Err(ConditionError::UnsupportedRelation {
                    relation: self.relation,
                    subject: value.to_string(),
                });
            }
            return Ok(());
        }

        match (&def.kind, value) {
            (ItemKind::Number { .. }, Value::Number(_)) | (ItemKind::Text, Value::Text(_)) => {
                Ok(())
            }
            (ItemKind::Boolean, Value::Boolean(_)) => {
                if self.relation.is_ordering() {
                    Err(ConditionError::UnsupportedRelation {
                        relation: self.relation,
                        subject: format!("boolean item '{}'", def.id),
                    })
                } else {
                    Ok(())
                }
            }
            (ItemKind::SingleChoice { choices }, Value::Number(key)) => {
                if choices.iter().any(|choice| choice.key as f64 == *key) {
                    Ok(())
                } else {
                    Err(ConditionError::UnknownChoice {
                        item: def.id.clone(),
                        key: value.to_string(),
                    })
                }
            }
            (kind, value) => Err(ConditionError::TypeMismatch {
                subject: def.id.to_string(),
                expected: kind.value_kind(),
                found: format!("{} {}", value.kind_name(), value),
            }),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.relation, self.right)
    }
}

// =============================================================================
// TESTS
// =============================================================================
