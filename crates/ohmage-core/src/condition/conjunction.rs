//! Binary logical fragments.

use super::error::ConditionError;
use super::fragment::Fragment;
use crate::primitives::Responses;
use crate::survey::ItemDefinitions;
use std::fmt;

/// Logical operator joining two fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Junction {
    And,
    Or,
}

impl Junction {
    /// Recognise a conjunction word (case-insensitive).
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "and" | "&&" => Some(Self::And),
            "or" | "||" => Some(Self::Or),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Two fragments joined by AND or OR.
#[derive(Debug, Clone, PartialEq)]
pub struct Conjunction {
    pub junction: Junction,
    pub left: Box<Fragment>,
    pub right: Box<Fragment>,
}

impl Conjunction {
    pub fn new(junction: Junction, left: Fragment, right: Fragment) -> Self {
        Self {
            junction,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn evaluate(&self, responses: &Responses) -> bool {
        match self.junction {
            Junction::And => self.left.evaluate(responses) && self.right.evaluate(responses),
            Junction::Or => self.left.evaluate(responses) || self.right.evaluate(responses),
        }
    }

    pub fn validate(&self, items: &ItemDefinitions) -> Result<(), ConditionError> {
        self.left.validate(items)?;
        self.right.validate(items)
    }
}

/// Renders without parentheses, so an `or` nested under an `and` reads as
/// if `and` bound tighter. Trees built by the parser never have that shape.
impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.junction, self.right)
    }
}
