//! The condition tree.

use super::builder::FragmentBuilder;
use super::comparator::Comparator;
use super::conjunction::Conjunction;
use super::error::ConditionError;
use super::terminal::Terminal;
use super::token::tokenize;
use crate::primitives::{ItemId, Responses};
use crate::survey::ItemDefinitions;
use std::fmt;

/// A node of a condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Terminal(Terminal),
    Comparator(Comparator),
    Conjunction(Conjunction),
}

impl Fragment {
    /// Parse a condition sentence.
    ///
    /// Every structural problem is reported here, with the position of the
    /// offending token. A fragment returned by `parse` always evaluates.
    pub fn parse(sentence: &str) -> Result<Self, ConditionError> {
        let tokens = tokenize(sentence)?;
        let Some(last) = tokens.len().checked_sub(1) else {
            return Err(ConditionError::Empty);
        };
        let last_token = tokens[last].to_string();

        let mut builder = FragmentBuilder::new();
        for (position, token) in tokens.into_iter().enumerate() {
            let text = token.to_string();
            builder
                .push(token)
                .map_err(|kind| ConditionError::Syntax {
                    position,
                    token: text,
                    kind,
                })?;
        }
        builder.finish().map_err(|kind| ConditionError::Syntax {
            position: last,
            token: last_token,
            kind,
        })
    }

    /// Evaluate against recorded responses.
    pub fn evaluate(&self, responses: &Responses) -> bool {
        match self {
            Self::Terminal(terminal) => terminal.evaluate(responses),
            Self::Comparator(comparator) => comparator.evaluate(responses),
            Self::Conjunction(conjunction) => conjunction.evaluate(responses),
        }
    }

    /// Check item references and operand kinds against item definitions.
    pub fn validate(&self, items: &ItemDefinitions) -> Result<(), ConditionError> {
        match self {
            Self::Terminal(terminal) => terminal.validate(items),
            Self::Comparator(comparator) => comparator.validate(items),
            Self::Conjunction(conjunction) => conjunction.validate(items),
        }
    }

    /// Items referenced by this condition, in sentence order, without repeats.
    pub fn referenced_items(&self) -> Vec<&ItemId> {
        let mut found = Vec::new();
        self.collect_items(&mut found);
        found
    }

    fn collect_items<'a>(&'a self, found: &mut Vec<&'a ItemId>) {
        match self {
            Self::Terminal(terminal) => push_item(found, terminal),
            Self::Comparator(comparator) => {
                push_item(found, &comparator.left);
                push_item(found, &comparator.right);
            }
            Self::Conjunction(conjunction) => {
                conjunction.left.collect_items(found);
                conjunction.right.collect_items(found);
            }
        }
    }
}

fn push_item<'a>(found: &mut Vec<&'a ItemId>, terminal: &'a Terminal) {
    if let Some(id) = terminal.item_id() {
        if !found.contains(&id) {
            found.push(id);
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(terminal) => write!(f, "{}", terminal),
            Self::Comparator(comparator) => write!(f, "{}", comparator),
            Self::Conjunction(conjunction) => write!(f, "{}", conjunction),
        }
    }
}

impl std::str::FromStr for Fragment {
    type Err = ConditionError;

    fn from_str(sentence: &str) -> Result<Self, Self::Err> {
        Self::parse(sentence)
    }
}

// =============================================================================
// TESTS
// =============================================================================
