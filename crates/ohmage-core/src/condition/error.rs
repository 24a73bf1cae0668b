//! Errors raised while building or validating a condition.

use super::comparator::Relation;
use crate::primitives::ItemId;
use thiserror::Error;

/// Structural problem detected by a builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("operand has no comparator or conjunction to attach to")]
    UnexpectedTerminal,

    #[error("comparator already has two operands")]
    TooManyOperands,

    #[error("comparator cannot follow another comparator")]
    ComparatorMerge,

    #[error("missing operand")]
    MissingOperand,

    #[error("condition is empty")]
    Empty,

    #[error("condition is longer than {} tokens", super::builder::MAX_TOKENS)]
    TooManyTokens,
}

/// A condition sentence that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// The sentence contains no tokens.
    #[error("condition is empty")]
    Empty,

    /// A word is neither an operator, a literal nor a valid item id.
    #[error("invalid token '{token}' at position {position}")]
    InvalidToken { position: usize, token: String },

    /// The token stream does not form a well-shaped tree.
    #[error("{kind} at position {position} ('{token}')")]
    Syntax {
        position: usize,
        token: String,
        kind: BuildError,
    },

    /// A referenced item is not defined.
    #[error("unknown item '{0}'")]
    UnknownItem(ItemId),

    /// The operands of a comparison have incompatible kinds.
    #[error("'{subject}' expects a {expected} operand, found {found}")]
    TypeMismatch {
        subject: String,
        expected: &'static str,
        found: String,
    },

    /// The relation makes no sense for the operand.
    #[error("relation '{relation}' is not supported for {subject}")]
    UnsupportedRelation { relation: Relation, subject: String },

    /// A choice item compared with a key it does not define.
    #[error("{key} is not a choice of item '{item}'")]
    UnknownChoice { item: ItemId, key: String },

    /// A bare operand used as a whole condition is not boolean.
    #[error("'{subject}' is not boolean and cannot stand alone as a condition")]
    NotBoolean { subject: String },
}
