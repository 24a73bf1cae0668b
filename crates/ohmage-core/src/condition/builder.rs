//! Incremental construction of condition trees.
//!
//! Tokens arrive left to right. The [`FragmentBuilder`] keeps a partial tree
//! whose only open slots sit on its right spine, so every new token either
//! fills the rightmost slot or wraps the tree:
//!
//! - a terminal fills the nearest incomplete comparator, or the empty right
//!   side of the rightmost conjunction;
//! - a comparator takes the lone terminal at the end of the spine as its
//!   left operand;
//! - a conjunction wraps the whole (complete) tree. `and` binds tighter than
//!   `or`, so an `and` following an `or` wraps only the `or`'s right side.

use super::comparator::{Comparator, Relation};
use super::conjunction::{Conjunction, Junction};
use super::error::BuildError;
use super::fragment::Fragment;
use super::terminal::Terminal;
use super::token::Token;
use crate::primitives::Value;

// =============================================================================
// COMPARATOR BUILDER
// =============================================================================

/// Accumulates the (at most two) operands of a comparator.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparatorBuilder {
    relation: Relation,
    left: Option<Terminal>,
    right: Option<Terminal>,
}

impl ComparatorBuilder {
    pub fn new(relation: Relation) -> Self {
        Self {
            relation,
            left: None,
            right: None,
        }
    }

    pub fn with_left(relation: Relation, left: Terminal) -> Self {
        Self {
            relation,
            left: Some(left),
            right: None,
        }
    }

    /// Add the next operand. A third operand is rejected.
    pub fn push_operand(&mut self, operand: Terminal) -> Result<(), BuildError> {
        if self.left.is_none() {
            self.left = Some(operand);
        } else if self.right.is_none() {
            self.right = Some(operand);
        } else {
            return Err(BuildError::TooManyOperands);
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn build(self) -> Result<Comparator, BuildError> {
        match (self.left, self.right) {
            (Some(left), Some(right)) => Ok(Comparator::new(self.relation, left, right)),
            _ => Err(BuildError::MissingOperand),
        }
    }
}

// =============================================================================
// PARTIAL TREE
// =============================================================================

#[derive(Debug, Clone)]
enum Node {
    Terminal(Terminal),
    Comparator(ComparatorBuilder),
    Conjunction {
        junction: Junction,
        left: Box<Node>,
        right: Option<Box<Node>>,
    },
}

impl Node {
    fn is_complete(&self) -> bool {
        match self {
            Self::Terminal(_) => true,
            Self::Comparator(builder) => builder.is_complete(),
            Self::Conjunction { right, .. } => right.as_ref().is_some_and(|r| r.is_complete()),
        }
    }

    fn accept_terminal(&mut self, terminal: Terminal) -> Result<(), BuildError> {
        match self {
            Self::Terminal(_) => Err(BuildError::UnexpectedTerminal),
            Self::Comparator(builder) => builder.push_operand(terminal),
            Self::Conjunction { right, .. } => match right {
                None => {
                    *right = Some(Box::new(Self::Terminal(terminal)));
                    Ok(())
                }
                Some(right) => right.accept_terminal(terminal),
            },
        }
    }

    fn accept_comparator(&mut self, relation: Relation) -> Result<(), BuildError> {
        match self {
            Self::Terminal(left) => {
                let left = left.clone();
                *self = Self::Comparator(ComparatorBuilder::with_left(relation, left));
                Ok(())
            }
            Self::Comparator(_) => Err(BuildError::ComparatorMerge),
            Self::Conjunction { right: None, .. } => Err(BuildError::MissingOperand),
            Self::Conjunction {
                right: Some(right), ..
            } => right.accept_comparator(relation),
        }
    }

    fn accept_conjunction(&mut self, junction: Junction) -> Result<(), BuildError> {
        if !self.is_complete() {
            return Err(BuildError::MissingOperand);
        }
        if let (
            Junction::And,
            Self::Conjunction {
                junction: Junction::Or,
                right: Some(right),
                ..
            },
        ) = (junction, &mut *self)
        {
            return right.accept_conjunction(junction);
        }
        let left = std::mem::replace(self, Self::placeholder());
        *self = Self::Conjunction {
            junction,
            left: Box::new(left),
            right: None,
        };
        Ok(())
    }

    fn into_fragment(self) -> Result<Fragment, BuildError> {
        match self {
            Self::Terminal(terminal) => Ok(Fragment::Terminal(terminal)),
            Self::Comparator(builder) => builder.build().map(Fragment::Comparator),
            Self::Conjunction {
                junction,
                left,
                right,
            } => {
                let right = right.ok_or(BuildError::MissingOperand)?;
                Ok(Fragment::Conjunction(Conjunction::new(
                    junction,
                    left.into_fragment()?,
                    right.into_fragment()?,
                )))
            }
        }
    }

    // Occupies a slot for the duration of a `mem::replace`.
    fn placeholder() -> Self {
        Self::Terminal(Terminal::Literal(Value::NotDisplayed))
    }
}

// =============================================================================
// FRAGMENT BUILDER
// =============================================================================

/// Longest token stream a builder accepts.
///
/// Trees are walked recursively, so their depth has to stay bounded; a
/// sentence of `MAX_TOKENS` tokens nests at most `MAX_TOKENS / 2` levels.
pub const MAX_TOKENS: usize = 512;

/// Merges tokens, left to right, into a single fragment tree.
///
/// After an error the builder is left unchanged, so callers may report the
/// error and keep the partial tree for inspection. Every `accept_*` step
/// checks the right spine before it touches the tree.
#[derive(Debug, Clone, Default)]
pub struct FragmentBuilder {
    root: Option<Node>,
    tokens: usize,
}

impl FragmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the next token into the tree.
    pub fn push(&mut self, token: Token) -> Result<(), BuildError> {
        if self.tokens >= MAX_TOKENS {
            return Err(BuildError::TooManyTokens);
        }
        match self.root.as_mut() {
            None => match token {
                Token::Terminal(terminal) => self.root = Some(Node::Terminal(terminal)),
                Token::Comparator(_) | Token::Conjunction(_) => {
                    return Err(BuildError::MissingOperand);
                }
            },
            Some(root) => match token {
                Token::Terminal(terminal) => root.accept_terminal(terminal)?,
                Token::Comparator(relation) => root.accept_comparator(relation)?,
                Token::Conjunction(junction) => root.accept_conjunction(junction)?,
            },
        }
        self.tokens += 1;
        Ok(())
    }

    /// True when the tokens so far form a usable condition.
    pub fn is_complete(&self) -> bool {
        self.root.as_ref().is_some_and(Node::is_complete)
    }

    pub fn finish(self) -> Result<Fragment, BuildError> {
        self.root.ok_or(BuildError::Empty)?.into_fragment()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn build(tokens: Vec<Token>) -> Result<Fragment, BuildError> {
        let mut builder = FragmentBuilder::new();
        for token in tokens {
            builder.push(token)?;
        }
        builder.finish()
    }

    fn item(id: &str) -> Token {
        Token::Terminal(Terminal::item(id))
    }

    fn num(n: f64) -> Token {
        Token::Terminal(Terminal::literal(Value::Number(n)))
    }

    #[test]
    fn comparator_builder_arity() {
        let mut builder = ComparatorBuilder::new(Relation::Equal);
        assert_eq!(builder.push_operand(Terminal::item("a")), Ok(()));
        assert!(!builder.is_complete());
        assert_eq!(builder.push_operand(Terminal::item("b")), Ok(()));
        assert!(builder.is_complete());
        assert_eq!(
            builder.push_operand(Terminal::item("c")),
            Err(BuildError::TooManyOperands)
        );
    }

    #[test]
    fn comparator_builder_requires_two_operands() {
        let builder = ComparatorBuilder::with_left(Relation::Less, Terminal::item("a"));
        assert_eq!(builder.build(), Err(BuildError::MissingOperand));
    }

    #[test]
    fn single_comparison() {
        let fragment = build(vec![
            item("a"),
            Token::Comparator(Relation::GreaterOrEqual),
            num(5.0),
        ]);
        assert_eq!(
            fragment,
            Ok(Fragment::Comparator(Comparator::new(
                Relation::GreaterOrEqual,
                Terminal::item("a"),
                Terminal::literal(Value::Number(5.0)),
            )))
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        // a = 1 or b = 2 and c = 3  =>  or(a = 1, and(b = 2, c = 3))
        let fragment = build(vec![
            item("a"),
            Token::Comparator(Relation::Equal),
            num(1.0),
            Token::Conjunction(Junction::Or),
            item("b"),
            Token::Comparator(Relation::Equal),
            num(2.0),
            Token::Conjunction(Junction::And),
            item("c"),
            Token::Comparator(Relation::Equal),
            num(3.0),
        ]);
        let Ok(Fragment::Conjunction(root)) = fragment else {
            unreachable!("expected a conjunction, got {:?}", fragment);
        };
        assert_eq!(root.junction, Junction::Or);
        assert!(matches!(
            *root.right,
            Fragment::Conjunction(Conjunction {
                junction: Junction::And,
                ..
            })
        ));
    }

    #[test]
    fn same_junction_associates_left() {
        let fragment = build(vec![
            item("a"),
            Token::Conjunction(Junction::And),
            item("b"),
            Token::Conjunction(Junction::And),
            item("c"),
        ]);
        let Ok(Fragment::Conjunction(root)) = fragment else {
            unreachable!("expected a conjunction");
        };
        assert!(matches!(*root.left, Fragment::Conjunction(_)));
        assert_eq!(*root.right, Fragment::Terminal(Terminal::item("c")));
    }

    #[test]
    fn double_comparator_is_rejected() {
        let err = build(vec![
            item("a"),
            Token::Comparator(Relation::Equal),
            Token::Comparator(Relation::Equal),
        ]);
        assert_eq!(err, Err(BuildError::ComparatorMerge));
    }

    #[test]
    fn chained_comparison_is_rejected() {
        let err = build(vec![
            num(1.0),
            Token::Comparator(Relation::Less),
            item("a"),
            Token::Comparator(Relation::Less),
            num(5.0),
        ]);
        assert_eq!(err, Err(BuildError::ComparatorMerge));
    }

    #[test]
    fn third_operand_is_rejected() {
        let err = build(vec![item("a"), Token::Comparator(Relation::Equal), num(1.0), num(2.0)]);
        assert_eq!(err, Err(BuildError::TooManyOperands));
    }

    #[test]
    fn adjacent_terminals_are_rejected() {
        assert_eq!(
            build(vec![item("a"), item("b")]),
            Err(BuildError::UnexpectedTerminal)
        );
    }

    #[test]
    fn missing_operands_are_rejected() {
        assert_eq!(
            build(vec![Token::Comparator(Relation::Equal), num(1.0)]),
            Err(BuildError::MissingOperand)
        );
        assert_eq!(
            build(vec![item("a"), Token::Comparator(Relation::Equal)]),
            Err(BuildError::MissingOperand)
        );
        assert_eq!(
            build(vec![item("a"), Token::Conjunction(Junction::Or)]),
            Err(BuildError::MissingOperand)
        );
        assert_eq!(
            build(vec![
                item("a"),
                Token::Conjunction(Junction::Or),
                Token::Comparator(Relation::Equal),
            ]),
            Err(BuildError::MissingOperand)
        );
        assert_eq!(
            build(vec![
                item("a"),
                Token::Comparator(Relation::Equal),
                Token::Conjunction(Junction::And),
            ]),
            Err(BuildError::MissingOperand)
        );
        assert_eq!(build(Vec::new()), Err(BuildError::Empty));
    }

    #[test]
    fn failed_push_keeps_partial_tree() {
        let mut builder = FragmentBuilder::new();
        assert_eq!(builder.push(item("a")), Ok(()));
        assert_eq!(builder.push(Token::Comparator(Relation::Equal)), Ok(()));
        assert_eq!(
            builder.push(Token::Comparator(Relation::Less)),
            Err(BuildError::ComparatorMerge)
        );
        assert_eq!(builder.push(num(1.0)), Ok(()));
        assert!(builder.is_complete());
    }

    #[test]
    fn token_limit_is_enforced() {
        let mut builder = FragmentBuilder::new();
        assert_eq!(builder.push(item("a")), Ok(()));
        for _ in 0..(MAX_TOKENS - 1) / 2 {
            assert_eq!(builder.push(Token::Conjunction(Junction::And)), Ok(()));
            assert_eq!(builder.push(item("a")), Ok(()));
        }
        // the 512th token is still accepted, the next one is not
        assert_eq!(builder.push(Token::Conjunction(Junction::And)), Ok(()));
        assert_eq!(builder.push(item("a")), Err(BuildError::TooManyTokens));
        assert!(!builder.is_complete());
    }
}
