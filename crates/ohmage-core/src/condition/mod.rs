//! # Condition Module
//!
//! The survey condition language.
//!
//! A condition is a whitespace-delimited sentence such as
//! `"mood >= 5 and smoker = true"`. Parsing classifies each word as a
//! [`Token`], and a [`FragmentBuilder`] merges the tokens into a binary
//! expression tree of [`Fragment`]s:
//!
//! ```text
//!                 Conjunction(and)
//!                /                \
//!     Comparator(>=)          Comparator(=)
//!      /        \              /        \
//!  Item(mood)  Literal(5)  Item(smoker)  Literal(true)
//! ```
//!
//! Evaluation is a post-order walk over recorded responses and cannot
//! fail. Malformed sentences are rejected by the builder, and references to
//! unknown items or incompatible literals are rejected by
//! [`Fragment::validate`].

mod builder;
mod comparator;
mod conjunction;
mod error;
mod fragment;
mod terminal;
mod token;

pub use builder::{ComparatorBuilder, FragmentBuilder, MAX_TOKENS};
pub use comparator::{Comparator, Relation};
pub use conjunction::{Conjunction, Junction};
pub use error::{BuildError, ConditionError};
pub use fragment::Fragment;
pub use terminal::Terminal;
pub use token::{Token, tokenize};
