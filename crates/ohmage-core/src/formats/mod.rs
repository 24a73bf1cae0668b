//! # Formats Module
//!
//! Binary encoding of buffered stream records.
//!
//! This module only handles format conversion (pure transformations); the
//! buffer in [`crate::storage`] decides where the bytes live.

mod persistence;

pub use persistence::*;
