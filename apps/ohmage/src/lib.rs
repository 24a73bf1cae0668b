//! # ohmage Library
//!
//! This library exposes the ohmage app modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod sync;

pub use error::{AppError, Result};

// Re-export ohmage_core for convenience
pub use ohmage_core;
