//! Core types for Midnight Runners.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credential;
pub mod id;

pub use credential::{RefreshToken, TokenRole};
pub use id::*;
