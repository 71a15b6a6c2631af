//! Centralized error handling module.
//!
//! Provides the structured [`AppError`] type used across the library and the
//! [`AppResult`] alias. The CLI layer wraps these in `anyhow` for reporting.

pub mod types;

pub use types::{AppError, AppResult};
