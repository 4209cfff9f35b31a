//! Shared primitives for the Sigprint mutational-signature toolkit.
//!
//! `sigprint-core` provides the foundation the other Sigprint crates build on:
//!
//! - **Error types** — [`SigprintError`] and [`Result`] for structured error handling
//! - **Traits** — [`Summarizable`] for one-line summaries of analysis results

pub mod error;
pub mod traits;

pub use error::{Result, SigprintError};
pub use traits::Summarizable;
