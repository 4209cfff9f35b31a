//! Mutational-signature analysis for the Sigprint toolkit.
//!
//! This crate provides the domain half of signature comparison:
//!
//! - **Context model** — the 96-category trinucleotide mutation space:
//!   parsed [`MutationType`] keys and their [`ContextGroup`] equivalence
//!   classes
//! - **Signature matrices** — dense [`SignatureMatrix`] (contexts ×
//!   signatures) with typed row index and named columns
//! - **RePrint transform** — [`reprint`], the conditional re-normalization
//!   of each mutation probability within its flanking-context group
//! - **Alignment** — [`align`] for merging reference and query sets on
//!   shared contexts, and [`nearest_reference`] for mapping queries onto
//!   their closest reference
//!
//! # Quick start
//!
//! ```
//! use sigprint_sig::{canonical_types, reprint, SignatureMatrix};
//!
//! // A flat signature: every context equally likely.
//! let types = canonical_types();
//! let data = vec![vec![1.0 / 96.0]; 96];
//! let matrix = SignatureMatrix::from_types(data, types, vec!["SBS1".into()]).unwrap();
//!
//! // With no pseudo-count, each of the 3 outcomes in a context group
//! // gets an equal share.
//! let footprint = reprint(&matrix, 0.0);
//! assert!((footprint.get(0, 0).unwrap() - 1.0 / 3.0).abs() < 1e-12);
//! ```

pub mod align;
pub mod context;
pub mod matrix;
pub mod reprint;

pub use align::{align, annotate_references, nearest_reference, QUERY_SUFFIX, REFERENCE_SUFFIX};
pub use context::{canonical_types, ContextGroup, MutationType, BASES, SUBSTITUTIONS};
pub use matrix::{concat_signatures, FootprintMatrix, SignatureMatrix};
pub use reprint::{reprint, DEFAULT_EPSILON, EPSILON_MAX, EPSILON_MIN};
