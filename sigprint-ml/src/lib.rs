//! Distance and clustering primitives for the Sigprint toolkit.
//!
//! This crate provides the numeric half of mutational-signature comparison:
//!
//! - **Distance metrics** — min-max-normalized RMSE, cosine distance, and
//!   KL/Jensen-Shannon divergence over signature vectors
//! - **Pairwise matrices** — condensed symmetric [`DistanceMatrix`]
//! - **Hierarchical clustering** — seven linkage methods with a
//!   dendrogram-derived leaf order for heatmap arrangement
//!
//! # Quick start
//!
//! ```
//! use sigprint_ml::{cluster, DistanceMatrix, DistanceMetric, LinkageMethod};
//!
//! let rows: Vec<Vec<f64>> = vec![
//!     vec![0.9, 0.1, 0.0],
//!     vec![0.8, 0.2, 0.0],
//!     vec![0.0, 0.1, 0.9],
//! ];
//! let refs: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
//! let distances =
//!     DistanceMatrix::from_rows_labeled(&refs, &["SBS1", "SBS2", "SBS3"], DistanceMetric::Cosine)
//!         .unwrap();
//! let dendro = cluster(&distances, LinkageMethod::Complete).unwrap();
//! assert_eq!(dendro.leaf_order().len(), 3);
//! ```

pub mod cluster;
pub mod distance;

pub use cluster::{cluster, Dendrogram, LinkageMethod, MergeStep, DEFAULT_LINKAGE_METHOD};
pub use distance::{
    compute_distance, cosine_distance, js_divergence, kl_divergence, pairwise_distances, rmse,
    DistanceMatrix, DistanceMetric,
};
