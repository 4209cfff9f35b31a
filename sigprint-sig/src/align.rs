//! Reference/query signature alignment.
//!
//! Merges a reference signature set with a user-supplied query set on their
//! shared mutation-type keys and maps each query to its nearest reference.
//! The inner join runs *before* any transform or distance computation:
//! RePrint denominators and pairwise distances over a misaligned context
//! set would be meaningless.

use sigprint_core::{Result, SigprintError};
use sigprint_ml::{compute_distance, DistanceMetric};

use crate::context::MutationType;
use crate::matrix::SignatureMatrix;

use std::collections::HashMap;

/// Column suffix applied to the reference set.
pub const REFERENCE_SUFFIX: &str = "_ref";

/// Column suffix applied to the query set.
pub const QUERY_SUFFIX: &str = "_query";

/// Combine a reference and a query signature set into one matrix.
///
/// Reference columns are suffixed `_ref`, query columns `_query`, and rows
/// are restricted to the mutation types present in both inputs, in
/// reference order. Disjoint type sets produce an empty (0-row) matrix —
/// "no comparable data" is a caller-visible outcome, not an error.
pub fn align(reference: &SignatureMatrix, query: &SignatureMatrix) -> Result<SignatureMatrix> {
    // First occurrence wins if a query repeats a mutation type.
    let mut query_rows: HashMap<MutationType, usize> = HashMap::new();
    for (i, t) in query.types().iter().enumerate() {
        query_rows.entry(*t).or_insert(i);
    }

    let (_, n_ref) = reference.shape();
    let (_, n_query) = query.shape();
    let n_signatures = n_ref + n_query;

    let mut types: Vec<MutationType> = Vec::new();
    let mut data: Vec<f64> = Vec::new();
    for (i, t) in reference.types().iter().enumerate() {
        if let (Some(&qi), Some(ref_row)) = (query_rows.get(t), reference.row(i)) {
            if let Some(query_row) = query.row(qi) {
                types.push(*t);
                data.extend_from_slice(ref_row);
                data.extend_from_slice(query_row);
            }
        }
    }

    let mut signature_names: Vec<String> = Vec::with_capacity(n_signatures);
    for name in reference.signature_names() {
        signature_names.push(format!("{name}{REFERENCE_SUFFIX}"));
    }
    for name in query.signature_names() {
        signature_names.push(format!("{name}{QUERY_SUFFIX}"));
    }

    Ok(SignatureMatrix {
        data,
        n_types: types.len(),
        n_signatures,
        types,
        signature_names,
    })
}

/// Find the reference column closest to a query column under the given
/// metric.
///
/// Ties (and all-NaN distance sweeps) resolve to the first reference in
/// iteration order. Unknown labels are an error.
pub fn nearest_reference(
    matrix: &SignatureMatrix,
    query_label: &str,
    reference_labels: &[&str],
    metric: DistanceMetric,
) -> Result<String> {
    if reference_labels.is_empty() {
        return Err(SigprintError::InvalidInput(
            "no reference labels to compare against".into(),
        ));
    }
    let query = matrix.column_by_name(query_label).ok_or_else(|| {
        SigprintError::InvalidInput(format!("unknown query signature '{query_label}'"))
    })?;

    let mut best_idx = 0;
    let mut best_dist = f64::INFINITY;
    for (k, label) in reference_labels.iter().enumerate() {
        let reference = matrix.column_by_name(label).ok_or_else(|| {
            SigprintError::InvalidInput(format!("unknown reference signature '{label}'"))
        })?;
        let d = compute_distance(&query, &reference, metric)?;
        if d < best_dist {
            best_dist = d;
            best_idx = k;
        }
    }
    Ok(reference_labels[best_idx].to_string())
}

/// Render one annotated label per reference for dendrogram display:
/// queries mapping to a reference are listed before it, e.g.
/// `"SBS7_query, SBS11_query → SBS7_ref"`. References with no mapped
/// query keep their plain name.
pub fn annotate_references(
    matrix: &SignatureMatrix,
    query_labels: &[&str],
    reference_labels: &[&str],
    metric: DistanceMetric,
) -> Result<Vec<String>> {
    let mut assigned: HashMap<String, Vec<&str>> = HashMap::new();
    for &query in query_labels {
        let nearest = nearest_reference(matrix, query, reference_labels, metric)?;
        assigned.entry(nearest).or_default().push(query);
    }

    Ok(reference_labels
        .iter()
        .map(|&reference| match assigned.get(reference) {
            Some(queries) => format!("{} \u{2192} {reference}", queries.join(", ")),
            None => reference.to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(keys: &[&str], names: &[&str], data: Vec<Vec<f64>>) -> SignatureMatrix {
        SignatureMatrix::new(
            data,
            keys.iter().map(|k| k.to_string()).collect(),
            names.iter().map(|n| n.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn align_inner_joins_on_type_keys() {
        let reference = matrix(
            &["A[C>A]A", "A[C>G]A", "A[C>T]A"],
            &["SBS1"],
            vec![vec![0.1], vec![0.2], vec![0.7]],
        );
        let query = matrix(
            &["A[C>G]A", "A[C>T]A", "T[T>G]T"],
            &["Q1"],
            vec![vec![0.5], vec![0.4], vec![0.1]],
        );
        let aligned = align(&reference, &query).unwrap();
        assert_eq!(aligned.shape(), (2, 2));
        assert_eq!(
            aligned.type_keys(),
            vec!["A[C>G]A".to_string(), "A[C>T]A".to_string()]
        );
        assert_eq!(
            aligned.signature_names(),
            &["SBS1_ref".to_string(), "Q1_query".to_string()]
        );
        assert_eq!(aligned.column_by_name("SBS1_ref"), Some(vec![0.2, 0.7]));
        assert_eq!(aligned.column_by_name("Q1_query"), Some(vec![0.5, 0.4]));
    }

    #[test]
    fn align_disjoint_keys_gives_empty_matrix() {
        let reference = matrix(&["A[C>A]A"], &["SBS1"], vec![vec![1.0]]);
        let query = matrix(&["T[T>G]T"], &["Q1"], vec![vec![1.0]]);
        let aligned = align(&reference, &query).unwrap();
        assert_eq!(aligned.shape(), (0, 2));
        assert_eq!(
            aligned.signature_names(),
            &["SBS1_ref".to_string(), "Q1_query".to_string()]
        );
    }

    #[test]
    fn align_preserves_reference_row_order() {
        let reference = matrix(
            &["A[C>T]A", "A[C>A]A"],
            &["SBS1"],
            vec![vec![0.7], vec![0.3]],
        );
        let query = matrix(
            &["A[C>A]A", "A[C>T]A"],
            &["Q1"],
            vec![vec![0.4], vec![0.6]],
        );
        let aligned = align(&reference, &query).unwrap();
        assert_eq!(
            aligned.type_keys(),
            vec!["A[C>T]A".to_string(), "A[C>A]A".to_string()]
        );
        assert_eq!(aligned.column_by_name("Q1_query"), Some(vec![0.6, 0.4]));
    }

    #[test]
    fn nearest_reference_picks_identical_column() {
        let m = matrix(
            &["A[C>A]A", "A[C>G]A", "A[C>T]A"],
            &["R1", "R2", "Q"],
            vec![
                vec![0.8, 0.1, 0.7],
                vec![0.1, 0.8, 0.2],
                vec![0.1, 0.1, 0.1],
            ],
        );
        // Q = [0.7, 0.2, 0.1] points the same way as R1 = [0.8, 0.1, 0.1].
        let nearest =
            nearest_reference(&m, "Q", &["R1", "R2"], DistanceMetric::Cosine).unwrap();
        assert_eq!(nearest, "R1");
    }

    #[test]
    fn nearest_reference_tie_takes_first() {
        let m = matrix(
            &["A[C>A]A", "A[C>G]A"],
            &["R1", "R2", "Q"],
            vec![vec![1.0, 1.0, 1.0], vec![2.0, 2.0, 2.0]],
        );
        let nearest = nearest_reference(&m, "Q", &["R1", "R2"], DistanceMetric::Cosine).unwrap();
        assert_eq!(nearest, "R1");
    }

    #[test]
    fn nearest_reference_unknown_labels() {
        let m = matrix(&["A[C>A]A"], &["R1", "Q"], vec![vec![1.0, 1.0]]);
        assert!(nearest_reference(&m, "missing", &["R1"], DistanceMetric::Rmse).is_err());
        assert!(nearest_reference(&m, "Q", &["missing"], DistanceMetric::Rmse).is_err());
        assert!(nearest_reference(&m, "Q", &[], DistanceMetric::Rmse).is_err());
    }

    #[test]
    fn annotate_references_formats_assignments() {
        let m = matrix(
            &["A[C>A]A", "A[C>G]A", "A[C>T]A"],
            &["R1", "R2", "Q1", "Q2"],
            vec![
                vec![0.9, 0.0, 0.8, 0.7],
                vec![0.1, 0.1, 0.2, 0.3],
                vec![0.0, 0.9, 0.0, 0.0],
            ],
        );
        let labels =
            annotate_references(&m, &["Q1", "Q2"], &["R1", "R2"], DistanceMetric::Cosine)
                .unwrap();
        assert_eq!(labels, vec!["Q1, Q2 \u{2192} R1".to_string(), "R2".to_string()]);
    }
}
