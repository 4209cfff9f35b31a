//! The RePrint transform: conditional re-normalization of signature
//! probabilities within flanking-context groups.
//!
//! A raw signature answers "how often does this exact base change occur?".
//! Its RePrint footprint answers "given that this base *is* mutated in this
//! flanking context, how likely is this particular outcome versus the
//! alternatives?" — each entry is divided by the sum over its
//! `(flank5, ref, flank3)` group, independently per signature column.

use crate::context::ContextGroup;
use crate::matrix::{FootprintMatrix, SignatureMatrix};

use std::collections::HashMap;

/// Default pseudo-count added to every entry before normalization.
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// Lower end of the documented epsilon range.
pub const EPSILON_MIN: f64 = 1e-10;

/// Upper end of the documented epsilon range.
pub const EPSILON_MAX: f64 = 1e-2;

/// Compute the RePrint footprint of a signature matrix.
///
/// For each signature column independently:
///
/// 1. `epsilon` is added to every entry, stabilizing ratios for rare
///    mutation types and keeping denominators away from zero. Sensible
///    values lie between [`EPSILON_MIN`] and [`EPSILON_MAX`] (default
///    [`DEFAULT_EPSILON`]); out-of-range values are accepted as given.
/// 2. Each entry is divided by the sum of the adjusted values over the
///    mutation types sharing its [`ContextGroup`], excluding any entry
///    whose substituted base equals the reference base. Under the
///    canonical 96-type scheme no such entry exists, so the exclusion is a
///    guard against malformed category sets rather than a normal-path
///    branch.
/// 3. A group whose denominator is exactly zero (possible only with
///    `epsilon = 0` or negative inputs) yields `0.0` for its members
///    rather than an error — incomplete data degrades, it does not abort.
///
/// The output has the same row index and column names as the input; the
/// input is left untouched.
pub fn reprint(matrix: &SignatureMatrix, epsilon: f64) -> FootprintMatrix {
    let (n_types, n_signatures) = matrix.shape();

    // Row memberships per denominator group, built once for all columns.
    let mut groups: HashMap<ContextGroup, Vec<usize>> = HashMap::new();
    for (i, t) in matrix.types().iter().enumerate() {
        groups.entry(t.group()).or_default().push(i);
    }

    let types = matrix.types();
    let input = matrix.as_slice();
    let mut data = vec![0.0; n_types * n_signatures];

    for j in 0..n_signatures {
        let adjusted: Vec<f64> = (0..n_types)
            .map(|i| input[i * n_signatures + j] + epsilon)
            .collect();

        let mut denominators: HashMap<ContextGroup, f64> = HashMap::with_capacity(groups.len());
        for (group, rows) in &groups {
            let denominator = rows
                .iter()
                .filter(|&&i| types[i].alt_base != group.ref_base)
                .map(|&i| adjusted[i])
                .sum();
            denominators.insert(*group, denominator);
        }

        for i in 0..n_types {
            let denominator = denominators[&types[i].group()];
            data[i * n_signatures + j] = if denominator != 0.0 {
                adjusted[i] / denominator
            } else {
                0.0
            };
        }
    }

    SignatureMatrix {
        data,
        n_types,
        n_signatures,
        types: matrix.types().to_vec(),
        signature_names: matrix.signature_names().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::canonical_types;

    fn uniform_matrix(value: f64) -> SignatureMatrix {
        let types = canonical_types();
        let data = vec![vec![value]; types.len()];
        SignatureMatrix::from_types(data, types, vec!["SBS1".into()]).unwrap()
    }

    #[test]
    fn uniform_signature_yields_one_third() {
        let matrix = uniform_matrix(1.0 / 96.0);
        let footprint = reprint(&matrix, 0.0);
        for i in 0..96 {
            let v = footprint.get(i, 0).unwrap();
            assert!((v - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn group_members_sum_to_one() {
        let types = canonical_types();
        // Deterministic but non-uniform values.
        let data: Vec<Vec<f64>> = (0..types.len())
            .map(|i| vec![0.001 + (i as f64) * 0.0007, 0.05 / (1.0 + i as f64)])
            .collect();
        let matrix =
            SignatureMatrix::from_types(data, types.clone(), vec!["A".into(), "B".into()])
                .unwrap();
        let footprint = reprint(&matrix, DEFAULT_EPSILON);

        for j in 0..2 {
            for t in &types {
                let total: f64 = t
                    .group()
                    .partners()
                    .iter()
                    .map(|p| {
                        let row = types.iter().position(|x| x == p).unwrap();
                        footprint.get(row, j).unwrap()
                    })
                    .sum();
                assert!((total - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn shape_and_index_preserved() {
        let matrix = uniform_matrix(0.25);
        let footprint = reprint(&matrix, DEFAULT_EPSILON);
        assert_eq!(footprint.shape(), matrix.shape());
        assert_eq!(footprint.types(), matrix.types());
        assert_eq!(footprint.signature_names(), matrix.signature_names());
    }

    #[test]
    fn input_not_mutated() {
        let matrix = uniform_matrix(0.125);
        let before = matrix.as_slice().to_vec();
        let _ = reprint(&matrix, DEFAULT_EPSILON);
        assert_eq!(matrix.as_slice(), &before[..]);
    }

    #[test]
    fn all_zero_group_with_zero_epsilon() {
        let matrix = uniform_matrix(0.0);
        let footprint = reprint(&matrix, 0.0);
        for i in 0..96 {
            assert_eq!(footprint.get(i, 0), Some(0.0));
        }
    }

    #[test]
    fn epsilon_dominates_zero_entries() {
        // A zero entry still gets epsilon/denominator, not zero.
        let types = canonical_types();
        let mut data = vec![vec![0.01]; types.len()];
        data[0][0] = 0.0;
        let matrix = SignatureMatrix::from_types(data, types, vec!["S".into()]).unwrap();
        let footprint = reprint(&matrix, 1e-4);
        let v = footprint.get(0, 0).unwrap();
        assert!(v > 0.0);
        assert!(v < 1.0 / 3.0);
    }

    #[test]
    fn missing_partner_rows_degrade_gracefully() {
        // Only one member of the A[C>_]A group is present; its denominator
        // is its own adjusted value, so the footprint is 1.
        let matrix = SignatureMatrix::new(
            vec![vec![0.3]],
            vec!["A[C>A]A".into()],
            vec!["S".into()],
        )
        .unwrap();
        let footprint = reprint(&matrix, 0.0);
        assert!((footprint.get(0, 0).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ref_to_ref_entry_excluded_from_denominator() {
        // A malformed C>C category must not inflate its group's
        // denominator, but it is itself re-normalized against the group.
        let matrix = SignatureMatrix::new(
            vec![vec![0.2], vec![0.3], vec![0.5], vec![10.0]],
            vec![
                "A[C>A]A".into(),
                "A[C>G]A".into(),
                "A[C>T]A".into(),
                "A[C>C]A".into(),
            ],
            vec!["S".into()],
        )
        .unwrap();
        let footprint = reprint(&matrix, 0.0);
        assert!((footprint.get(0, 0).unwrap() - 0.2).abs() < 1e-12);
        assert!((footprint.get(1, 0).unwrap() - 0.3).abs() < 1e-12);
        assert!((footprint.get(2, 0).unwrap() - 0.5).abs() < 1e-12);
        assert!((footprint.get(3, 0).unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn deterministic_across_calls() {
        let matrix = uniform_matrix(0.031);
        let a = reprint(&matrix, DEFAULT_EPSILON);
        let b = reprint(&matrix, DEFAULT_EPSILON);
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn columns_are_independent() {
        let types = canonical_types();
        let paired: Vec<Vec<f64>> = (0..types.len())
            .map(|i| vec![1.0 / 96.0, 0.002 * (i as f64 + 1.0)])
            .collect();
        let single: Vec<Vec<f64>> = paired.iter().map(|r| vec![r[0]]).collect();

        let both = SignatureMatrix::from_types(
            paired,
            types.clone(),
            vec!["U".into(), "V".into()],
        )
        .unwrap();
        let alone = SignatureMatrix::from_types(single, types, vec!["U".into()]).unwrap();

        let fp_both = reprint(&both, 1e-4);
        let fp_alone = reprint(&alone, 1e-4);
        for i in 0..96 {
            assert_eq!(fp_both.get(i, 0), fp_alone.get(i, 0));
        }
    }
}
