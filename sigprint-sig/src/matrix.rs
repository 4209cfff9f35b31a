//! Dense signature matrix over the trinucleotide mutation contexts.
//!
//! [`SignatureMatrix`] stores a row-major dense matrix of `f64` values
//! (mutation types × signatures) with a typed row index and named signature
//! columns. It is the common currency of the toolkit: the RePrint transform
//! consumes one and produces a new one, and pairwise distances are computed
//! over its columns. No engine mutates a matrix in place.

use sigprint_core::{Result, SigprintError, Summarizable};
use sigprint_ml::{DistanceMatrix, DistanceMetric};

use crate::context::MutationType;

use std::collections::HashSet;

/// A dense, row-major signature matrix (mutation types × signatures).
#[derive(Debug, Clone)]
pub struct SignatureMatrix {
    pub(crate) data: Vec<f64>,
    pub(crate) n_types: usize,
    pub(crate) n_signatures: usize,
    pub(crate) types: Vec<MutationType>,
    pub(crate) signature_names: Vec<String>,
}

/// Output of the RePrint transform: same shape and indexing as the input
/// signature matrix, entries in `[0, 1]`.
pub type FootprintMatrix = SignatureMatrix;

impl SignatureMatrix {
    /// Create a matrix from row-major 2D data and raw mutation-type keys.
    ///
    /// Each inner `Vec` is one mutation type (row) with one value per
    /// signature. Keys are parsed here — the single point where a
    /// malformed key surfaces as [`SigprintError::Parse`].
    pub fn new(
        data: Vec<Vec<f64>>,
        type_keys: Vec<String>,
        signature_names: Vec<String>,
    ) -> Result<Self> {
        let types = type_keys
            .iter()
            .map(|k| MutationType::parse(k))
            .collect::<Result<Vec<_>>>()?;
        Self::from_types(data, types, signature_names)
    }

    /// Create a matrix from row-major 2D data and already-parsed types.
    pub fn from_types(
        data: Vec<Vec<f64>>,
        types: Vec<MutationType>,
        signature_names: Vec<String>,
    ) -> Result<Self> {
        let n_types = data.len();
        let n_signatures = signature_names.len();

        if types.len() != n_types {
            return Err(SigprintError::InvalidInput(format!(
                "type index length ({}) does not match row count ({n_types})",
                types.len()
            )));
        }

        let mut flat = Vec::with_capacity(n_types * n_signatures);
        for (i, row) in data.iter().enumerate() {
            if row.len() != n_signatures {
                return Err(SigprintError::InvalidInput(format!(
                    "row {i} has {} columns, expected {n_signatures}",
                    row.len()
                )));
            }
            flat.extend_from_slice(row);
        }

        Ok(Self {
            data: flat,
            n_types,
            n_signatures,
            types,
            signature_names,
        })
    }

    /// (n_types, n_signatures).
    pub fn shape(&self) -> (usize, usize) {
        (self.n_types, self.n_signatures)
    }

    /// Get a single value by row (mutation type) and column (signature)
    /// index.
    pub fn get(&self, type_idx: usize, signature_idx: usize) -> Option<f64> {
        if type_idx < self.n_types && signature_idx < self.n_signatures {
            Some(self.data[type_idx * self.n_signatures + signature_idx])
        } else {
            None
        }
    }

    /// A slice of one mutation type's values across all signatures.
    pub fn row(&self, type_idx: usize) -> Option<&[f64]> {
        if type_idx < self.n_types {
            let start = type_idx * self.n_signatures;
            Some(&self.data[start..start + self.n_signatures])
        } else {
            None
        }
    }

    /// One signature's values across all mutation types (copied out of the
    /// row-major storage).
    pub fn column(&self, signature_idx: usize) -> Option<Vec<f64>> {
        if signature_idx < self.n_signatures {
            Some(
                (0..self.n_types)
                    .map(|i| self.data[i * self.n_signatures + signature_idx])
                    .collect(),
            )
        } else {
            None
        }
    }

    /// Look up a signature column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<f64>> {
        self.signature_index(name).and_then(|j| self.column(j))
    }

    /// Position of a signature name, if present.
    pub fn signature_index(&self, name: &str) -> Option<usize> {
        self.signature_names.iter().position(|n| n == name)
    }

    /// The parsed mutation-type row index.
    pub fn types(&self) -> &[MutationType] {
        &self.types
    }

    /// The row index rendered back to canonical `N[X>Y]N` keys.
    pub fn type_keys(&self) -> Vec<String> {
        self.types.iter().map(|t| t.to_string()).collect()
    }

    /// Signature (column) names.
    pub fn signature_names(&self) -> &[String] {
        &self.signature_names
    }

    /// The raw row-major data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// A new matrix restricted to the named signatures, in request order.
    pub fn select_signatures(&self, names: &[&str]) -> Result<SignatureMatrix> {
        let indices = names
            .iter()
            .map(|name| {
                self.signature_index(name).ok_or_else(|| {
                    SigprintError::InvalidInput(format!("unknown signature '{name}'"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut data = Vec::with_capacity(self.n_types * indices.len());
        for i in 0..self.n_types {
            for &j in &indices {
                data.push(self.data[i * self.n_signatures + j]);
            }
        }
        Ok(SignatureMatrix {
            data,
            n_types: self.n_types,
            n_signatures: indices.len(),
            types: self.types.clone(),
            signature_names: names.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// A copy with every signature name suffixed (e.g. `_ref` / `_query`).
    pub fn with_column_suffix(&self, suffix: &str) -> SignatureMatrix {
        let mut renamed = self.clone();
        renamed.signature_names = self
            .signature_names
            .iter()
            .map(|n| format!("{n}{suffix}"))
            .collect();
        renamed
    }

    /// A copy with every signature name prefixed (e.g. `reprint_`).
    pub fn with_column_prefix(&self, prefix: &str) -> SignatureMatrix {
        let mut renamed = self.clone();
        renamed.signature_names = self
            .signature_names
            .iter()
            .map(|n| format!("{prefix}{n}"))
            .collect();
        renamed
    }

    /// Pairwise distances between the signature columns under the given
    /// metric, labeled with the signature names.
    ///
    /// Columns become row vectors over the mutation contexts before the
    /// metric is applied. See [`DistanceMatrix::from_rows`] for the
    /// KL-directionality caveat.
    pub fn pairwise_distances(&self, metric: DistanceMetric) -> Result<DistanceMatrix> {
        let columns: Vec<Vec<f64>> = (0..self.n_signatures)
            .map(|j| {
                (0..self.n_types)
                    .map(|i| self.data[i * self.n_signatures + j])
                    .collect()
            })
            .collect();
        let refs: Vec<&[f64]> = columns.iter().map(|c| c.as_slice()).collect();
        let labels: Vec<&str> = self.signature_names.iter().map(|s| s.as_str()).collect();
        DistanceMatrix::from_rows_labeled(&refs, &labels, metric)
    }
}

impl Summarizable for SignatureMatrix {
    fn summary(&self) -> String {
        format!(
            "SignatureMatrix: {} contexts \u{00d7} {} signatures",
            self.n_types, self.n_signatures,
        )
    }
}

/// Column-wise combination of several signature sets, keeping only mutation
/// types present in every input (inner-join row semantics, first input's
/// row order).
///
/// Duplicate signature names across the inputs are rejected — downstream
/// selection and labeling are name-keyed.
pub fn concat_signatures(matrices: &[&SignatureMatrix]) -> Result<SignatureMatrix> {
    let first = matrices.first().ok_or_else(|| {
        SigprintError::InvalidInput("need at least one matrix to concatenate".into())
    })?;

    let mut seen = HashSet::new();
    for m in matrices {
        for name in m.signature_names() {
            if !seen.insert(name.as_str()) {
                return Err(SigprintError::InvalidInput(format!(
                    "duplicate signature name '{name}' across concatenated matrices"
                )));
            }
        }
    }

    // Row indices of each shared type in every matrix, first-occurrence wins.
    let mut shared: Vec<(MutationType, Vec<usize>)> = Vec::with_capacity(first.n_types);
    'types: for (i, t) in first.types().iter().enumerate() {
        let mut positions = vec![i];
        for m in &matrices[1..] {
            match m.types().iter().position(|other| other == t) {
                Some(pos) => positions.push(pos),
                None => continue 'types,
            }
        }
        shared.push((*t, positions));
    }

    let n_signatures: usize = matrices.iter().map(|m| m.n_signatures).sum();
    let mut data = Vec::with_capacity(shared.len() * n_signatures);
    for (_, positions) in &shared {
        for (m, &pos) in matrices.iter().zip(positions) {
            // positions are valid row indices by construction
            if let Some(row) = m.row(pos) {
                data.extend_from_slice(row);
            }
        }
    }

    let types: Vec<MutationType> = shared.iter().map(|(t, _)| *t).collect();
    let signature_names: Vec<String> = matrices
        .iter()
        .flat_map(|m| m.signature_names().iter().cloned())
        .collect();

    Ok(SignatureMatrix {
        data,
        n_types: types.len(),
        n_signatures,
        types,
        signature_names,
    })
}
