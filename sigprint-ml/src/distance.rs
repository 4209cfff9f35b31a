//! Distance metrics and pairwise distance matrices for signature vectors.
//!
//! All metrics operate on equal-length `f64` slices (one signature over the
//! 96 mutation contexts, or over its RePrint footprint). Degenerate inputs
//! degrade to `NaN` rather than erroring so that partial results can still
//! be rendered downstream; shape violations (empty or mismatched lengths)
//! are reported as errors.

use sigprint_core::{Result, SigprintError, Summarizable};

use std::fmt;
use std::str::FromStr;

/// Clip floor applied before taking logarithms in KL/JS divergence.
const CLIP_EPS: f64 = 1e-12;

/// Supported distance metrics for signature comparison.
///
/// [`KlDivergence`](DistanceMetric::KlDivergence) is directional:
/// `d(x, y) != d(y, x)` in general. When used to build a pairwise
/// [`DistanceMatrix`] only the upper triangle is computed and mirrored, so
/// callers wanting a genuinely symmetric divergence should prefer
/// [`JsDivergence`](DistanceMetric::JsDivergence).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceMetric {
    /// Root-mean-square error after independent min-max normalization.
    Rmse,
    /// Cosine distance `1 - x·y / (‖x‖·‖y‖)`.
    Cosine,
    /// Kullback-Leibler divergence `Σ p·ln(p/q)` (directional).
    KlDivergence,
    /// Jensen-Shannon divergence (symmetrized KL via the midpoint).
    JsDivergence,
}

impl FromStr for DistanceMetric {
    type Err = SigprintError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rmse" => Ok(DistanceMetric::Rmse),
            "cosine" => Ok(DistanceMetric::Cosine),
            "kl" => Ok(DistanceMetric::KlDivergence),
            "js" => Ok(DistanceMetric::JsDivergence),
            other => Err(SigprintError::Parse(format!(
                "unknown distance metric '{other}' (expected rmse, cosine, kl, or js)"
            ))),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DistanceMetric::Rmse => "rmse",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::KlDivergence => "kl",
            DistanceMetric::JsDivergence => "js",
        };
        write!(f, "{name}")
    }
}

/// Min-max normalize into a fresh vector, ignoring NaN entries when locating
/// the extremes.
///
/// A constant vector (max == min) normalizes to all-NaN, which downstream
/// means (RMSE) skip position-wise.
fn min_max_normalized(v: &[f64]) -> Vec<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &x in v {
        if x.is_nan() {
            continue;
        }
        if x < min {
            min = x;
        }
        if x > max {
            max = x;
        }
    }
    let range = max - min;
    v.iter().map(|&x| (x - min) / range).collect()
}

/// RMSE between independently min-max-normalized vectors.
///
/// Positions where either normalized value is NaN are excluded from the
/// mean. Returns NaN when no comparable positions remain (e.g. a constant
/// input vector).
pub fn rmse(x: &[f64], y: &[f64]) -> Result<f64> {
    validate_pair(x, y)?;
    let xn = min_max_normalized(x);
    let yn = min_max_normalized(y);
    let mut sum = 0.0;
    let mut count = 0usize;
    for (a, b) in xn.iter().zip(&yn) {
        let d = a - b;
        if d.is_nan() {
            continue;
        }
        sum += d * d;
        count += 1;
    }
    if count == 0 {
        return Ok(f64::NAN);
    }
    Ok((sum / count as f64).sqrt())
}

/// Cosine distance `1 - x·y / (‖x‖·‖y‖)`.
///
/// A zero-norm input yields NaN, not 0: an all-zero signature carries no
/// directional information, and silently reporting it as identical to
/// everything would corrupt downstream clustering.
pub fn cosine_distance(x: &[f64], y: &[f64]) -> Result<f64> {
    validate_pair(x, y)?;
    let mut dot = 0.0;
    let mut norm_x = 0.0;
    let mut norm_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        dot += a * b;
        norm_x += a * a;
        norm_y += b * b;
    }
    Ok(1.0 - dot / (norm_x.sqrt() * norm_y.sqrt()))
}

/// Scale to a probability vector by dividing by the sum.
///
/// A non-positive sum leaves the vector unnormalized (defensive fallback).
fn to_probabilities(v: &[f64]) -> Vec<f64> {
    let sum: f64 = v.iter().sum();
    if sum > 0.0 {
        v.iter().map(|x| x / sum).collect()
    } else {
        v.to_vec()
    }
}

/// KL divergence over already-normalized vectors, clipped to `[1e-12, 1]`
/// to avoid log(0).
fn clipped_kl(p: &[f64], q: &[f64]) -> f64 {
    p.iter()
        .zip(q)
        .map(|(&pi, &qi)| {
            let pc = pi.clamp(CLIP_EPS, 1.0);
            let qc = qi.clamp(CLIP_EPS, 1.0);
            pc * (pc / qc).ln()
        })
        .sum()
}

/// Kullback-Leibler divergence `D_KL(x ‖ y)`.
///
/// Both inputs are normalized to probability vectors first (vectors with a
/// non-positive sum are used as-is). Directional: see [`DistanceMetric`].
pub fn kl_divergence(x: &[f64], y: &[f64]) -> Result<f64> {
    validate_pair(x, y)?;
    Ok(clipped_kl(&to_probabilities(x), &to_probabilities(y)))
}

/// Jensen-Shannon divergence, the symmetrized KL against the midpoint
/// distribution `m = (p + q) / 2`.
pub fn js_divergence(x: &[f64], y: &[f64]) -> Result<f64> {
    validate_pair(x, y)?;
    let p = to_probabilities(x);
    let q = to_probabilities(y);
    let m: Vec<f64> = p.iter().zip(&q).map(|(a, b)| 0.5 * (a + b)).collect();
    Ok(0.5 * clipped_kl(&p, &m) + 0.5 * clipped_kl(&q, &m))
}

/// Compute the distance between two vectors using the given metric.
///
/// Shape violations (empty or mismatched lengths) are errors; degenerate
/// numerics (constant vectors, zero norms) come back as NaN per the
/// individual metric contracts.
pub fn compute_distance(x: &[f64], y: &[f64], metric: DistanceMetric) -> Result<f64> {
    match metric {
        DistanceMetric::Rmse => rmse(x, y),
        DistanceMetric::Cosine => cosine_distance(x, y),
        DistanceMetric::KlDivergence => kl_divergence(x, y),
        DistanceMetric::JsDivergence => js_divergence(x, y),
    }
}

/// Symmetric distance matrix stored in condensed upper-triangle form.
///
/// For `n` signatures the condensed vector has `n*(n-1)/2` elements. Only
/// the upper triangle is computed; `get` mirrors it. With
/// [`DistanceMetric::KlDivergence`] this means entry `(j, i)` silently
/// reflects `d(i, j)` even though KL is directional — a documented caveat,
/// not an error.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceMatrix {
    condensed: Vec<f64>,
    n: usize,
    labels: Option<Vec<String>>,
}

impl DistanceMatrix {
    /// Build a distance matrix from row-vectors (one signature per row).
    pub fn from_rows(data: &[&[f64]], metric: DistanceMetric) -> Result<Self> {
        let n = data.len();
        if n < 2 {
            return Err(SigprintError::InvalidInput(
                "need at least 2 signatures".into(),
            ));
        }
        let dim = data[0].len();
        if dim == 0 {
            return Err(SigprintError::InvalidInput("empty vectors".into()));
        }
        for (i, row) in data.iter().enumerate() {
            if row.len() != dim {
                return Err(SigprintError::InvalidInput(format!(
                    "signature {} has length {}, expected {dim}",
                    i,
                    row.len()
                )));
            }
        }
        #[cfg(feature = "parallel")]
        let condensed = {
            use rayon::prelude::*;
            (0..n)
                .into_par_iter()
                .map(|i| {
                    ((i + 1)..n)
                        .map(|j| compute_distance(data[i], data[j], metric))
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect::<Vec<f64>>()
        };
        #[cfg(not(feature = "parallel"))]
        let condensed = {
            let size = n * (n - 1) / 2;
            let mut condensed = Vec::with_capacity(size);
            for i in 0..n {
                for j in (i + 1)..n {
                    condensed.push(compute_distance(data[i], data[j], metric)?);
                }
            }
            condensed
        };
        Ok(Self {
            condensed,
            n,
            labels: None,
        })
    }

    /// Build a labeled distance matrix from row-vectors.
    pub fn from_rows_labeled(
        data: &[&[f64]],
        labels: &[&str],
        metric: DistanceMetric,
    ) -> Result<Self> {
        if labels.len() != data.len() {
            return Err(SigprintError::InvalidInput(format!(
                "labels length ({}) does not match row count ({})",
                labels.len(),
                data.len()
            )));
        }
        let mut matrix = Self::from_rows(data, metric)?;
        matrix.labels = Some(labels.iter().map(|s| s.to_string()).collect());
        Ok(matrix)
    }

    /// Create from a pre-computed condensed distance vector.
    pub fn from_condensed(condensed: Vec<f64>, n: usize) -> Result<Self> {
        let expected = n * (n - 1) / 2;
        if condensed.len() != expected {
            return Err(SigprintError::InvalidInput(format!(
                "condensed length {} doesn't match n={n} (expected {expected})",
                condensed.len()
            )));
        }
        Ok(Self {
            condensed,
            n,
            labels: None,
        })
    }

    /// Attach labels to the matrix rows/columns.
    pub fn with_labels(mut self, labels: &[&str]) -> Result<Self> {
        if labels.len() != self.n {
            return Err(SigprintError::InvalidInput(format!(
                "labels length ({}) does not match n ({})",
                labels.len(),
                self.n
            )));
        }
        self.labels = Some(labels.iter().map(|s| s.to_string()).collect());
        Ok(self)
    }

    /// Get the distance between signatures `i` and `j`.
    ///
    /// Returns 0.0 when `i == j`; `(j, i)` mirrors `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        self.condensed[self.index(a, b)]
    }

    /// Number of signatures.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Row/column labels, if attached.
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    /// Access the raw condensed storage.
    pub fn condensed(&self) -> &[f64] {
        &self.condensed
    }

    /// Map (i, j) where i < j to condensed index.
    fn index(&self, i: usize, j: usize) -> usize {
        // row i starts at position: i*n - i*(i+1)/2
        i * self.n - i * (i + 1) / 2 + (j - i - 1)
    }
}

impl Summarizable for DistanceMatrix {
    fn summary(&self) -> String {
        format!("DistanceMatrix: {}x{}", self.n, self.n)
    }
}

/// Convenience alias for [`DistanceMatrix::from_rows`].
pub fn pairwise_distances(data: &[&[f64]], metric: DistanceMetric) -> Result<DistanceMatrix> {
    DistanceMatrix::from_rows(data, metric)
}

fn validate_pair(a: &[f64], b: &[f64]) -> Result<()> {
    if a.is_empty() {
        return Err(SigprintError::InvalidInput("empty vectors".into()));
    }
    if a.len() != b.len() {
        return Err(SigprintError::InvalidInput(format!(
            "length mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}
