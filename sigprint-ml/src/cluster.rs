//! Agglomerative hierarchical clustering and dendrogram leaf ordering.
//!
//! Consumes a condensed [`DistanceMatrix`] and produces a merge tree in the
//! conventional linkage encoding: leaves are clusters `0..n`, and the k-th
//! merge step creates cluster `n + k`. The depth-first traversal of that
//! tree yields the leaf order used to arrange both axes of a similarity
//! heatmap into visual blocks.

use sigprint_core::{Result, SigprintError, Summarizable};

use crate::distance::DistanceMatrix;

use std::fmt;
use std::str::FromStr;

/// Linkage criterion for hierarchical clustering.
///
/// [`Ward`](LinkageMethod::Ward), [`Centroid`](LinkageMethod::Centroid) and
/// [`Median`](LinkageMethod::Median) assume Euclidean-compatible distances;
/// feeding them cosine or divergence matrices is permitted but the merge
/// heights lose their geometric interpretation, and Centroid/Median may
/// produce inversions (a merge below its children). Inversions are recorded
/// as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkageMethod {
    Single,
    Complete,
    Average,
    Weighted,
    Ward,
    Centroid,
    Median,
}

/// Default linkage for similarity heatmaps.
pub const DEFAULT_LINKAGE_METHOD: LinkageMethod = LinkageMethod::Complete;

impl LinkageMethod {
    /// Ward/Centroid/Median recurrences are exact in squared-distance space.
    fn squared_space(self) -> bool {
        matches!(
            self,
            LinkageMethod::Ward | LinkageMethod::Centroid | LinkageMethod::Median
        )
    }
}

impl FromStr for LinkageMethod {
    type Err = SigprintError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single" => Ok(LinkageMethod::Single),
            "complete" => Ok(LinkageMethod::Complete),
            "average" => Ok(LinkageMethod::Average),
            "weighted" => Ok(LinkageMethod::Weighted),
            "ward" => Ok(LinkageMethod::Ward),
            "centroid" => Ok(LinkageMethod::Centroid),
            "median" => Ok(LinkageMethod::Median),
            other => Err(SigprintError::Parse(format!(
                "unknown linkage method '{other}' \
                 (expected single, complete, average, weighted, ward, centroid, or median)"
            ))),
        }
    }
}

impl fmt::Display for LinkageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkageMethod::Single => "single",
            LinkageMethod::Complete => "complete",
            LinkageMethod::Average => "average",
            LinkageMethod::Weighted => "weighted",
            LinkageMethod::Ward => "ward",
            LinkageMethod::Centroid => "centroid",
            LinkageMethod::Median => "median",
        };
        write!(f, "{name}")
    }
}

/// A single merge step in the dendrogram.
///
/// `left` and `right` are cluster ids: `0..n` for leaves, `n + k` for the
/// cluster created by step `k`. `left < right` always.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeStep {
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    pub size: usize,
}

/// Result of hierarchical clustering: the merge tree plus its leaf order.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dendrogram {
    merges: Vec<MergeStep>,
    leaf_order: Vec<usize>,
    labels: Option<Vec<String>>,
    n_leaves: usize,
}

impl Dendrogram {
    /// Ordered merge history (n - 1 steps for n leaves).
    pub fn merges(&self) -> &[MergeStep] {
        &self.merges
    }

    /// Depth-first leaf traversal of the merge tree: a permutation of
    /// `0..n` used to reorder heatmap axes.
    pub fn leaf_order(&self) -> &[usize] {
        &self.leaf_order
    }

    /// Number of leaves (original signatures).
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    /// Labels carried over from the distance matrix, if it had any.
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    /// Labels rearranged into leaf order, when labels are present.
    pub fn ordered_labels(&self) -> Option<Vec<String>> {
        self.labels
            .as_ref()
            .map(|labels| self.leaf_order.iter().map(|&i| labels[i].clone()).collect())
    }
}

impl Summarizable for Dendrogram {
    fn summary(&self) -> String {
        format!(
            "Dendrogram: {} leaves, {} merges",
            self.n_leaves,
            self.merges.len(),
        )
    }
}

/// Run agglomerative hierarchical clustering on a precomputed distance
/// matrix.
///
/// Merge partner search scans clusters in index order with a strict `<`
/// comparison, so tied distances resolve toward the lowest original index;
/// repeated calls on identical input produce identical output.
pub fn cluster(distances: &DistanceMatrix, method: LinkageMethod) -> Result<Dendrogram> {
    let n = distances.n();
    if n < 2 {
        return Err(SigprintError::InvalidInput(format!(
            "need at least 2 signatures to cluster, got {n}"
        )));
    }

    // Working full matrix; squared for the Euclidean-recurrence methods.
    let mut dist = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let mut d = distances.get(i, j);
            if method.squared_space() {
                d = d * d;
            }
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    // Slot i holds the cluster currently rooted at original index i.
    let mut active: Vec<usize> = (0..n).collect();
    let mut cluster_id: Vec<usize> = (0..n).collect();
    let mut size: Vec<usize> = vec![1; n];
    let mut merges: Vec<MergeStep> = Vec::with_capacity(n - 1);

    for step in 0..(n - 1) {
        // Find the closest active pair (NaN distances never win the scan).
        let mut best_dist = f64::INFINITY;
        let mut best_a = active[0];
        let mut best_b = active[1];
        for (ai, &a) in active.iter().enumerate() {
            for &b in &active[ai + 1..] {
                if dist[a][b] < best_dist {
                    best_dist = dist[a][b];
                    best_a = a;
                    best_b = b;
                }
            }
        }

        let (a, b) = (best_a, best_b);
        let d_ab = dist[a][b];
        let (size_a, size_b) = (size[a], size[b]);
        let merged_size = size_a + size_b;

        let recorded = if method.squared_space() {
            d_ab.max(0.0).sqrt()
        } else {
            d_ab
        };
        let (id_a, id_b) = (cluster_id[a], cluster_id[b]);
        merges.push(MergeStep {
            left: id_a.min(id_b),
            right: id_a.max(id_b),
            distance: recorded,
            size: merged_size,
        });

        // Lance-Williams update of every other active cluster against the
        // merged pair; the result lives in slot a.
        for &c in &active {
            if c == a || c == b {
                continue;
            }
            let d_ac = dist[a][c];
            let d_bc = dist[b][c];
            let new_d = match method {
                LinkageMethod::Single => d_ac.min(d_bc),
                LinkageMethod::Complete => d_ac.max(d_bc),
                LinkageMethod::Average => {
                    let (sa, sb) = (size_a as f64, size_b as f64);
                    (sa * d_ac + sb * d_bc) / (sa + sb)
                }
                LinkageMethod::Weighted => 0.5 * (d_ac + d_bc),
                LinkageMethod::Ward => {
                    let (sa, sb, sc) = (size_a as f64, size_b as f64, size[c] as f64);
                    let t = sa + sb + sc;
                    ((sa + sc) * d_ac + (sb + sc) * d_bc - sc * d_ab) / t
                }
                LinkageMethod::Centroid => {
                    let (sa, sb) = (size_a as f64, size_b as f64);
                    let s = sa + sb;
                    (sa * d_ac + sb * d_bc) / s - sa * sb * d_ab / (s * s)
                }
                LinkageMethod::Median => 0.5 * d_ac + 0.5 * d_bc - 0.25 * d_ab,
            };
            dist[a][c] = new_d;
            dist[c][a] = new_d;
        }

        cluster_id[a] = n + step;
        size[a] = merged_size;
        active.retain(|&c| c != b);
    }

    let leaf_order = leaf_traversal(&merges, n);
    Ok(Dendrogram {
        merges,
        leaf_order,
        labels: distances.labels().map(|l| l.to_vec()),
        n_leaves: n,
    })
}

/// Depth-first, left-child-first traversal from the root of the merge tree.
fn leaf_traversal(merges: &[MergeStep], n: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(n);
    let mut stack = vec![n + merges.len() - 1];
    while let Some(id) = stack.pop() {
        if id < n {
            order.push(id);
        } else {
            let merge = &merges[id - n];
            // Right pushed first so the left subtree is visited first.
            stack.push(merge.right);
            stack.push(merge.left);
        }
    }
    order
}
