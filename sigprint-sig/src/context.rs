//! The trinucleotide mutation context model.
//!
//! A single-base substitution annotated with its 5′ and 3′ flanking bases is
//! written `N_L[X>Y]N_R`, e.g. `A[C>T]G`. Under the SBS-96 scheme the
//! reference base `X` is a pyrimidine and there are exactly
//! 6 substitutions × 4 × 4 flanks = 96 canonical categories.

use sigprint_core::{Result, SigprintError};

use std::fmt;
use std::str::FromStr;

/// The four DNA bases, in lexicographic order.
pub const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// The six pyrimidine-referenced substitution categories of the SBS-96
/// scheme, as `(ref, alt)` pairs.
pub const SUBSTITUTIONS: [(u8, u8); 6] = [
    (b'C', b'A'),
    (b'C', b'G'),
    (b'C', b'T'),
    (b'T', b'A'),
    (b'T', b'C'),
    (b'T', b'G'),
];

fn is_base(b: u8) -> bool {
    BASES.contains(&b)
}

/// A parsed mutation-type key: flanking bases, reference base, and
/// substituted base.
///
/// Parsing is the single validation point for the fixed-width
/// `N_L[X>Y]N_R` encoding; no other code indexes into the raw string.
/// The parser checks shape and base alphabet only — it deliberately does
/// not require `X` to be a pyrimidine or `X != Y`, so non-standard
/// category sets flow through to the transform, whose denominator guard
/// defines their behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationType {
    /// 5′ flanking base.
    pub flank5: u8,
    /// Reference base being mutated.
    pub ref_base: u8,
    /// Substituted (alternate) base.
    pub alt_base: u8,
    /// 3′ flanking base.
    pub flank3: u8,
}

impl MutationType {
    /// Parse the fixed-width `N_L[X>Y]N_R` form.
    pub fn parse(s: &str) -> Result<Self> {
        let b = s.as_bytes();
        if b.len() != 7 {
            return Err(SigprintError::Parse(format!(
                "mutation type '{s}': expected 7 characters, got {}",
                b.len()
            )));
        }
        if b[1] != b'[' || b[3] != b'>' || b[5] != b']' {
            return Err(SigprintError::Parse(format!(
                "mutation type '{s}': expected the form N[X>Y]N"
            )));
        }
        for &base in &[b[0], b[2], b[4], b[6]] {
            if !is_base(base) {
                return Err(SigprintError::Parse(format!(
                    "mutation type '{s}': '{}' is not one of A, C, G, T",
                    base as char
                )));
            }
        }
        Ok(Self {
            flank5: b[0],
            ref_base: b[2],
            alt_base: b[4],
            flank3: b[6],
        })
    }

    /// The flanking/reference identity that defines this mutation's
    /// denominator group in the RePrint transform.
    pub fn group(&self) -> ContextGroup {
        ContextGroup {
            flank5: self.flank5,
            ref_base: self.ref_base,
            flank3: self.flank3,
        }
    }
}

impl FromStr for MutationType {
    type Err = SigprintError;

    fn from_str(s: &str) -> Result<Self> {
        MutationType::parse(s)
    }
}

impl fmt::Display for MutationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}>{}]{}",
            self.flank5 as char, self.ref_base as char, self.alt_base as char, self.flank3 as char,
        )
    }
}

/// A `(flank5, ref_base, flank3)` equivalence class: the mutation types
/// that share it differ only in the substituted base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextGroup {
    pub flank5: u8,
    pub ref_base: u8,
    pub flank3: u8,
}

impl ContextGroup {
    /// The member mutation types of this group: the substituted base
    /// ranges over the three bases other than the reference.
    pub fn partners(&self) -> Vec<MutationType> {
        BASES
            .iter()
            .filter(|&&alt| alt != self.ref_base)
            .map(|&alt| MutationType {
                flank5: self.flank5,
                ref_base: self.ref_base,
                alt_base: alt,
                flank3: self.flank3,
            })
            .collect()
    }
}

impl fmt::Display for ContextGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}>_]{}",
            self.flank5 as char, self.ref_base as char, self.flank3 as char,
        )
    }
}

/// The 96 canonical mutation types, built once from the constant base and
/// substitution tables: substitution category outermost, then 5′ and 3′
/// flanks in base order.
pub fn canonical_types() -> Vec<MutationType> {
    let mut types = Vec::with_capacity(96);
    for &(ref_base, alt_base) in SUBSTITUTIONS.iter() {
        for &flank5 in BASES.iter() {
            for &flank3 in BASES.iter() {
                types.push(MutationType {
                    flank5,
                    ref_base,
                    alt_base,
                    flank3,
                });
            }
        }
    }
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn parse_canonical_form() {
        let m = MutationType::parse("A[C>T]G").unwrap();
        assert_eq!(m.flank5, b'A');
        assert_eq!(m.ref_base, b'C');
        assert_eq!(m.alt_base, b'T');
        assert_eq!(m.flank3, b'G');
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(MutationType::parse("A[C>T]GT").is_err());
        assert!(MutationType::parse("C>T").is_err());
        assert!(MutationType::parse("").is_err());
    }

    #[test]
    fn parse_rejects_wrong_separators() {
        assert!(MutationType::parse("A(C>T)G").is_err());
        assert!(MutationType::parse("A[C-T]G").is_err());
        assert!(MutationType::parse("A[C>T>G").is_err());
    }

    #[test]
    fn parse_rejects_non_acgt() {
        assert!(MutationType::parse("N[C>T]G").is_err());
        assert!(MutationType::parse("A[c>T]G").is_err());
        assert!(MutationType::parse("A[C>U]G").is_err());
    }

    #[test]
    fn parse_accepts_non_standard_categories() {
        // Purine reference and even ref == alt parse; the transform's
        // denominator guard decides what they mean.
        assert!(MutationType::parse("A[G>T]C").is_ok());
        assert!(MutationType::parse("A[C>C]G").is_ok());
    }

    #[test]
    fn display_round_trips() {
        for t in canonical_types() {
            let parsed = MutationType::parse(&t.to_string()).unwrap();
            assert_eq!(parsed, t);
        }
    }

    #[test]
    fn from_str_delegates() {
        let m: MutationType = "T[T>G]A".parse().unwrap();
        assert_eq!(m.to_string(), "T[T>G]A");
    }

    #[test]
    fn canonical_types_has_96_distinct() {
        let types = canonical_types();
        assert_eq!(types.len(), 96);
        let distinct: HashSet<_> = types.iter().collect();
        assert_eq!(distinct.len(), 96);
    }

    #[test]
    fn partners_are_three_and_exclude_ref() {
        let group = MutationType::parse("A[C>A]T").unwrap().group();
        let partners = group.partners();
        assert_eq!(partners.len(), 3);
        for p in &partners {
            assert_ne!(p.alt_base, p.ref_base);
            assert_eq!(p.group(), group);
        }
    }

    #[test]
    fn canonical_set_closed_under_grouping() {
        let types = canonical_types();
        let set: HashSet<_> = types.iter().copied().collect();
        for t in &types {
            for partner in t.group().partners() {
                assert!(set.contains(&partner));
            }
        }
    }

    #[test]
    fn group_display() {
        let group = MutationType::parse("A[C>A]T").unwrap().group();
        assert_eq!(group.to_string(), "A[C>_]T");
    }
}
