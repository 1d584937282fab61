use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

/// Seed mixed into every k-mer hash so that signatures are deterministic
/// across runs and across hasher instances of the same family.
const KMER_HASH_SEED: u64 = 0x51ab_70f0_d4b7_3c91;

/// A MinHash signature: the smallest distinct k-mer hashes of a sequence, in
/// ascending order. Usually `sketch_size` long, shorter when the sequence
/// has fewer distinct k-mers than that.
pub type Signature = Vec<u64>;

/// A family of MinHash sketching functions over k-mers.
///
/// `k` is the window length used to tokenise sequences and `sketch_size` is
/// the number of minimum hash values retained per signature. Smaller `k` is
/// more sensitive for divergent sequences but risks false positives; larger
/// `sketch_size` is more accurate but slower. Signatures are only comparable
/// when produced by the same hasher drawn from the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinHashFamily {
    k: usize,
    sketch_size: usize,
}

impl MinHashFamily {
    pub fn new(k: usize, sketch_size: usize) -> Result<MinHashFamily> {
        if k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "k-mer length must be at least 1".to_string(),
            });
        }
        if sketch_size == 0 {
            return Err(Error::InvalidParameter {
                name: "sketch_size",
                message: "sketch size must be at least 1".to_string(),
            });
        }
        Ok(MinHashFamily { k, sketch_size })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn sketch_size(&self) -> usize {
        self.sketch_size
    }

    /// Draw one concrete sketching function from the family.
    pub fn make_hasher(&self) -> KmerHasher {
        KmerHasher {
            k: self.k,
            sketch_size: self.sketch_size,
            seed: KMER_HASH_SEED,
        }
    }

    /// Estimate the Jaccard distance between two signatures produced by the
    /// same hasher.
    ///
    /// This is the bottom-sketch estimator: take the smallest
    /// min(sketch_size, |union|) hashes of the union of the two signatures
    /// and count the fraction present in both. Signatures shorter than
    /// `sketch_size` (from sequences with few distinct k-mers) shrink the
    /// denominator rather than being padded.
    pub fn estimate_jaccard_dist(&self, a: &[u64], b: &[u64]) -> f64 {
        let mut ai = 0;
        let mut bi = 0;
        let mut taken = 0usize;
        let mut shared = 0usize;
        while taken < self.sketch_size && (ai < a.len() || bi < b.len()) {
            if ai < a.len() && bi < b.len() && a[ai] == b[bi] {
                shared += 1;
                ai += 1;
                bi += 1;
            } else if bi >= b.len() || (ai < a.len() && a[ai] < b[bi]) {
                ai += 1;
            } else {
                bi += 1;
            }
            taken += 1;
        }
        if taken == 0 {
            // Two empty signatures cannot happen via sketch(), which rejects
            // windowless sequences; treat as maximally distant regardless.
            return 1.0;
        }
        1.0 - shared as f64 / taken as f64
    }
}

/// One concrete sketching function. All sequences being compared must be
/// sketched by the same instance (see [`make_signatures_with_minhash`]).
#[derive(Debug, Clone, Copy)]
pub struct KmerHasher {
    k: usize,
    sketch_size: usize,
    seed: u64,
}

impl KmerHasher {
    /// Sketch one sequence: hash every overlapping k-mer (case-insensitive)
    /// and keep the `sketch_size` smallest distinct values, ascending.
    ///
    /// A sequence shorter than k has no windows and is an error; it must not
    /// silently become an empty sketch.
    pub fn sketch(&self, name: &str, seq: &str) -> Result<Signature> {
        let seq = seq.as_bytes();
        if seq.len() < self.k {
            return Err(Error::DegenerateSequence {
                name: name.to_string(),
                length: seq.len(),
                k: self.k,
            });
        }

        let mut mins: BTreeSet<u64> = BTreeSet::new();
        for window in seq.windows(self.k) {
            let h = hash_kmer(self.seed, window);
            if mins.len() < self.sketch_size {
                mins.insert(h);
            } else if let Some(&largest) = mins.iter().next_back() {
                if h < largest && mins.insert(h) {
                    mins.remove(&largest);
                }
            }
        }
        Ok(mins.into_iter().collect())
    }
}

/// Construct a MinHash signature for each sequence.
///
/// Exactly one hasher is drawn from the family and reused for every
/// sequence, so all returned signatures are mutually comparable; the hasher
/// is never exposed, so callers cannot accidentally mix signatures from
/// different instantiations.
pub fn make_signatures_with_minhash(
    family: &MinHashFamily,
    seqs: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, Signature>> {
    let hasher = family.make_hasher();

    let mut signatures = BTreeMap::new();
    for (name, seq) in seqs {
        signatures.insert(name.clone(), hasher.sketch(name, seq)?);
    }
    Ok(signatures)
}

/// Convert a clustering threshold expressed as average nucleotide
/// dissimilarity (1-ANI) into the equivalent Jaccard distance for k-mer
/// sketches.
///
/// Eq. 4 of the Mash paper (Ondov et al. 2016) shows that the Mash distance,
/// closely related to 1-ANI, is D = (-1/k) * ln(2j/(1+j)) where j is a
/// Jaccard similarity. Solving for j gives j = 1/(2*exp(k*D) - 1), so the
/// Jaccard distance threshold is 1 - j. For large k*D the exponential
/// saturates, j approaches 0 and the threshold approaches 1 (almost no
/// merging); the result is clamped to [0, 1] and never divides by zero.
pub fn ani_dissimilarity_to_jaccard_dist(k: usize, threshold: f64) -> Result<f64> {
    if k == 0 {
        return Err(Error::InvalidParameter {
            name: "k",
            message: "k-mer length must be at least 1".to_string(),
        });
    }
    if !threshold.is_finite() || threshold < 0.0 || threshold >= 1.0 {
        return Err(Error::InvalidParameter {
            name: "threshold",
            message: format!(
                "ANI dissimilarity threshold must be in [0, 1), found {}",
                threshold
            ),
        });
    }
    let j = 1.0 / (2.0 * (k as f64 * threshold).exp() - 1.0);
    Ok((1.0 - j).clamp(0.0, 1.0))
}

// FNV-1a over the upper-cased k-mer bytes, finished with a splitmix64 round
// so that nearby k-mers do not yield clustered hash values.
fn hash_kmer(seed: u64, kmer: &[u8]) -> u64 {
    let mut h = seed ^ 0xcbf2_9ce4_8422_2325;
    for &b in kmer {
        h ^= b.to_ascii_uppercase() as u64;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    splitmix64(h)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}
