use std::collections::BTreeMap;

use crate::distance_matrix::create_condensed_dist_matrix;
use crate::error::{Error, Result};
use crate::hierarchy::cluster_from_dist_matrix;
use crate::minhash::{self, MinHashFamily};

/// Cluster sequences based on their MinHash signatures.
///
/// `seqs` maps sequence name to nucleotide sequence. `k` is the k-mer length
/// used for sketching and `sketch_size` the number of hash values per
/// signature. `threshold` is the maximum inter-cluster distance at which
/// clusters merge, expressed as average nucleotide dissimilarity (1-ANI,
/// where ANI is average nucleotide identity); higher merges more
/// aggressively. `num_threads` bounds the workers used to fill the distance
/// matrix, defaulting to min(hardware parallelism,
/// [`crate::DEFAULT_MAX_THREADS`]).
///
/// Returns clusters of sequence names, sorted by descending cluster size
/// (equal sizes ordered by their lexicographically smallest name).
pub fn cluster_with_minhash_signatures(
    seqs: &BTreeMap<String, String>,
    k: usize,
    sketch_size: usize,
    threshold: f64,
    num_threads: Option<usize>,
) -> Result<Vec<Vec<String>>> {
    let num_seqs = seqs.len();
    if num_seqs == 0 {
        return Err(Error::InvalidParameter {
            name: "seqs",
            message: "no sequences were supplied".to_string(),
        });
    }

    let family = MinHashFamily::new(k, sketch_size)?;
    let jaccard_dist_threshold = minhash::ani_dissimilarity_to_jaccard_dist(k, threshold)?;

    info!("Producing signatures of {} sequences", num_seqs);
    let signatures_map = minhash::make_signatures_with_minhash(&family, seqs)?;

    // Assign each name a 0-based index; BTreeMap order keeps this stable.
    let mut seq_names = Vec::with_capacity(num_seqs);
    let mut signatures = Vec::with_capacity(num_seqs);
    for (name, signature) in signatures_map {
        seq_names.push(name);
        signatures.push(signature);
    }

    if num_seqs == 1 {
        return Ok(vec![seq_names]);
    }

    info!("Creating condensed distance matrix of {} sequences", num_seqs);
    let dist_matrix = create_condensed_dist_matrix(
        num_seqs,
        |i, j| Ok(family.estimate_jaccard_dist(&signatures[i], &signatures[j]) as f32),
        num_threads,
    )?;

    info!(
        "Clustering {} sequences at Jaccard distance threshold of {}",
        num_seqs, jaccard_dist_threshold
    );
    let clusters = cluster_from_dist_matrix(&dist_matrix, jaccard_dist_threshold as f32)?;

    Ok(clusters
        .into_iter()
        .map(|cluster| {
            cluster
                .into_iter()
                .map(|index| seq_names[index].clone())
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const SEQ_A: &str = "ATCGATTGCGGCATCGACTGACGGCATTGACGACTTGCAG";
    const SEQ_B: &str = "TTGACCGTGGGCTTAAGCACTTGGACCAATGCCGTAATCG";

    fn to_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(name, seq)| (name.to_string(), seq.to_string()))
            .collect()
    }

    #[test]
    fn test_two_identical_pairs_form_two_clusters() {
        init();
        let seqs = to_map(&[
            ("seqA1", SEQ_A),
            ("seqA2", SEQ_A),
            ("seqB1", SEQ_B),
            ("seqB2", SEQ_B),
        ]);
        let clusters = cluster_with_minhash_signatures(&seqs, 12, 20, 0.05, None).unwrap();
        assert_eq!(
            vec![
                vec!["seqA1".to_string(), "seqA2".to_string()],
                vec!["seqB1".to_string(), "seqB2".to_string()],
            ],
            clusters
        );
    }

    #[test]
    fn test_identical_sequences_merge_at_positive_threshold() {
        init();
        let seqs = to_map(&[("a", SEQ_A), ("b", SEQ_A)]);
        let clusters = cluster_with_minhash_signatures(&seqs, 12, 20, 0.3, None).unwrap();
        assert_eq!(vec![vec!["a".to_string(), "b".to_string()]], clusters);
    }

    #[test]
    fn test_distinct_sequences_stay_apart_at_zero_threshold() {
        init();
        let seqs = to_map(&[("a", SEQ_A), ("b", SEQ_B)]);
        let clusters = cluster_with_minhash_signatures(&seqs, 12, 20, 0.0, None).unwrap();
        assert_eq!(
            vec![vec!["a".to_string()], vec!["b".to_string()]],
            clusters
        );
    }

    #[test]
    fn test_worker_count_does_not_change_clusters() {
        init();
        let seqs = to_map(&[
            ("seqA1", SEQ_A),
            ("seqA2", SEQ_A),
            ("seqB1", SEQ_B),
            ("seqB2", SEQ_B),
        ]);
        let single = cluster_with_minhash_signatures(&seqs, 12, 20, 0.05, Some(1)).unwrap();
        let parallel = cluster_with_minhash_signatures(&seqs, 12, 20, 0.05, Some(8)).unwrap();
        assert_eq!(single, parallel);
    }

    #[test]
    fn test_single_sequence_is_a_singleton_cluster() {
        init();
        let seqs = to_map(&[("only", SEQ_A)]);
        let clusters = cluster_with_minhash_signatures(&seqs, 12, 20, 0.1, None).unwrap();
        assert_eq!(vec![vec!["only".to_string()]], clusters);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        init();
        let seqs = BTreeMap::new();
        assert!(cluster_with_minhash_signatures(&seqs, 12, 20, 0.1, None).is_err());
    }

    #[test]
    fn test_short_sequence_fails_before_clustering() {
        init();
        let seqs = to_map(&[("ok", SEQ_A), ("short", "ACGT")]);
        match cluster_with_minhash_signatures(&seqs, 12, 20, 0.1, None) {
            Err(Error::DegenerateSequence { name, .. }) => assert_eq!("short", name),
            other => panic!("expected degenerate sequence error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        init();
        let seqs = to_map(&[("a", SEQ_A), ("b", SEQ_B)]);
        assert!(cluster_with_minhash_signatures(&seqs, 0, 20, 0.1, None).is_err());
        assert!(cluster_with_minhash_signatures(&seqs, 12, 0, 0.1, None).is_err());
        assert!(cluster_with_minhash_signatures(&seqs, 12, 20, 1.5, None).is_err());
    }
}
