use kodama::{linkage, Method};

use crate::error::{Error, Result};

/// Cluster a condensed distance matrix by average-linkage agglomeration,
/// cutting the dendrogram at `threshold` ("distance" criterion: a higher
/// threshold gives fewer, larger clusters).
///
/// Returns clusters of 0-based observation indices partitioning 0..n, sorted
/// by descending cluster size; equally sized clusters are ordered by their
/// smallest member index, and members within a cluster ascend.
pub fn cluster_from_dist_matrix(dist_matrix: &[f32], threshold: f32) -> Result<Vec<Vec<usize>>> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(Error::InvalidParameter {
            name: "threshold",
            message: format!(
                "distance threshold must be finite and non-negative, found {}",
                threshold
            ),
        });
    }
    let num_observations = num_observations(dist_matrix.len())?;
    for (index, distance) in dist_matrix.iter().enumerate() {
        if !distance.is_finite() {
            return Err(Error::NonFiniteDistance { index });
        }
    }

    let mut condensed = dist_matrix.to_vec();
    let dendrogram = linkage(&mut condensed, num_observations, Method::Average);

    // Walk the merge steps from the root down. Nodes merged at or below the
    // threshold inherit a shared label; anything never labelled stays a
    // singleton.
    let mut membership: Vec<Option<usize>> = vec![None; 2 * num_observations - 1];
    let mut num_groups = 0;
    for (step_index, step) in dendrogram.steps().iter().enumerate().rev() {
        if step.dissimilarity <= threshold {
            let node = num_observations + step_index;
            let label = match membership[node] {
                Some(label) => label,
                None => {
                    let label = num_groups;
                    num_groups += 1;
                    membership[node] = Some(label);
                    label
                }
            };
            membership[step.cluster1] = Some(label);
            membership[step.cluster2] = Some(label);
        }
    }

    let mut labels = Vec::with_capacity(num_observations);
    for observation in 0..num_observations {
        match membership[observation] {
            Some(label) => labels.push(label),
            None => {
                labels.push(num_groups);
                num_groups += 1;
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); num_groups];
    for (observation, label) in labels.iter().enumerate() {
        groups[*label].push(observation);
    }
    groups.sort_by_key(|group| (std::cmp::Reverse(group.len()), group[0]));
    Ok(groups)
}

// Invert len = n*(n-1)/2 to recover the observation count.
fn num_observations(len: usize) -> Result<usize> {
    let n = (0.5 * ((8.0 * len as f64 + 1.0).sqrt() + 1.0)).round() as usize;
    if len == 0 || n * (n - 1) / 2 != len {
        return Err(Error::MalformedDistanceMatrix { len });
    }
    Ok(n)
}
