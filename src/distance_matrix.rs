use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::DEFAULT_MAX_THREADS;

/// Build the condensed pairwise distance matrix for `n` sequences.
///
/// The returned vector has n*(n-1)/2 entries laid out row-major over the
/// upper triangle: the distance between i and j (i < j) lives at
/// `n*i - i*(i+1)/2 + (j - i - 1)`, the form hierarchical clustering
/// routines expect.
///
/// Rows of the triangle are partitioned into contiguous runs balanced by the
/// number of pairs each row contributes (row i contributes n-1-i pairs, so
/// balancing by row count alone would skew the load). Each worker owns an
/// exclusive slice of the matrix and writes nowhere else, so no locking is
/// needed; the matrix is only read after all workers have joined. One worker
/// and many workers produce identical matrices.
///
/// `num_threads` defaults to min(available hardware parallelism,
/// [`DEFAULT_MAX_THREADS`]). Any error from `dist_fn` aborts the whole build
/// since a partially filled matrix is not usable for clustering.
pub fn create_condensed_dist_matrix<F>(
    n: usize,
    dist_fn: F,
    num_threads: Option<usize>,
) -> Result<Vec<f32>>
where
    F: Fn(usize, usize) -> Result<f32> + Sync,
{
    if n < 2 {
        return Err(Error::InvalidParameter {
            name: "n",
            message: format!("need at least 2 sequences to compare, found {}", n),
        });
    }
    let num_threads = num_threads
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1)
                .min(DEFAULT_MAX_THREADS)
        })
        .max(1);

    let num_pairs = n * (n - 1) / 2;
    debug!("Condensed distance matrix has {} entries", num_pairs);
    let mut matrix = vec![0.0f32; num_pairs];

    // Assign each worker a contiguous run of rows carrying roughly
    // num_pairs / num_threads pair evaluations.
    debug!(
        "Assigning ranges in distance matrix to {} workers",
        num_threads
    );
    let entries_per_worker = num_pairs / num_threads;
    let mut row_ranges: Vec<(usize, usize)> = Vec::with_capacity(num_threads);
    let mut range_start = 0;
    let mut entries_in_range = 0;
    for i in 0..(n - 1) {
        entries_in_range += n - 1 - i;
        if entries_in_range >= entries_per_worker && row_ranges.len() + 1 < num_threads {
            row_ranges.push((range_start, i + 1));
            range_start = i + 1;
            entries_in_range = 0;
        }
    }
    if range_start < n - 1 {
        row_ranges.push((range_start, n - 1));
    }

    // Hand each worker exclusive ownership of its slice of the matrix.
    let mut jobs: Vec<(usize, usize, &mut [f32])> = Vec::with_capacity(row_ranges.len());
    let mut rest: &mut [f32] = &mut matrix;
    for &(row_start, row_end) in &row_ranges {
        let slice_len: usize = (row_start..row_end).map(|i| n - 1 - i).sum();
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(slice_len);
        jobs.push((row_start, row_end, head));
        rest = tail;
    }
    debug_assert!(rest.is_empty());

    debug!("Filling in distance matrix with {} workers", jobs.len());
    jobs.into_par_iter()
        .try_for_each(|(row_start, row_end, slice)| {
            let mut cursor = 0;
            for i in row_start..row_end {
                for j in (i + 1)..n {
                    slice[cursor] = dist_fn(i, j)?;
                    cursor += 1;
                }
            }
            Ok(())
        })?;

    Ok(matrix)
}

/// Condensed index of the pair (i, j), i < j, among n sequences.
pub fn condensed_index(n: usize, i: usize, j: usize) -> usize {
    n * i - i * (i + 1) / 2 + (j - i - 1)
}
