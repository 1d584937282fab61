pub mod distance_matrix;
pub mod error;
pub mod fasta;
pub mod hierarchy;
pub mod minhash;
pub mod minhash_clusterer;

#[macro_use]
extern crate log;
extern crate rayon;

pub use crate::error::{Error, Result};

pub const DEFAULT_KMER_LENGTH: &str = "12";
pub const DEFAULT_SKETCH_SIZE: &str = "100";
pub const DEFAULT_ANI_THRESHOLD: &str = "0.1";

/// Cap on the number of workers used to fill the distance matrix when the
/// caller does not specify a thread count; the actual default is
/// min(available hardware parallelism, this cap).
pub const DEFAULT_MAX_THREADS: usize = 8;
