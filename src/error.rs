use thiserror::Error;

/// Errors returned by signature construction, distance matrix building and
/// clustering.
#[derive(Debug, Error)]
pub enum Error {
    /// A sequence has no k-mer windows at all, so no signature can be built.
    #[error("sequence '{name}' is {length} bp, shorter than the k-mer length {k}")]
    DegenerateSequence {
        /// Sequence name as supplied by the caller.
        name: String,
        /// Length of the offending sequence.
        length: usize,
        /// Configured k-mer window length.
        k: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// A condensed distance matrix whose length is not n*(n-1)/2 for any n >= 2.
    #[error("condensed distance matrix of length {len} does not correspond to a whole number of sequences")]
    MalformedDistanceMatrix {
        /// Length of the offending matrix.
        len: usize,
    },

    /// The distance matrix contains a NaN or infinite entry.
    #[error("distance matrix entry {index} is not finite")]
    NonFiniteDistance {
        /// Condensed index of the offending entry.
        index: usize,
    },

    /// Two input sequences share a name, so clusters could not be reported
    /// unambiguously.
    #[error("duplicate sequence name '{0}'")]
    DuplicateSequenceName(String),

    /// Reading or parsing a sequence file failed.
    #[error("failed to read sequences from {path}: {source}")]
    FastaRead {
        /// Path of the file being read.
        path: String,
        /// Underlying parser error.
        source: needletail::errors::ParseError,
    },
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
