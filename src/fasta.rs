use std::collections::BTreeMap;

use needletail::parse_fastx_file;

use crate::error::{Error, Result};

/// Read all sequences from a FASTA/FASTQ file (gzip detected automatically)
/// into a name -> sequence map.
///
/// The name is the first whitespace-delimited token of the record header.
/// Malformed headers and duplicate names fail fast, before any signatures
/// are built, so clusters can later be reported unambiguously by name.
pub fn read_sequences(path: &str) -> Result<BTreeMap<String, String>> {
    let mut reader = parse_fastx_file(path).map_err(|source| Error::FastaRead {
        path: path.to_string(),
        source,
    })?;

    let mut seqs = BTreeMap::new();
    while let Some(record) = reader.next() {
        let record = record.map_err(|source| Error::FastaRead {
            path: path.to_string(),
            source,
        })?;
        let name = std::str::from_utf8(record.id())
            .ok()
            .and_then(|header| header.split_whitespace().next())
            .map(|token| token.to_string());
        let name = match name {
            Some(name) => name,
            None => {
                return Err(Error::InvalidParameter {
                    name: "path",
                    message: format!("malformed sequence header in {}", path),
                })
            }
        };
        let seq = String::from_utf8_lossy(&record.seq()).to_string();
        debug!("Read sequence {} of {} bp", name, seq.len());
        if seqs.insert(name.clone(), seq).is_some() {
            return Err(Error::DuplicateSequenceName(name));
        }
    }
    Ok(seqs)
}
