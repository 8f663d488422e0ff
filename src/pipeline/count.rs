//! Genome frequency of bait k-mers, without rewriting anything.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::config::KmerSize;
use crate::error::{PulldownError, Result};
use crate::io::fasta::read_fasta_records;
use crate::kmer::codec::decode_kmer;
use crate::kmer::frequency::{write_histogram, FrequencyCounter};
use crate::kmer::KmerSet;
use crate::pipeline::mask::index_baits;

#[derive(Debug, Clone)]
pub struct CountConfig {
    pub k: KmerSize,
    pub genome: PathBuf,
    /// Histogram destination, stdout when unset
    pub histogram: Option<PathBuf>,
    /// Per-k-mer `kmer\tcount` table
    pub counts: Option<PathBuf>,
}

/// Write one line per k-mer, ordered by k-mer text.
pub fn write_count_table<W: Write>(counter: &FrequencyCounter, k: KmerSize, mut writer: W) -> io::Result<()> {
    let mut rows: Vec<(u64, u64)> = counter.counts().iter().map(|(&kmer, &count)| (kmer, count)).collect();
    // Packed order matches lexicographic order of the decoded text
    rows.sort_unstable();
    writeln!(writer, "kmer\tcount")?;
    for (kmer, count) in rows {
        writeln!(writer, "{}\t{}", decode_kmer(k.get(), kmer), count)?;
    }
    writer.flush()
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| PulldownError::io(path, e))
}

/// Count both strands of every bait k-mer across the genome.
pub fn run_count(baits_path: impl AsRef<Path>, config: &CountConfig) -> Result<FrequencyCounter> {
    let start = Instant::now();
    let baits_path = baits_path.as_ref();
    let baits = read_fasta_records(baits_path)?;

    let mut unused = KmerSet::default();
    let candidates = index_baits(&baits, config.k, None, &mut unused);
    info!(
        "Indexed {} distinct k-mers from {} baits",
        candidates.len(),
        baits.len()
    );

    let mut counter = FrequencyCounter::new(config.k, candidates.into_iter().map(|(kmer, _)| kmer));
    counter.count_reference(&config.genome)?;

    match config.histogram.as_ref() {
        Some(path) => {
            write_histogram(&counter.histogram(), create(path)?).map_err(|e| PulldownError::io(path, e))?
        }
        None => write_histogram(&counter.histogram(), io::stdout().lock())
            .map_err(|e| PulldownError::io("-", e))?,
    }
    if let Some(path) = config.counts.as_ref() {
        write_count_table(&counter, config.k, create(path)?).map_err(|e| PulldownError::io(path, e))?;
    }

    info!("Counting finished in {:.2?}", start.elapsed());
    Ok(counter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer::codec::encode_kmer;

    #[test]
    fn test_run_count_writes_tables() {
        let dir = tempfile::tempdir().unwrap();
        let baits = dir.path().join("baits.fa");
        let genome = dir.path().join("genome.fa");
        std::fs::write(&baits, ">b1\nAAAC\n").unwrap();
        std::fs::write(&genome, ">chr1\nAAACAAAC\n>chr2\nGTTT\n").unwrap();

        let k = KmerSize::new(3).unwrap();
        let config = CountConfig {
            k,
            genome: genome.clone(),
            histogram: Some(dir.path().join("hist.tsv")),
            counts: Some(dir.path().join("counts.tsv")),
        };
        let counter = run_count(&baits, &config).unwrap();

        // AAA, AAC and their reverse complements TTT, GTT
        assert_eq!(counter.counts().len(), 4);
        assert_eq!(counter.get(encode_kmer(b"AAC").unwrap()), Some(2));
        assert_eq!(counter.get(encode_kmer(b"AAA").unwrap()), Some(2));
        assert_eq!(counter.get(encode_kmer(b"GTT").unwrap()), Some(1));
        assert_eq!(counter.get(encode_kmer(b"TTT").unwrap()), Some(1));

        let table = std::fs::read_to_string(dir.path().join("counts.tsv")).unwrap();
        assert_eq!(table, "kmer\tcount\nAAA\t2\nAAC\t2\nGTT\t1\nTTT\t1\n");

        let hist = std::fs::read_to_string(dir.path().join("hist.tsv")).unwrap();
        assert_eq!(hist, "frequency\tcount\n1\t2\n2\t2\n");
    }
}
