//! Counting how often candidate k-mers occur in a reference genome.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::KmerSize;
use crate::error::Result;
use crate::io::fasta::FastaReader;
use crate::kmer::rolling::forward_kmers;
use crate::kmer::KmerCounts;

/// Tallies occurrences of a fixed candidate set; other k-mers are ignored.
pub struct FrequencyCounter {
    k: KmerSize,
    counts: KmerCounts,
}

impl FrequencyCounter {
    /// Every candidate starts at zero.
    pub fn new(k: KmerSize, candidates: impl IntoIterator<Item = u64>) -> Self {
        let counts = candidates.into_iter().map(|kmer| (kmer, 0)).collect();
        FrequencyCounter { k, counts }
    }

    /// Count the forward-strand k-mers of one sequence.
    pub fn count_sequence(&mut self, seq: &[u8]) {
        for kmer in forward_kmers(seq, self.k) {
            if let Some(count) = self.counts.get_mut(&kmer) {
                *count += 1;
            }
        }
    }

    /// Scan every sequence of a FASTA file; returns the number scanned.
    pub fn count_reference(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let start = Instant::now();
        info!("Counting {} candidate k-mers in {}", self.counts.len(), path.display());

        let mut scanned = 0;
        for record in FastaReader::from_path(path)? {
            let record = record?;
            debug!("Scanning {} ({} bp)", record.id(), record.sequence.len());
            self.count_sequence(record.sequence.as_bytes());
            scanned += 1;
        }

        info!("Scanned {} reference sequences in {:.2?}", scanned, start.elapsed());
        Ok(scanned)
    }

    pub fn get(&self, kmer: u64) -> Option<u64> {
        self.counts.get(&kmer).copied()
    }

    pub fn counts(&self) -> &KmerCounts {
        &self.counts
    }

    pub fn into_counts(self) -> KmerCounts {
        self.counts
    }

    pub fn histogram(&self) -> BTreeMap<u64, u64> {
        histogram(&self.counts)
    }
}

/// Occurrence count -> number of distinct k-mers with that count.
pub fn histogram(counts: &KmerCounts) -> BTreeMap<u64, u64> {
    let mut hist = BTreeMap::new();
    for &count in counts.values() {
        *hist.entry(count).or_insert(0) += 1;
    }
    hist
}

/// Write a histogram as TSV, ascending by frequency.
pub fn write_histogram<W: Write>(hist: &BTreeMap<u64, u64>, mut writer: W) -> io::Result<()> {
    writeln!(writer, "frequency\tcount")?;
    for (frequency, count) in hist {
        writeln!(writer, "{}\t{}", frequency, count)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer::codec::encode_kmer;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn k3() -> KmerSize {
        KmerSize::new(3).unwrap()
    }

    fn code(s: &str) -> u64 {
        encode_kmer(s.as_bytes()).unwrap()
    }

    #[test]
    fn test_counts_only_candidates() {
        let mut counter = FrequencyCounter::new(k3(), [code("ACG"), code("TTT")]);
        counter.count_sequence(b"ACGACGNACG");
        counter.count_sequence(b"GGG");
        assert_eq!(counter.get(code("ACG")), Some(3));
        assert_eq!(counter.get(code("TTT")), Some(0));
        assert_eq!(counter.get(code("GAC")), None);
    }

    #[test]
    fn test_forward_strand_only() {
        // CGT is the reverse complement of ACG and must not be counted
        let mut counter = FrequencyCounter::new(k3(), [code("ACG")]);
        counter.count_sequence(b"CGT");
        assert_eq!(counter.get(code("ACG")), Some(0));
    }

    #[test]
    fn test_count_reference_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, ">chr1").unwrap();
        writeln!(file, "AAAAC").unwrap();
        writeln!(file, "GT").unwrap();
        writeln!(file, ">chr2").unwrap();
        writeln!(file, "aaacgt").unwrap();

        let mut counter = FrequencyCounter::new(k3(), [code("AAA"), code("ACG"), code("CCC")]);
        let scanned = counter.count_reference(file.path()).unwrap();
        assert_eq!(scanned, 2);
        assert_eq!(counter.get(code("AAA")), Some(3));
        assert_eq!(counter.get(code("ACG")), Some(2));

        let hist = counter.histogram();
        assert_eq!(hist.into_iter().collect::<Vec<_>>(), vec![(0, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn test_write_histogram() {
        let mut hist = BTreeMap::new();
        hist.insert(10, 1);
        hist.insert(0, 4);
        hist.insert(2, 7);
        let mut out = Vec::new();
        write_histogram(&hist, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "frequency\tcount\n0\t4\n2\t7\n10\t1\n");
    }
}
