//! Bait masking: prune low-entropy and over-represented k-mers, then
//! rewrite every base covered by a pruned window as `N`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{KmerSize, MaskConfig};
use crate::error::{PulldownError, Result};
use crate::io::fasta::{read_fasta_records, FastaRecord, FastaWriter};
use crate::kmer::entropy::is_low_entropy;
use crate::kmer::frequency::{write_histogram, FrequencyCounter};
use crate::kmer::rolling::kmers;
use crate::kmer::{KmerCounts, KmerSet};

/// Placeholder written over masked positions.
pub const MASK_CHAR: u8 = b'N';

/// How many distinct k-mers were seen and why they were pruned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneSummary {
    pub distinct: usize,
    pub low_entropy: usize,
    pub high_frequency: usize,
}

/// Distinct forward and reverse-complement k-mers of the baits, each mapped
/// to a zero count. With a threshold, low-entropy k-mers go to `pruned`
/// instead.
pub fn index_baits(
    baits: &[FastaRecord],
    k: KmerSize,
    min_entropy: Option<f64>,
    pruned: &mut KmerSet,
) -> KmerCounts {
    let mut candidates = KmerCounts::default();
    for bait in baits {
        for hit in kmers(bait.sequence.as_bytes(), k) {
            for kmer in [hit.forward, hit.reverse] {
                if candidates.contains_key(&kmer) || pruned.contains(&kmer) {
                    continue;
                }
                match min_entropy {
                    Some(threshold) if is_low_entropy(k, kmer, threshold) => {
                        pruned.insert(kmer);
                    }
                    _ => {
                        candidates.insert(kmer, 0);
                    }
                }
            }
        }
    }
    candidates
}

/// The immutable pruned set and the rewrite step built on it.
#[derive(Debug, Clone)]
pub struct BaitMasker {
    k: KmerSize,
    pruned: KmerSet,
    summary: PruneSummary,
}

impl BaitMasker {
    /// A masker over an explicit pruned set.
    pub fn new(k: KmerSize, pruned: KmerSet) -> Self {
        BaitMasker {
            k,
            pruned,
            summary: PruneSummary::default(),
        }
    }

    /// Index the baits and apply entropy then frequency pruning.
    pub fn build(baits: &[FastaRecord], config: &MaskConfig) -> Result<Self> {
        config.validate()?;
        let k = config.k;

        let mut pruned = KmerSet::default();
        let candidates = index_baits(baits, k, config.min_entropy, &mut pruned);
        let mut summary = PruneSummary {
            distinct: candidates.len() + pruned.len(),
            low_entropy: pruned.len(),
            high_frequency: 0,
        };
        info!(
            "Indexed {} distinct k-mers (k={}), {} below entropy threshold",
            summary.distinct,
            k.get(),
            summary.low_entropy
        );

        // The genome is only read when its counts are used
        let needs_counts = config.frequency_limit().is_some() || config.histogram.is_some();
        match config.genome.as_ref() {
            Some(genome) if needs_counts => {
                let mut counter = FrequencyCounter::new(k, candidates.into_iter().map(|(kmer, _)| kmer));
                counter.count_reference(genome)?;

                if let Some((max_count, _)) = config.frequency_limit() {
                    for (&kmer, &count) in counter.counts() {
                        if count > max_count {
                            pruned.insert(kmer);
                            summary.high_frequency += 1;
                        }
                    }
                    info!(
                        "{} k-mers occur more than {} times in the genome",
                        summary.high_frequency, max_count
                    );
                }

                if let Some(path) = config.histogram.as_ref() {
                    let file = File::create(path).map_err(|e| PulldownError::io(path, e))?;
                    write_histogram(&counter.histogram(), BufWriter::new(file))
                        .map_err(|e| PulldownError::io(path, e))?;
                    debug!("Wrote frequency histogram to {}", path.display());
                }
            }
            Some(genome) => debug!(
                "Not counting {}: neither a maximum count nor a histogram was requested",
                genome.display()
            ),
            None if config.histogram.is_some() => {
                warn!("Frequency histogram requested without a genome; skipping")
            }
            None => {}
        }

        Ok(BaitMasker {
            k,
            pruned,
            summary,
        })
    }

    pub fn pruned(&self) -> &KmerSet {
        &self.pruned
    }

    pub fn summary(&self) -> PruneSummary {
        self.summary
    }

    /// Replace every base covered by a pruned window (either strand) with `N`.
    ///
    /// Every window is tested on its own, so overlapping pruned windows mask
    /// their union. Length is preserved and unmasked bases keep their case.
    pub fn mask_sequence(&self, seq: &str) -> String {
        let k = self.k.get();
        let mut bytes = seq.as_bytes().to_vec();
        let mut masked_until = 0;
        for hit in kmers(seq.as_bytes(), self.k) {
            if self.pruned.contains(&hit.forward) || self.pruned.contains(&hit.reverse) {
                let from = hit.start.max(masked_until);
                let to = hit.start + k;
                bytes[from..to].fill(MASK_CHAR);
                masked_until = to;
            }
        }
        // Only ASCII bases are ever overwritten
        String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }

    pub fn mask_records(&self, baits: &[FastaRecord]) -> Vec<FastaRecord> {
        baits
            .iter()
            .map(|bait| FastaRecord::new(bait.name.clone(), self.mask_sequence(&bait.sequence)))
            .collect()
    }
}

/// Counts reported at the end of a masking run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaskReport {
    pub baits: usize,
    pub pruned: PruneSummary,
    pub masked_bases: usize,
}

/// Load → index → prune → rewrite → emit.
pub fn run_mask(baits_path: impl AsRef<Path>, output: impl AsRef<Path>, config: &MaskConfig) -> Result<MaskReport> {
    let start = Instant::now();
    let baits_path = baits_path.as_ref();
    let output = output.as_ref();
    config.validate()?;

    let baits = read_fasta_records(baits_path)?;
    info!("Loaded {} bait sequences from {}", baits.len(), baits_path.display());

    let masker = BaitMasker::build(&baits, config)?;
    let masked = masker.mask_records(&baits);

    let mut writer = FastaWriter::new(output)?;
    let mut masked_bases = 0;
    for (original, record) in baits.iter().zip(&masked) {
        masked_bases += count_newly_masked(&original.sequence, &record.sequence);
        writer
            .write_record(&record.name, &record.sequence)
            .map_err(|e| PulldownError::io(output, e))?;
    }
    writer.finish().map_err(|e| PulldownError::io(output, e))?;

    info!(
        "Masked {} bases across {} baits in {:.2?}",
        masked_bases,
        baits.len(),
        start.elapsed()
    );
    Ok(MaskReport {
        baits: baits.len(),
        pruned: masker.summary(),
        masked_bases,
    })
}

fn count_newly_masked(original: &str, masked: &str) -> usize {
    original
        .bytes()
        .zip(masked.bytes())
        .filter(|&(before, after)| before != after)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer::codec::encode_kmer;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn k(n: usize) -> KmerSize {
        KmerSize::new(n).unwrap()
    }

    fn code(s: &str) -> u64 {
        encode_kmer(s.as_bytes()).unwrap()
    }

    #[test]
    fn test_homopolymer_bait_fully_masked() {
        let baits = vec![FastaRecord::new("polyA", "AAAAA")];
        let mut config = MaskConfig::new(k(3));
        config.min_entropy = Some(0.5);
        let masker = BaitMasker::build(&baits, &config).unwrap();

        // AAA and its reverse complement TTT
        assert_eq!(masker.summary().low_entropy, 2);
        assert_eq!(masker.mask_sequence("AAAAA"), "NNNNN");
    }

    #[test]
    fn test_index_collects_both_strands() {
        let mut pruned = KmerSet::default();
        let candidates = index_baits(&[FastaRecord::new("b", "ACGTT")], k(3), None, &mut pruned);
        assert!(pruned.is_empty());
        // ACG CGT GTT + reverse complements CGT ACG AAC
        assert_eq!(candidates.len(), 4);
        assert!(candidates.contains_key(&code("AAC")));
        assert!(candidates.values().all(|&c| c == 0));
    }

    #[test]
    fn test_mask_covers_whole_window() {
        let pruned: KmerSet = [code("GTA")].into_iter().collect();
        let masker = BaitMasker::new(k(3), pruned);
        // TAC at offset 3 matches through its reverse complement
        assert_eq!(masker.mask_sequence("ACGTACGT"), "ACNNNNGT");
    }

    #[test]
    fn test_mask_matches_reverse_strand() {
        // GTT is the reverse complement of AAC
        let pruned: KmerSet = [code("AAC")].into_iter().collect();
        let masker = BaitMasker::new(k(3), pruned);
        assert_eq!(masker.mask_sequence("ggGTTgg"), "ggNNNgg");
    }

    #[test]
    fn test_overlapping_windows_mask_union() {
        let pruned: KmerSet = [code("CCA"), code("CAG")].into_iter().collect();
        let masker = BaitMasker::new(k(3), pruned);
        let masked = masker.mask_sequence("TCCAGTT");
        assert_eq!(masked, "TNNNNTT");
        assert_eq!(masked.len(), 7);
    }

    #[test]
    fn test_mask_is_idempotent() {
        let pruned: KmerSet = [code("ACG"), code("TTT")].into_iter().collect();
        let masker = BaitMasker::new(k(3), pruned);
        let once = masker.mask_sequence("ACGTTTTGCANACGG");
        let twice = masker.mask_sequence(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_invalid_characters_left_alone() {
        let pruned: KmerSet = [code("AAA"), code("TTT")].into_iter().collect();
        let masker = BaitMasker::new(k(3), pruned);
        assert_eq!(masker.mask_sequence("AA-AAAx"), "AA-NNNx");
    }

    #[test]
    fn test_frequency_pruning_against_genome() {
        let mut genome = NamedTempFile::new().unwrap();
        writeln!(genome, ">chr1").unwrap();
        writeln!(genome, "CCGCCGCCGCCG").unwrap();

        let baits = vec![FastaRecord::new("b1", "ATCCGAT")];
        let mut config = MaskConfig::new(k(3));
        config.max_count = Some(2);
        config.genome = Some(genome.path().to_path_buf());
        let masker = BaitMasker::build(&baits, &config).unwrap();

        // CCG occurs 4 times in the genome
        assert!(masker.pruned().contains(&code("CCG")));
        assert_eq!(masker.summary().high_frequency, 1);
        assert_eq!(masker.mask_sequence("ATCCGAT"), "ATNNNAT");
    }

    #[test]
    fn test_run_mask_preserves_order_and_length() {
        let dir = tempfile::tempdir().unwrap();
        let baits_path = dir.path().join("baits.fa");
        let out_path = dir.path().join("masked.fa");
        std::fs::write(&baits_path, ">b1\nAAAAAAAA\n>b2\nACGTGCAT\n>b3\nTTTTCTTTT\n").unwrap();

        let mut config = MaskConfig::new(k(4));
        config.min_entropy = Some(0.25);
        let report = run_mask(&baits_path, &out_path, &config).unwrap();
        assert_eq!(report.baits, 3);

        let masked = read_fasta_records(&out_path).unwrap();
        let names: Vec<&str> = masked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b1", "b2", "b3"]);
        assert_eq!(masked[0].sequence, "NNNNNNNN");
        assert_eq!(masked[1].sequence, "ACGTGCAT");
        assert_eq!(masked[2].sequence, "NNNNNNNNN");
        assert_eq!(report.masked_bases, 17);
    }

    #[test]
    fn test_genome_unused_without_limit_or_histogram() {
        let dir = tempfile::tempdir().unwrap();
        let baits_path = dir.path().join("baits.fa");
        let out_path = dir.path().join("masked.fa");
        std::fs::write(&baits_path, ">b1\nACGTGCAT\n").unwrap();

        let mut config = MaskConfig::new(k(4));
        config.genome = Some(dir.path().join("missing_genome.fa"));
        let report = run_mask(&baits_path, &out_path, &config).unwrap();

        assert_eq!(report.pruned.high_frequency, 0);
        assert_eq!(report.masked_bases, 0);
        let masked = read_fasta_records(&out_path).unwrap();
        assert_eq!(masked[0].sequence, "ACGTGCAT");
    }

    #[test]
    fn test_histogram_alone_still_reads_genome() {
        let dir = tempfile::tempdir().unwrap();
        let baits = vec![FastaRecord::new("b1", "ACGTGCAT")];
        let mut config = MaskConfig::new(k(4));
        config.genome = Some(dir.path().join("missing_genome.fa"));
        config.histogram = Some(dir.path().join("hist.tsv"));
        assert!(matches!(
            BaitMasker::build(&baits, &config),
            Err(PulldownError::Io { .. })
        ));
    }
}
