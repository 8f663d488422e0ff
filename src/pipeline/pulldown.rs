//! Paired-read pulldown against the wanted k-mers of masked baits.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::config::{KmerSize, PulldownConfig, ReadFilePair};
use crate::error::{PulldownError, Result};
use crate::io::fasta::{read_fasta_records, FastaRecord};
use crate::io::fastq::{open_fastq, stream_fastq_records, stream_paired_fastq_records, FastqWriter};
use crate::kmer::rolling::{forward_kmers, kmers};
use crate::kmer::KmerSet;
use crate::stats::{pair_key, OverlapCounts, PairSummary, PulldownStats, RunSummary};

/// Forward-strand k-mers of the (masked) baits.
#[derive(Debug, Clone)]
pub struct WantedSet {
    k: KmerSize,
    kmers: KmerSet,
}

impl WantedSet {
    pub fn from_baits(baits: &[FastaRecord], k: KmerSize) -> Self {
        let mut kmers = KmerSet::default();
        for bait in baits {
            kmers.extend(forward_kmers(bait.sequence.as_bytes(), k));
        }
        WantedSet { k, kmers }
    }

    pub fn k(&self) -> KmerSize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.kmers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kmers.is_empty()
    }

    #[inline]
    pub fn contains(&self, kmer: u64) -> bool {
        self.kmers.contains(&kmer)
    }
}

/// Scores read pairs against a wanted set, reusing its scratch sets
/// between reads.
pub struct PairMatcher<'a> {
    wanted: &'a WantedSet,
    forward: KmerSet,
    reverse: KmerSet,
}

impl<'a> PairMatcher<'a> {
    pub fn new(wanted: &'a WantedSet) -> Self {
        PairMatcher {
            wanted,
            forward: KmerSet::default(),
            reverse: KmerSet::default(),
        }
    }

    /// Distinct forward and reverse-complement k-mers of one read that are wanted.
    pub fn read_overlap(&mut self, seq: &str) -> (u32, u32) {
        self.forward.clear();
        self.reverse.clear();
        for hit in kmers(seq.as_bytes(), self.wanted.k()) {
            self.forward.insert(hit.forward);
            self.reverse.insert(hit.reverse);
        }
        let wanted = self.wanted;
        let fwd = self.forward.iter().filter(|&&kmer| wanted.contains(kmer)).count();
        let rev = self.reverse.iter().filter(|&&kmer| wanted.contains(kmer)).count();
        (fwd as u32, rev as u32)
    }

    pub fn pair_overlap(&mut self, left: &str, right: &str) -> OverlapCounts {
        let (lhs_fwd, lhs_rev) = self.read_overlap(left);
        let (rhs_fwd, rhs_rev) = self.read_overlap(right);
        OverlapCounts {
            lhs_fwd,
            lhs_rev,
            rhs_fwd,
            rhs_rev,
        }
    }
}

/// `reads/x_R1.fastq.gz` with suffix `hits` becomes `reads/x_R1.hits.fastq.gz`.
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (base, gz) = match name.strip_suffix(".gz") {
        Some(base) => (base, ".gz"),
        None => (name.as_str(), ""),
    };
    let renamed = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}.{}.{}{}", stem, suffix, ext, gz),
        _ => format!("{}.{}{}", base, suffix, gz),
    };
    input.with_file_name(renamed)
}

/// Stream one pair of read files, writing hits and recording every tuple.
pub fn pulldown_pair(
    matcher: &mut PairMatcher<'_>,
    pair: &ReadFilePair,
    config: &PulldownConfig,
    stats: &mut PulldownStats,
) -> Result<PairSummary> {
    let start = Instant::now();
    let left_name = pair.left.to_string_lossy().into_owned();
    let right_name = pair.right.to_string_lossy().into_owned();
    let key = pair_key(&left_name, &right_name);
    info!("Pulling down {} and {} (source {})", left_name, right_name, key);

    let left = stream_fastq_records(open_fastq(&pair.left)?, &pair.left);
    let right = stream_fastq_records(open_fastq(&pair.right)?, &pair.right);

    let left_out = output_path(&pair.left, &config.suffix);
    let right_out = output_path(&pair.right, &config.suffix);
    let mut left_writer = FastqWriter::new(&left_out)?;
    let mut right_writer = FastqWriter::new(&right_out)?;

    let mut total = 0u64;
    let mut kept = 0u64;
    for records in stream_paired_fastq_records(left, right) {
        let (r1, r2) = records?;
        total += 1;

        let counts = matcher.pair_overlap(&r1.sequence, &r2.sequence);
        if counts.is_hit() {
            left_writer
                .write_record(&r1)
                .map_err(|e| PulldownError::io(&left_out, e))?;
            right_writer
                .write_record(&r2)
                .map_err(|e| PulldownError::io(&right_out, e))?;
            kept += 1;
        }
        stats.record(&key, counts);

        if config.progress_every > 0 && total % config.progress_every == 0 {
            debug!("Processed {} read pairs, kept {} so far", total, kept);
        }
    }

    left_writer.finish().map_err(|e| PulldownError::io(&left_out, e))?;
    right_writer.finish().map_err(|e| PulldownError::io(&right_out, e))?;

    info!(
        "Kept {}/{} read pairs from {} in {:.2?}",
        kept,
        total,
        key,
        start.elapsed()
    );
    Ok(PairSummary {
        source: key,
        left: left_name,
        right: right_name,
        total_pairs: total,
        kept_pairs: kept,
    })
}

/// Build the wanted set from masked baits and pull down every file pair in order.
pub fn run_pulldown(baits_path: impl AsRef<Path>, config: &PulldownConfig) -> Result<(PulldownStats, RunSummary)> {
    config.validate()?;
    let baits_path = baits_path.as_ref();

    let baits = read_fasta_records(baits_path)?;
    let wanted = WantedSet::from_baits(&baits, config.k);
    info!(
        "Built wanted set of {} k-mers (k={}) from {} baits",
        wanted.len(),
        config.k.get(),
        baits.len()
    );

    let mut matcher = PairMatcher::new(&wanted);
    let mut stats = PulldownStats::new();
    let mut summary = RunSummary {
        k: config.k.get(),
        wanted_kmers: wanted.len(),
        pairs: Vec::with_capacity(config.pairs.len()),
    };
    for pair in &config.pairs {
        summary
            .pairs
            .push(pulldown_pair(&mut matcher, pair, config, &mut stats)?);
    }

    if let Some(path) = config.stats.as_ref() {
        stats.write_tsv_file(path)?;
        info!("Wrote {} statistics rows to {}", stats.rows(), path.display());
    }
    if let Some(path) = config.summary.as_ref() {
        summary.write_json(path)?;
    }
    Ok((stats, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(n: usize) -> KmerSize {
        KmerSize::new(n).unwrap()
    }

    #[test]
    fn test_wanted_set_is_forward_only() {
        let wanted = WantedSet::from_baits(&[FastaRecord::new("b", "AACGNNAAC")], k(3));
        // AAC, ACG and AAC again; GTT (reverse of AAC) is not added
        assert_eq!(wanted.len(), 2);
        assert!(wanted.contains(crate::kmer::encode_kmer(b"AAC").unwrap()));
        assert!(!wanted.contains(crate::kmer::encode_kmer(b"GTT").unwrap()));
    }

    #[test]
    fn test_read_overlap_counts_distinct() {
        let wanted = WantedSet::from_baits(&[FastaRecord::new("b", "AACG")], k(3));
        let mut matcher = PairMatcher::new(&wanted);

        // AAC appears twice but counts once
        assert_eq!(matcher.read_overlap("AACTTAAC"), (1, 0));
        // CGTT reversed is AACG: both wanted k-mers on the reverse strand
        assert_eq!(matcher.read_overlap("CGTT"), (0, 2));
        assert_eq!(matcher.read_overlap("GGGGG"), (0, 0));
        assert_eq!(matcher.read_overlap("AA"), (0, 0));
    }

    #[test]
    fn test_pair_overlap() {
        let wanted = WantedSet::from_baits(&[FastaRecord::new("b", "GATTACA")], k(4));
        let mut matcher = PairMatcher::new(&wanted);
        let counts = matcher.pair_overlap("TTGATTAC", "TGTAATC");
        assert_eq!(
            counts,
            OverlapCounts {
                lhs_fwd: 3,
                lhs_rev: 0,
                rhs_fwd: 0,
                rhs_rev: 4,
            }
        );
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("reads/x_R1.fastq.gz"), "hits"),
            PathBuf::from("reads/x_R1.hits.fastq.gz")
        );
        assert_eq!(output_path(Path::new("x_R2.fq"), "pd"), PathBuf::from("x_R2.pd.fq"));
        assert_eq!(output_path(Path::new("reads"), "pd"), PathBuf::from("reads.pd"));
        assert_eq!(output_path(Path::new("reads.gz"), "pd"), PathBuf::from("reads.pd.gz"));
    }
}
