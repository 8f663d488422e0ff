use kmer_pulldown::io::fasta::read_fasta_records;
use kmer_pulldown::pipeline::mask::{run_mask, BaitMasker};
use kmer_pulldown::pipeline::pulldown::WantedSet;
use kmer_pulldown::{KmerSize, MaskConfig, PulldownError};
use std::fs;

#[test]
fn test_low_entropy_run_is_masked() {
    let dir = tempfile::tempdir().unwrap();
    let baits = dir.path().join("baits.fa");
    let output = dir.path().join("masked.fa");
    fs::write(&baits, ">b1\nGATTACAAAAAAAAGATTACA\n").unwrap();

    let mut config = MaskConfig::new(KmerSize::new(5).unwrap());
    config.min_entropy = Some(0.1);
    let report = run_mask(&baits, &output, &config).unwrap();

    let masked = read_fasta_records(&output).unwrap();
    assert_eq!(masked.len(), 1);
    assert_eq!(masked[0].sequence.len(), 21);
    // AAAAA windows cover positions 6..14, nothing else is single-base
    assert_eq!(masked[0].sequence, "GATTACNNNNNNNNGATTACA");
    assert_eq!(report.masked_bases, 8);
    assert!(report.pruned.low_entropy >= 2); // AAAAA and TTTTT
}

#[test]
fn test_genome_repeats_are_masked() {
    let dir = tempfile::tempdir().unwrap();
    let baits = dir.path().join("baits.fa");
    let genome = dir.path().join("genome.fa");
    let output = dir.path().join("masked.fa");
    let histogram = dir.path().join("hist.tsv");
    fs::write(&baits, ">b1\nACGGTCATGC\n").unwrap();
    // ACGG appears three times in the genome, everything else at most once
    fs::write(&genome, ">chr1\nACGGAACGGAACGGTCATGC\n").unwrap();

    let mut config = MaskConfig::new(KmerSize::new(4).unwrap());
    config.genome = Some(genome);
    config.max_count = Some(2);
    config.histogram = Some(histogram.clone());
    let report = run_mask(&baits, &output, &config).unwrap();

    let masked = read_fasta_records(&output).unwrap();
    assert_eq!(masked[0].sequence, "NNNNTCATGC");
    assert_eq!(report.pruned.high_frequency, 1);

    let hist = fs::read_to_string(&histogram).unwrap();
    assert!(hist.starts_with("frequency\tcount\n"));
    assert!(hist.contains("\n3\t1\n"));
}

#[test]
fn test_max_count_without_genome_fails() {
    let dir = tempfile::tempdir().unwrap();
    let baits = dir.path().join("baits.fa");
    fs::write(&baits, ">b1\nACGT\n").unwrap();

    let mut config = MaskConfig::new(KmerSize::new(3).unwrap());
    config.max_count = Some(1);
    let result = run_mask(&baits, dir.path().join("out.fa"), &config);
    assert!(matches!(result, Err(PulldownError::MissingGenome)));
}

#[test]
fn test_masked_baits_drop_pruned_kmers_from_wanted_set() {
    let k = KmerSize::new(5).unwrap();
    let baits = vec![kmer_pulldown::io::fasta::FastaRecord::new("b", "GATTACAAAAAAAAGATTACA")];
    let mut config = MaskConfig::new(k);
    config.min_entropy = Some(0.1);

    let masker = BaitMasker::build(&baits, &config).unwrap();
    let wanted = WantedSet::from_baits(&masker.mask_records(&baits), k);
    let polya = kmer_pulldown::kmer::encode_kmer(b"AAAAA").unwrap();
    assert!(!wanted.contains(polya));
    assert!(wanted.contains(kmer_pulldown::kmer::encode_kmer(b"GATTA").unwrap()));
}
