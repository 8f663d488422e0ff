//! Bait generation: cut annotated features out of a genome.

use ahash::AHashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::annotation::{read_features, DeterministicSampler, Feature, RegionSet};
use crate::error::{PulldownError, Result};
use crate::io::fasta::{FastaReader, FastaRecord, FastaWriter};
use crate::kmer::codec::reverse_complement_seq;

pub struct ExtractConfig {
    /// Feature type to keep, e.g. `exon`
    pub feature_kind: String,
    /// Attribute naming a feature for sampling and output names
    pub id_attribute: String,
    pub regions: RegionSet,
    pub sampler: Option<DeterministicSampler>,
}

impl ExtractConfig {
    pub fn new(feature_kind: impl Into<String>) -> Self {
        ExtractConfig {
            feature_kind: feature_kind.into(),
            id_attribute: "gene_id".to_string(),
            regions: RegionSet::new(),
            sampler: None,
        }
    }

    /// Type, region and sampling filters, in that order.
    pub fn selects(&self, feature: &Feature) -> bool {
        feature.kind == self.feature_kind
            && self.regions.admits(&feature.seqid, feature.range())
            && self
                .sampler
                .as_ref()
                .map_or(true, |sampler| sampler.keep(self.feature_id(feature)))
    }

    fn feature_id<'f>(&self, feature: &'f Feature) -> &'f str {
        feature.attribute(&self.id_attribute).unwrap_or(&feature.seqid)
    }
}

/// Genome sequences keyed by the first word of their name line.
pub fn load_genome(path: impl AsRef<Path>) -> Result<AHashMap<String, String>> {
    let mut genome = AHashMap::new();
    for record in FastaReader::from_path(path)? {
        let record = record?;
        genome.insert(record.id().to_string(), record.sequence);
    }
    Ok(genome)
}

/// Slice every selected feature; minus-strand features are reverse-complemented.
pub fn extract_baits(
    genome: &AHashMap<String, String>,
    features: &[Feature],
    config: &ExtractConfig,
) -> Vec<FastaRecord> {
    let mut baits = Vec::new();
    for feature in features.iter().filter(|f| config.selects(f)) {
        let Some(sequence) = genome.get(&feature.seqid) else {
            warn!("Skipping feature on unknown sequence {}", feature.seqid);
            continue;
        };
        let range = feature.range();
        let Some(slice) = sequence.get(range.start as usize..range.end as usize) else {
            warn!(
                "Skipping {}:{}-{} beyond sequence end ({} bp)",
                feature.seqid,
                feature.start,
                feature.end,
                sequence.len()
            );
            continue;
        };
        let slice = if feature.strand == '-' {
            reverse_complement_seq(slice)
        } else {
            slice.to_string()
        };
        let name = format!(
            "{}:{}:{}-{}({})",
            config.feature_id(feature),
            feature.seqid,
            feature.start,
            feature.end,
            feature.strand
        );
        baits.push(FastaRecord::new(name, slice));
    }
    baits
}

pub fn run_extract(
    genome_path: impl AsRef<Path>,
    annotation_path: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ExtractConfig,
) -> Result<usize> {
    let start = Instant::now();
    let output = output.as_ref();

    let genome = load_genome(genome_path.as_ref())?;
    let features = read_features(annotation_path.as_ref())?;
    info!(
        "Loaded {} genome sequences and {} annotation features",
        genome.len(),
        features.len()
    );

    let baits = extract_baits(&genome, &features, config);
    let mut writer = FastaWriter::new(output)?;
    for bait in &baits {
        writer
            .write_record(&bait.name, &bait.sequence)
            .map_err(|e| PulldownError::io(output, e))?;
    }
    writer.finish().map_err(|e| PulldownError::io(output, e))?;

    info!("Extracted {} baits in {:.2?}", baits.len(), start.elapsed());
    Ok(baits.len())
}
