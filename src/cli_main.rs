use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pulldown", version, about = "Bait masking and k-mer pulldown of paired reads", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mask low-complexity and repetitive k-mers in bait sequences
    Mask {
        /// Bait FASTA(.gz)
        #[arg(long)]
        baits: PathBuf,

        /// K-mer size (1-30)
        #[arg(short, long = "kmer-size", default_value_t = 25)]
        k: usize,

        /// Prune k-mers whose entropy per base is below this
        #[arg(long)]
        min_entropy: Option<f64>,

        /// Prune k-mers occurring more often than this in the genome
        #[arg(long, requires = "genome")]
        max_count: Option<u64>,

        /// Reference genome FASTA(.gz) for frequency counting
        #[arg(long)]
        genome: Option<PathBuf>,

        /// Write the genome frequency histogram here
        #[arg(long)]
        histogram: Option<PathBuf>,

        /// Masked bait FASTA, `-` for stdout
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Count bait k-mers in a reference genome
    Count {
        /// Bait FASTA(.gz)
        #[arg(long)]
        baits: PathBuf,

        /// K-mer size (1-30)
        #[arg(short, long = "kmer-size", default_value_t = 25)]
        k: usize,

        /// Reference genome FASTA(.gz)
        #[arg(long)]
        genome: PathBuf,

        /// Frequency histogram TSV, stdout when unset
        #[arg(long)]
        histogram: Option<PathBuf>,

        /// Per-k-mer count TSV
        #[arg(long)]
        counts: Option<PathBuf>,
    },

    /// Keep read pairs sharing a k-mer with the baits
    Pull {
        /// Masked bait FASTA(.gz)
        #[arg(long)]
        baits: PathBuf,

        /// K-mer size (1-30)
        #[arg(short, long = "kmer-size", default_value_t = 25)]
        k: usize,

        /// Inserted before the extension of each output file
        #[arg(long, default_value = "pulldown")]
        suffix: String,

        /// Overlap statistics TSV
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Run summary JSON
        #[arg(long)]
        summary: Option<PathBuf>,

        /// FASTQ(.gz) files as left1 right1 left2 right2 ...
        #[arg(required = true, value_name = "READS")]
        reads: Vec<PathBuf>,
    },

    /// Cut bait sequences for annotated features out of a genome
    Extract {
        /// Reference genome FASTA(.gz)
        #[arg(long)]
        genome: PathBuf,

        /// GTF or GFF3 annotation
        #[arg(long)]
        annotation: PathBuf,

        /// Feature type to extract
        #[arg(long = "feature", default_value = "exon")]
        feature: String,

        /// Attribute used to name and sample features
        #[arg(long, default_value = "gene_id")]
        id_attribute: String,

        /// Restrict to a region, `chr` or `chr:start-end` (repeatable)
        #[arg(long = "region")]
        regions: Vec<String>,

        /// Restrict to regions listed in a BED file
        #[arg(long)]
        bed: Option<PathBuf>,

        /// Keep this fraction of feature ids
        #[arg(long)]
        sample_rate: Option<f64>,

        /// Seed for id sampling
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Bait FASTA, `-` for stdout
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },
}
