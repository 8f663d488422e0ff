mod cli_main;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cli_main::{Cli, Commands};
use kmer_pulldown::annotation::{DeterministicSampler, RegionSet};
use kmer_pulldown::pipeline::count::{run_count, CountConfig};
use kmer_pulldown::pipeline::extract::{run_extract, ExtractConfig};
use kmer_pulldown::pipeline::mask::run_mask;
use kmer_pulldown::pipeline::pulldown::run_pulldown;
use kmer_pulldown::{KmerSize, MaskConfig, PulldownConfig, ReadFilePair};

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `-o -` output stays clean
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting tracing default failed")?;

    match cli.command {
        Commands::Mask {
            baits,
            k,
            min_entropy,
            max_count,
            genome,
            histogram,
            output,
        } => {
            let mut config = MaskConfig::new(KmerSize::new(k)?);
            config.min_entropy = min_entropy;
            config.max_count = max_count;
            config.genome = genome;
            config.histogram = histogram;

            let report = run_mask(&baits, &output, &config)
                .with_context(|| format!("masking {} failed", baits.display()))?;
            info!(
                "Pruned {} low-entropy and {} high-frequency k-mers of {}",
                report.pruned.low_entropy, report.pruned.high_frequency, report.pruned.distinct
            );
        }

        Commands::Count {
            baits,
            k,
            genome,
            histogram,
            counts,
        } => {
            let config = CountConfig {
                k: KmerSize::new(k)?,
                genome,
                histogram,
                counts,
            };
            run_count(&baits, &config).context("counting bait k-mers failed")?;
        }

        Commands::Pull {
            baits,
            k,
            suffix,
            stats,
            summary,
            reads,
        } => {
            let pairs = ReadFilePair::from_flat(reads)?;
            let mut config = PulldownConfig::new(KmerSize::new(k)?, suffix, pairs);
            config.stats = stats;
            config.summary = summary;

            let (_, run) = run_pulldown(&baits, &config).context("pulldown failed")?;
            let kept: u64 = run.pairs.iter().map(|p| p.kept_pairs).sum();
            let total: u64 = run.pairs.iter().map(|p| p.total_pairs).sum();
            info!("Pulled down {}/{} read pairs", kept, total);
        }

        Commands::Extract {
            genome,
            annotation,
            feature,
            id_attribute,
            regions,
            bed,
            sample_rate,
            seed,
            output,
        } => {
            let mut region_set = RegionSet::new();
            for region in &regions {
                region_set.insert_region(region)?;
            }
            if let Some(bed) = bed {
                region_set.load_bed(&bed)?;
            }

            let mut config = ExtractConfig::new(feature);
            config.id_attribute = id_attribute;
            config.regions = region_set;
            config.sampler = sample_rate
                .map(|rate| DeterministicSampler::new(seed, rate))
                .transpose()?;

            run_extract(&genome, &annotation, &output, &config).context("bait extraction failed")?;
        }
    }

    Ok(())
}
