use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::info;

use variant_splice_index::{
    annotate_file, AnnotateOptions, IdNameKeys, SpliceOptions, TranscriptIndex,
};

/// Annotate variants near splice junctions, or build/inspect a transcript index.
#[derive(Parser, Debug)]
#[command(name = "splice-annotate")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Annotate a VCF with the splice region each variant falls in
    Annotate(AnnotateArgs),

    /// Build an index from a GTF/GFF annotation and write it to disk
    Build(BuildArgs),

    /// Load an index from disk and print summary stats
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct AnnotateArgs {
    /// Variants to annotate (.vcf, .vcf.gz; "-" for stdin)
    variants: PathBuf,

    /// GTF/GFF3 annotation (optionally .gz) or an index written by `build`
    annotation: PathBuf,

    /// Max distance from an exon boundary, inside the exon
    #[arg(short = 'e', long, default_value_t = 3)]
    exonic_distance: u64,

    /// Max distance from an exon boundary, inside the intron
    #[arg(short = 'i', long, default_value_t = 2)]
    intronic_distance: u64,

    /// Annotate any intronic variant as `intronic`, regardless of distance
    #[arg(short = 'I', long)]
    all_intronic: bool,

    /// Annotate any exonic variant as `exonic`, regardless of distance
    #[arg(short = 'E', long)]
    all_exonic: bool,

    /// Keep single-exon transcripts (skipped by default)
    #[arg(short = 'S', long)]
    keep_single_exon: bool,

    /// Output VCF; ".gz" is gzip-compressed. Default: stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    keys: KeyArgs,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Serialized index file
    #[arg(long, short)]
    index: PathBuf,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Input annotation file (.gtf/.gff/.gff3, optionally .gz)
    #[arg(long, short)]
    annotation: PathBuf,

    /// Output serialized index file
    #[arg(long, short)]
    index: PathBuf,

    #[command(flatten)]
    keys: KeyArgs,
}

#[derive(Args, Debug)]
struct KeyArgs {
    /// Attribute keys to use for gene ID (repeatable, first match wins)
    #[arg(
        long = "gene-id-key",
        value_name = "KEY",
        num_args = 1..,
        default_values_t = vec!["gene_id".to_string(), "gene".to_string(), "GeneID".to_string()]
    )]
    gene_id_keys: Vec<String>,

    /// Attribute keys to use for transcript ID (repeatable, first match wins)
    #[arg(
        long = "transcript-id-key",
        value_name = "KEY",
        num_args = 1..,
        default_values_t = vec!["transcript_id".to_string(), "transcript".to_string()]
    )]
    transcript_id_keys: Vec<String>,

    /// GFF3 exon->transcript linkage keys (repeatable).
    /// Default: Parent
    #[arg(
        long = "parent-key",
        value_name = "KEY",
        num_args = 1..,
        default_values_t = vec!["Parent".to_string()]
    )]
    parent_keys: Vec<String>,

    /// Feature types that count as exons (repeatable).
    /// Default: exon
    #[arg(
        long = "exon-feature-type",
        value_name = "TYPE",
        num_args = 1..,
        default_values_t = vec!["exon".to_string()]
    )]
    exon_feature_types: Vec<String>,
}

impl From<KeyArgs> for IdNameKeys {
    fn from(args: KeyArgs) -> Self {
        IdNameKeys {
            gene_id_keys: args.gene_id_keys,
            transcript_id_keys: args.transcript_id_keys,
            parent_keys: args.parent_keys,
            exon_feature_types: args.exon_feature_types,
        }
    }
}

fn run_annotate(args: AnnotateArgs) -> Result<()> {
    let opts = AnnotateOptions {
        splice: SpliceOptions {
            exonic_distance: args.exonic_distance,
            intronic_distance: args.intronic_distance,
            force_intronic: args.all_intronic,
            force_exonic: args.all_exonic,
            skip_single_exon_transcripts: !args.keep_single_exon,
        },
        output: args.output,
    };
    info!(
        "exonic distance {}, intronic distance {}, force intronic {}, force exonic {}, skip single-exon {}",
        opts.splice.exonic_distance,
        opts.splice.intronic_distance,
        opts.splice.force_intronic,
        opts.splice.force_exonic,
        opts.splice.skip_single_exon_transcripts
    );

    let idx = TranscriptIndex::open(&args.annotation, args.keys.into())
        .with_context(|| format!("reading annotation {}", args.annotation.display()))?;
    info!(
        "{} transcripts of {} genes on {} chromosomes",
        idx.transcripts.len(),
        idx.genes.len(),
        idx.chr_names.len()
    );

    annotate_file(&idx, &args.variants, &opts)
        .with_context(|| format!("annotating {}", args.variants.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Annotate(args) => run_annotate(args)?,

        Command::Build(args) => {
            let idx = TranscriptIndex::from_path(&args.annotation, args.keys.into())
                .with_context(|| format!("building index from {}", args.annotation.display()))?;

            println!("{idx}");

            idx.save(&args.index)
                .with_context(|| format!("writing index to {}", args.index.display()))?;

            info!("index written to {}", args.index.display());
        }

        Command::Stats(args) => {
            let idx = TranscriptIndex::load(&args.index)
                .with_context(|| format!("reading index {}", args.index.display()))?;
            println!("{idx}");
        }
    }

    Ok(())
}
