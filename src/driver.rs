use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, trace};

use crate::aggregate::AnnotatedVariant;
use crate::error::{AnnotateError, Result};
use crate::index::TranscriptProvider;
use crate::model::splice;
use crate::model::types::{SpliceOptions, TranscriptId};
use crate::types::{Exon, Variant};
use crate::vcf::{open_input, Output, VcfReader, VcfWriter};

/// Options for a whole annotation run.
#[derive(Debug, Clone, Default)]
pub struct AnnotateOptions {
    pub splice: SpliceOptions,

    /// `None` or `-` writes to stdout.
    pub output: Option<PathBuf>,
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub records: u64,
    /// Records with at least one splice annotation.
    pub annotated: u64,
    /// Candidate transcripts examined, after deduplication.
    pub candidates: u64,
}

/// Annotates variants against the transcripts of a provider.
pub struct Annotator<'a, P: TranscriptProvider + ?Sized> {
    provider: &'a P,
    opts: SpliceOptions,
}

impl<'a, P: TranscriptProvider + ?Sized> Annotator<'a, P> {
    pub fn new(provider: &'a P, opts: SpliceOptions) -> Self {
        Self { provider, opts }
    }

    /// Classify `variant` against every candidate transcript and collect the
    /// splicing hits.
    pub fn annotate(&self, variant: &Variant) -> Result<AnnotatedVariant> {
        let mut stats = RunStats::default();
        self.annotate_counted(variant, &mut stats)
    }

    fn annotate_counted(&self, variant: &Variant, stats: &mut RunStats) -> Result<AnnotatedVariant> {
        let mut out = AnnotatedVariant::new(variant.clone());
        let pos = variant.position();

        let raw = self
            .provider
            .candidates(&variant.chrom, variant.start, self.opts.intronic_distance);
        let mut seen: HashSet<TranscriptId> = HashSet::with_capacity(raw.len());

        for tx in raw.into_iter().filter(|tx| seen.insert(*tx)) {
            stats.candidates += 1;

            let name = self.provider.transcript_name(tx)?;
            let exons = self.provider.exons_for_transcript(tx)?;
            if exons.is_empty() {
                return Err(AnnotateError::EmptyTranscript {
                    transcript: name.to_string(),
                });
            }
            Exon::check_ordered(exons).map_err(|index| AnnotateError::UnorderedExons {
                transcript: name.to_string(),
                index,
            })?;

            if self.opts.skip_single_exon_transcripts && exons.len() == 1 {
                trace!("{}:{} skip single-exon transcript {}", variant.chrom, pos, name);
                continue;
            }

            let strand = self.provider.strand_for_transcript(tx)?;
            let hit = splice::classify(name, exons, strand, pos, &self.opts, &mut out.cis)?;

            trace!("{}:{} {} -> {} ({})", variant.chrom, pos, name, hit.class, hit.distance_label());
            let gene = self.provider.gene_for_transcript(tx)?;
            out.fold(gene, name, &hit);
        }

        Ok(out)
    }

    /// Annotate a VCF stream, writing the rewritten header and every record to
    /// `output`. Records keep their input order.
    pub fn run<R: BufRead, W: Write>(&self, input: R, output: &mut W) -> Result<RunStats> {
        let reader = VcfReader::new(input)?;
        let mut writer = VcfWriter::new(&mut *output);
        writer.write_header(reader.header())?;

        let mut stats = RunStats::default();
        for rec in reader.records() {
            let mut rec = rec?;
            stats.records += 1;

            let annotated = self.annotate_counted(&rec.variant(), &mut stats)?;
            if !annotated.is_empty() {
                stats.annotated += 1;
                debug!(
                    "line {}: {}:{} genes={} annotations={} cis={}-{}",
                    rec.line_no,
                    rec.chrom(),
                    rec.pos(),
                    annotated.genes_field(),
                    annotated.annotations_field(),
                    annotated.cis.start,
                    annotated.cis.end
                );
            }
            for (key, value) in annotated.info_fields() {
                rec.set_info(key, &value);
            }
            writer.write_record(&rec)?;
        }

        writer.into_inner()?.flush()?;
        Ok(stats)
    }
}

/// Annotate the VCF at `variants` (`-` for stdin) and write to `opts.output`.
pub fn annotate_file<P: TranscriptProvider + ?Sized>(
    provider: &P,
    variants: &Path,
    opts: &AnnotateOptions,
) -> Result<RunStats> {
    let input = open_input(variants)?;
    let mut output = Output::open(opts.output.as_deref())?;

    info!("annotating {}", variants.display());
    let stats = Annotator::new(provider, opts.splice).run(input, &mut output)?;
    output.finish()?;

    info!(
        "{} records read, {} with splice annotations, {} candidate transcripts examined",
        stats.records, stats.annotated, stats.candidates
    );
    Ok(stats)
}
