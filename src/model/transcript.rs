use serde::{Serialize, Deserialize};

use crate::error::{AnnotateError, Result};
use crate::model::types::{GeneId, TranscriptId};
use crate::types::{Exon, Strand};

/// One annotated transcript: a strand-tagged exon chain on one chromosome.
///
/// `key` is the stable identifier from the annotation (e.g. `transcript_id`),
/// which is what ends up in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub id: TranscriptId,
    pub key: String,
    pub gene_id: GeneId,
    pub chr_id: usize,
    pub strand: Strand,
    exons: Vec<Exon>,
}

impl Transcript {
    pub fn new(
        id: TranscriptId,
        key: impl Into<String>,
        gene_id: GeneId,
        chr_id: usize,
        strand: Strand,
    ) -> Self {
        Self {
            id,
            key: key.into(),
            gene_id,
            chr_id,
            strand,
            exons: Vec::new(),
        }
    }

    /// Add an exon; every exon must carry the transcript's strand.
    pub fn add_exon(&mut self, exon: Exon, strand: Strand) -> Result<()> {
        if strand != self.strand {
            return Err(AnnotateError::MixedStrand {
                transcript: self.key.clone(),
            });
        }
        self.exons.push(exon);
        Ok(())
    }

    /// Exons sorted ascending by genomic coordinate, regardless of strand.
    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }

    pub fn is_single_exon(&self) -> bool {
        self.exons.len() == 1
    }

    /// Sort exons, drop exact duplicates, and reject overlaps.
    ///
    /// Returns the 1-based inclusive span (first start, last end).
    pub fn finalize(&mut self) -> Result<(u64, u64)> {
        if self.exons.is_empty() {
            return Err(AnnotateError::EmptyTranscript {
                transcript: self.key.clone(),
            });
        }

        self.exons.sort_by_key(|e| (e.start, e.end));
        self.exons.dedup();

        Exon::check_ordered(&self.exons).map_err(|index| AnnotateError::UnorderedExons {
            transcript: self.key.clone(),
            index,
        })?;

        Ok((self.exons[0].start, self.exons[self.exons.len() - 1].end))
    }
}
