use std::io::BufRead;
use std::path::Path;

use crate::error::Result;
use crate::index::{IdNameKeys, TranscriptIndex};

/// High-level builder for a `TranscriptIndex` from a GTF/GFF3 annotation.
///
/// - configurable gene/transcript id keys and exon feature types
/// - plain or gzipped input
/// - `open` also accepts an index written by `TranscriptIndex::save`
#[derive(Debug, Clone, Default)]
pub struct AnnotationBuilder {
    pub keys: IdNameKeys,
}

fn owned<I, S>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter().map(Into::into).collect()
}

impl AnnotationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute keys for the gene id, in preference order.
    pub fn gene_id_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.gene_id_keys = owned(keys);
        self
    }

    /// Attribute keys for the transcript id, in preference order.
    pub fn transcript_id_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.transcript_id_keys = owned(keys);
        self
    }

    /// GFF3 exon->transcript link keys, used when no transcript id key matches.
    pub fn parent_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.parent_keys = owned(keys);
        self
    }

    /// Feature types (column 3) that count as exons.
    pub fn exon_feature_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.exon_feature_types = owned(types);
        self
    }

    pub fn build_from_reader<R: BufRead>(&self, reader: R) -> Result<TranscriptIndex> {
        TranscriptIndex::new().from_reader(reader, self.keys.clone())
    }

    /// Parse an annotation file; `.gz` is decompressed.
    pub fn build_from_path<P: AsRef<Path>>(&self, path: P) -> Result<TranscriptIndex> {
        TranscriptIndex::from_path(path, self.keys.clone())
    }

    /// Load a saved index or parse an annotation, whichever `path` holds.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<TranscriptIndex> {
        TranscriptIndex::open(path, self.keys.clone())
    }
}
