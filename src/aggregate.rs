use std::collections::HashSet;

use crate::model::splice::CisWindow;
use crate::model::types::{SpliceClass, SpliceHit};
use crate::types::Variant;

/// Value written for a field no transcript contributed to.
pub const MISSING: &str = "NA";

/// Everything one variant collected across the transcripts it hits.
///
/// `transcripts`, `distances` and `annotations` get one entry per
/// contributing transcript, in the same order. `genes` is deduplicated,
/// first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedVariant {
    pub variant: Variant,
    pub genes: Vec<String>,
    pub transcripts: Vec<String>,
    pub distances: Vec<String>,
    pub annotations: Vec<SpliceClass>,
    pub cis: CisWindow,
    seen_genes: HashSet<String>,
}

impl AnnotatedVariant {
    pub fn new(variant: Variant) -> Self {
        let cis = CisWindow::new(variant.start, variant.end);
        Self {
            variant,
            genes: Vec::new(),
            transcripts: Vec::new(),
            distances: Vec::new(),
            annotations: Vec::new(),
            cis,
            seen_genes: HashSet::new(),
        }
    }

    /// Add one transcript's classification. `non_splice_region` hits are ignored.
    pub fn fold(&mut self, gene: &str, transcript: &str, hit: &SpliceHit) {
        if hit.class == SpliceClass::NonSpliceRegion {
            return;
        }
        if self.seen_genes.insert(gene.to_string()) {
            self.genes.push(gene.to_string());
        }
        self.transcripts.push(transcript.to_string());
        self.distances.push(hit.distance_label());
        self.annotations.push(hit.class);
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    pub fn genes_field(&self) -> String {
        join_or_missing(&self.genes)
    }

    pub fn transcripts_field(&self) -> String {
        join_or_missing(&self.transcripts)
    }

    pub fn distances_field(&self) -> String {
        join_or_missing(&self.distances)
    }

    pub fn annotations_field(&self) -> String {
        join_or_missing(&self.annotations)
    }

    /// The four output fields, keyed by their INFO ids.
    pub fn info_fields(&self) -> [(&'static str, String); 4] {
        [
            ("genes", self.genes_field()),
            ("transcripts", self.transcripts_field()),
            ("distances", self.distances_field()),
            ("annotations", self.annotations_field()),
        ]
    }
}

fn join_or_missing<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        return MISSING.to_string();
    }
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
