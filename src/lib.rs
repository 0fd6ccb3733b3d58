//! variant_splice_index
//!
//! Annotates point variants (VCF records) with their position relative to
//! exon/intron junctions of the transcripts around them. Transcripts come from
//! a GTF/GFF3 annotation, indexed by UCSC-style hierarchical bins; coordinates
//! are 1-based and inclusive unless a name says otherwise (`pos0`, `start0`).

pub mod types;
pub mod error;
pub mod bins;
pub mod model;
pub mod annotation;
pub mod index;
pub mod aggregate;
pub mod vcf;
pub mod driver;

pub use error::{AnnotateError, Result};

pub use index::{IdNameKeys, TranscriptIndex, TranscriptProvider};

pub use annotation::AnnotationBuilder;

pub use types::{Exon, Strand, Variant};

pub use model::transcript::Transcript;
pub use model::gene::Gene;
pub use model::types::{GeneId, TranscriptId};

pub use model::{CisWindow, SpliceClass, SpliceHit, SpliceOptions};

pub use aggregate::AnnotatedVariant;
pub use driver::{annotate_file, AnnotateOptions, Annotator, RunStats};
