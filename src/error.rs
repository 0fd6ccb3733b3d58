use thiserror::Error;

use crate::annotation::io::ParseError;
use crate::model::types::TranscriptId;

/// Fatal errors raised while building the transcript model or annotating.
///
/// A variant that is not near any junction is *not* an error; it is reported
/// as `SpliceClass::NonSpliceRegion`.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown strand '{strand}' for transcript {transcript}")]
    UnknownStrand { transcript: String, strand: char },

    #[error("no exons for transcript {transcript}; index and exon table are out of sync")]
    EmptyTranscript { transcript: String },

    #[error("exons of transcript {transcript} are unsorted or overlap at exon {index}")]
    UnorderedExons { transcript: String, index: usize },

    #[error("transcript {transcript} has exons on both strands")]
    MixedStrand { transcript: String },

    #[error("transcript {transcript} has exons on more than one chromosome")]
    ChromosomeMismatch { transcript: String },

    #[error("transcript id {0} is not in the index")]
    UnknownTranscript(TranscriptId),

    #[error("malformed VCF record at line {line_no}: {problem}")]
    MalformedVcf { line_no: usize, problem: String },

    #[error("VCF input has no #CHROM header line")]
    MissingVcfHeader,

    #[error("index file: {0}")]
    IndexFormat(String),

    #[error("index serialization: {0}")]
    Serialize(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, AnnotateError>;
