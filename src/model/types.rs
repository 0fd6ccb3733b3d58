use std::fmt;

/// Internal numeric IDs (indexes into Vecs).
pub type GeneId = usize;
pub type TranscriptId = usize;

/// Where a variant sits relative to one transcript's splice junctions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpliceClass {
    /// Outside the transcript, or too far from every junction.
    NonSpliceRegion,

    /// Inside an exon (only reported with `force_exonic`).
    Exonic,

    /// Inside an intron (only reported with `force_intronic`).
    Intronic,

    /// Inside an exon, within `exonic_distance` of a junction.
    SplicingExonic,

    /// Inside an intron, within `intronic_distance` of a junction.
    SplicingIntronic,
}

impl SpliceClass {
    pub fn as_str(self) -> &'static str {
        match self {
            SpliceClass::NonSpliceRegion => "non_splice_region",
            SpliceClass::Exonic => "exonic",
            SpliceClass::Intronic => "intronic",
            SpliceClass::SplicingExonic => "splicing_exonic",
            SpliceClass::SplicingIntronic => "splicing_intronic",
        }
    }

    /// Labels that come from the junction-distance scan and widen the cis window.
    pub fn is_splicing(self) -> bool {
        matches!(self, SpliceClass::SplicingExonic | SpliceClass::SplicingIntronic)
    }
}

impl fmt::Display for SpliceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one variant against one transcript.
///
/// `distance` is the minimal distance to the relevant exon boundaries and is
/// `None` for `NonSpliceRegion` (rendered as `-1`). `exon` is the index of the
/// matched exon in the ascending exon list, set for the splicing classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpliceHit {
    pub class: SpliceClass,
    pub distance: Option<u64>,
    pub exon: Option<usize>,
}

impl SpliceHit {
    pub fn none() -> Self {
        Self {
            class: SpliceClass::NonSpliceRegion,
            distance: None,
            exon: None,
        }
    }

    pub fn new(class: SpliceClass, distance: u64, exon: usize) -> Self {
        Self {
            class,
            distance: Some(distance),
            exon: Some(exon),
        }
    }

    /// Distance as written to output: the number, or `-1`.
    pub fn distance_label(&self) -> String {
        match self.distance {
            Some(d) => d.to_string(),
            None => "-1".to_string(),
        }
    }
}

/// Options controlling what counts as "near a junction".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpliceOptions {
    /// Max distance from an exon boundary, inside the exon, for `splicing_exonic`.
    pub exonic_distance: u64,

    /// Max distance from an exon boundary, inside the intron, for
    /// `splicing_intronic`. Also the slop of the bin query.
    pub intronic_distance: u64,

    /// Report any intronic position as `intronic`, ignoring distance.
    pub force_intronic: bool,

    /// Report any exonic position as `exonic`, ignoring distance.
    pub force_exonic: bool,

    /// Leave transcripts with exactly one exon out of classification.
    pub skip_single_exon_transcripts: bool,
}

impl Default for SpliceOptions {
    fn default() -> Self {
        Self {
            exonic_distance: 3,
            intronic_distance: 2,
            force_intronic: false,
            force_exonic: false,
            skip_single_exon_transcripts: true,
        }
    }
}
