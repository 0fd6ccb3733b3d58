//! Splice-region classification of a point variant against one exon chain.
//!
//! Exon lists are always sorted ascending by genomic coordinate and must be
//! non-overlapping (see [`Exon::check_ordered`]). The two strand procedures
//! differ only in the direction they walk the list, which is the direction
//! of transcription: "previous" and "next" exon, and the intron an exon is
//! followed by, are taken in that order.

use crate::error::{AnnotateError, Result};
use crate::model::types::{SpliceClass, SpliceHit, SpliceOptions};
use crate::types::{Exon, Strand};

/// Genomic window a splice-adjacent variant may act on.
///
/// Starts at the variant itself and only ever widens, so it can be carried
/// across all transcripts that hit the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CisWindow {
    pub start: u64,
    pub end: u64,
}

impl CisWindow {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Widen to the neighbouring exons of `exons[idx]`.
    ///
    /// On the plus strand this reaches back to the start of the previous exon
    /// and forward to the end of the next one; on the minus strand the rule is
    /// mirrored in transcription order. With the list stored ascending both
    /// land on the same genomic neighbours, `exons[idx - 1].start` and
    /// `exons[idx + 1].end`, clamped to `exons[idx]` at either end of the list.
    pub fn widen(&mut self, exons: &[Exon], idx: usize) {
        let lower = exons[idx.saturating_sub(1)].start;
        let upper = exons[(idx + 1).min(exons.len() - 1)].end;
        self.start = self.start.min(lower);
        self.end = self.end.max(upper);
    }
}

/// Classify the 1-based position `pos` against the exons of `transcript`.
///
/// Splicing hits widen `cis`. Strands other than `+`/`-` are an error, since
/// there is no transcription direction to scan in.
pub fn classify(
    transcript: &str,
    exons: &[Exon],
    strand: Strand,
    pos: u64,
    opts: &SpliceOptions,
    cis: &mut CisWindow,
) -> Result<SpliceHit> {
    let hit = match strand {
        Strand::Plus => classify_plus(exons, pos, opts),
        Strand::Minus => classify_minus(exons, pos, opts),
        Strand::Unknown => {
            return Err(AnnotateError::UnknownStrand {
                transcript: transcript.to_string(),
                strand: strand.symbol(),
            })
        }
    };

    if hit.class.is_splicing() {
        if let Some(idx) = hit.exon {
            cis.widen(exons, idx);
        }
    }
    Ok(hit)
}

/// Plus strand: walk exons ascending.
pub fn classify_plus(exons: &[Exon], pos: u64, opts: &SpliceOptions) -> SpliceHit {
    if outside_span(exons, pos) {
        return SpliceHit::none();
    }

    for i in 0..exons.len() {
        let exon = exons[i];
        let next = exons.get(i + 1).copied();

        if let Some(hit) = forced(exon, next.map(|n| (exon, n)), i, pos, opts) {
            return hit;
        }

        // Every later exon starts even further right.
        if exon.start > pos.saturating_add(opts.intronic_distance) {
            return SpliceHit::none();
        }

        if let Some(hit) = near_junction(exons, i, pos, opts) {
            return hit;
        }
    }

    SpliceHit::none()
}

/// Minus strand: walk exons descending, i.e. in transcription order.
pub fn classify_minus(exons: &[Exon], pos: u64, opts: &SpliceOptions) -> SpliceHit {
    if outside_span(exons, pos) {
        return SpliceHit::none();
    }

    for i in (0..exons.len()).rev() {
        let exon = exons[i];
        let next = i.checked_sub(1).map(|j| exons[j]);

        if let Some(hit) = forced(exon, next.map(|n| (n, exon)), i, pos, opts) {
            return hit;
        }

        // Every later exon ends even further left.
        if exon.end.saturating_add(opts.intronic_distance) < pos {
            return SpliceHit::none();
        }

        if let Some(hit) = near_junction(exons, i, pos, opts) {
            return hit;
        }
    }

    SpliceHit::none()
}

fn outside_span(exons: &[Exon], pos: u64) -> bool {
    match (exons.first(), exons.last()) {
        (Some(first), Some(last)) => pos < first.start || pos > last.end,
        _ => true,
    }
}

/// The distance-free modes. `intron` is the pair of genomic-left/right exons
/// around the intron that follows `exon` in transcription order.
fn forced(
    exon: Exon,
    intron: Option<(Exon, Exon)>,
    idx: usize,
    pos: u64,
    opts: &SpliceOptions,
) -> Option<SpliceHit> {
    if opts.force_exonic && exon.contains(pos) {
        return Some(SpliceHit {
            class: SpliceClass::Exonic,
            distance: Some(exon.boundary_distance(pos)),
            exon: Some(idx),
        });
    }
    if opts.force_intronic {
        if let Some((left, right)) = intron {
            if left.end < pos && pos < right.start {
                return Some(SpliceHit {
                    class: SpliceClass::Intronic,
                    distance: Some((pos - left.end).min(right.start - pos)),
                    exon: Some(idx),
                });
            }
        }
    }
    None
}

/// Threshold cases at `exons[i]`, for both of its boundaries.
///
/// A boundary only counts as a junction when there is an exon on its other
/// side; the outer edges of the first and last exon never match.
fn near_junction(exons: &[Exon], i: usize, pos: u64, opts: &SpliceOptions) -> Option<SpliceHit> {
    let exon = exons[i];
    let left = i.checked_sub(1).map(|j| exons[j]);
    let right = exons.get(i + 1).copied();

    if exon.contains(pos) {
        let near_left = left.is_some() && pos <= exon.start.saturating_add(opts.exonic_distance);
        let near_right = right.is_some() && pos.saturating_add(opts.exonic_distance) >= exon.end;
        if near_left || near_right {
            return Some(SpliceHit::new(
                SpliceClass::SplicingExonic,
                exon.boundary_distance(pos),
                i,
            ));
        }
        return None;
    }

    if let Some(left) = left {
        if pos < exon.start && pos.saturating_add(opts.intronic_distance) >= exon.start && pos > left.end {
            return Some(SpliceHit::new(
                SpliceClass::SplicingIntronic,
                (pos - left.end).min(exon.start - pos),
                i,
            ));
        }
    }
    if let Some(right) = right {
        if pos > exon.end && pos <= exon.end.saturating_add(opts.intronic_distance) && pos < right.start {
            return Some(SpliceHit::new(
                SpliceClass::SplicingIntronic,
                (pos - exon.end).min(right.start - pos),
                i,
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_exons() -> Vec<Exon> {
        vec![Exon::new(100, 200), Exon::new(300, 400)]
    }

    fn three_exons() -> Vec<Exon> {
        vec![Exon::new(100, 200), Exon::new(300, 400), Exon::new(500, 600)]
    }

    /// Reflect exons around `axis`, keeping the list ascending.
    fn mirror(exons: &[Exon], axis: u64) -> Vec<Exon> {
        exons
            .iter()
            .rev()
            .map(|e| Exon::new(axis - e.end, axis - e.start))
            .collect()
    }

    fn run(exons: &[Exon], strand: Strand, pos: u64, opts: &SpliceOptions) -> SpliceHit {
        let mut cis = CisWindow::new(pos - 1, pos);
        classify("T1", exons, strand, pos, opts, &mut cis).unwrap()
    }

    #[test]
    fn plus_strand_reference_positions() {
        let exons = two_exons();
        let opts = SpliceOptions::default();

        let hit = run(&exons, Strand::Plus, 199, &opts);
        assert_eq!(hit.class, SpliceClass::SplicingExonic);
        assert_eq!(hit.distance, Some(1));

        let hit = run(&exons, Strand::Plus, 202, &opts);
        assert_eq!(hit.class, SpliceClass::SplicingIntronic);
        assert_eq!(hit.distance, Some(2));

        let hit = run(&exons, Strand::Plus, 250, &opts);
        assert_eq!(hit, SpliceHit::none());
    }

    #[test]
    fn deep_exonic_is_not_splice_region() {
        let exons = three_exons();
        let hit = run(&exons, Strand::Plus, 350, &SpliceOptions::default());
        assert_eq!(hit.class, SpliceClass::NonSpliceRegion);
        assert_eq!(hit.distance_label(), "-1");
    }

    #[test]
    fn exonic_near_previous_exon_junction() {
        let exons = three_exons();
        let hit = run(&exons, Strand::Plus, 302, &SpliceOptions::default());
        assert_eq!(hit.class, SpliceClass::SplicingExonic);
        assert_eq!(hit.distance, Some(2));
        assert_eq!(hit.exon, Some(1));
    }

    #[test]
    fn transcript_termini_are_not_junctions() {
        let exons = two_exons();
        let opts = SpliceOptions::default();

        // Outer edges of the first and last exon.
        assert_eq!(run(&exons, Strand::Plus, 101, &opts).class, SpliceClass::NonSpliceRegion);
        assert_eq!(run(&exons, Strand::Plus, 399, &opts).class, SpliceClass::NonSpliceRegion);
        assert_eq!(run(&exons, Strand::Minus, 101, &opts).class, SpliceClass::NonSpliceRegion);
        // Flanking the transcript is outside its span.
        assert_eq!(run(&exons, Strand::Plus, 99, &opts).class, SpliceClass::NonSpliceRegion);
        assert_eq!(run(&exons, Strand::Plus, 401, &opts).class, SpliceClass::NonSpliceRegion);
    }

    #[test]
    fn intronic_distance_bounds_are_inclusive() {
        let exons = two_exons();
        let opts = SpliceOptions::default();

        assert_eq!(run(&exons, Strand::Plus, 298, &opts).class, SpliceClass::SplicingIntronic);
        assert_eq!(run(&exons, Strand::Plus, 297, &opts).class, SpliceClass::NonSpliceRegion);
        assert_eq!(run(&exons, Strand::Plus, 203, &opts).class, SpliceClass::NonSpliceRegion);
    }

    #[test]
    fn strand_mirror_gives_same_label_and_distance() {
        let exons = three_exons();
        let axis = 1_000;
        let mirrored = mirror(&exons, axis);
        let opts = SpliceOptions::default();

        for pos in 95..=605 {
            let plus = run(&exons, Strand::Plus, pos, &opts);
            let minus = run(&mirrored, Strand::Minus, axis - pos, &opts);
            assert_eq!(plus.class, minus.class, "pos {pos}");
            assert_eq!(plus.distance, minus.distance, "pos {pos}");
        }
    }

    #[test]
    fn strand_mirror_holds_in_forced_modes() {
        let exons = three_exons();
        let axis = 1_000;
        let mirrored = mirror(&exons, axis);
        let opts = SpliceOptions {
            force_exonic: true,
            force_intronic: true,
            ..Default::default()
        };

        for pos in 95..=605 {
            let plus = run(&exons, Strand::Plus, pos, &opts);
            let minus = run(&mirrored, Strand::Minus, axis - pos, &opts);
            assert_eq!((plus.class, plus.distance), (minus.class, minus.distance), "pos {pos}");
        }
    }

    #[test]
    fn force_intronic_ignores_distance() {
        let exons = three_exons();
        let opts = SpliceOptions {
            force_intronic: true,
            ..Default::default()
        };

        let hit = run(&exons, Strand::Plus, 250, &opts);
        assert_eq!(hit.class, SpliceClass::Intronic);
        assert_eq!(hit.distance, Some(50));

        // Close to a junction, the forced label still wins.
        let hit = run(&exons, Strand::Plus, 201, &opts);
        assert_eq!(hit.class, SpliceClass::Intronic);
        assert_eq!(hit.distance, Some(1));

        let hit = run(&exons, Strand::Minus, 450, &opts);
        assert_eq!(hit.class, SpliceClass::Intronic);
    }

    #[test]
    fn force_exonic_reports_any_exon_position() {
        let exons = three_exons();
        let opts = SpliceOptions {
            force_exonic: true,
            ..Default::default()
        };

        let hit = run(&exons, Strand::Plus, 350, &opts);
        assert_eq!(hit.class, SpliceClass::Exonic);
        assert_eq!(hit.distance, Some(50));

        // First exon's outer edge is still exonic here.
        let hit = run(&exons, Strand::Minus, 101, &opts);
        assert_eq!(hit.class, SpliceClass::Exonic);
        assert_eq!(hit.distance, Some(1));
    }

    #[test]
    fn unknown_strand_is_an_error() {
        let mut cis = CisWindow::new(198, 199);
        let err = classify("T7", &two_exons(), Strand::Unknown, 199, &SpliceOptions::default(), &mut cis);
        match err {
            Err(AnnotateError::UnknownStrand { transcript, strand }) => {
                assert_eq!(transcript, "T7");
                assert_eq!(strand, '.');
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(cis, CisWindow::new(198, 199));
    }

    #[test]
    fn unbounded_distances_do_not_overflow() {
        let exons = two_exons();
        let wide_exonic = SpliceOptions {
            exonic_distance: u64::MAX,
            ..Default::default()
        };
        let wide_intronic = SpliceOptions {
            intronic_distance: u64::MAX,
            ..Default::default()
        };

        for strand in [Strand::Plus, Strand::Minus] {
            let hit = run(&exons, strand, 350, &wide_exonic);
            assert_eq!(hit.class, SpliceClass::SplicingExonic, "{strand}");
            assert_eq!(hit.distance, Some(50));

            let hit = run(&exons, strand, 250, &wide_intronic);
            assert_eq!(hit.class, SpliceClass::SplicingIntronic, "{strand}");
            assert_eq!(hit.distance, Some(50));
        }

        // Outside the transcript span stays out, however wide the window.
        let hit = run(&exons, Strand::Plus, 401, &wide_intronic);
        assert_eq!(hit.class, SpliceClass::NonSpliceRegion);
    }

    #[test]
    fn cis_window_spans_neighbouring_exons() {
        let exons = three_exons();
        let mut cis = CisWindow::new(300, 301);
        let hit = classify("T1", &exons, Strand::Plus, 301, &SpliceOptions::default(), &mut cis).unwrap();
        assert_eq!(hit.class, SpliceClass::SplicingExonic);
        assert_eq!(cis, CisWindow::new(100, 600));

        // First exon: the window is clamped to the exon itself on the left.
        let mut cis = CisWindow::new(198, 199);
        classify("T1", &exons, Strand::Plus, 199, &SpliceOptions::default(), &mut cis).unwrap();
        assert_eq!(cis, CisWindow::new(100, 400));
    }

    #[test]
    fn cis_window_on_shared_intron_follows_transcription_order() {
        // A 3bp intron: position 202 is near both flanking exons.
        let exons = vec![Exon::new(100, 200), Exon::new(204, 300), Exon::new(400, 500)];
        let opts = SpliceOptions::default();

        let mut plus = CisWindow::new(201, 202);
        classify("T1", &exons, Strand::Plus, 202, &opts, &mut plus).unwrap();
        assert_eq!(plus, CisWindow::new(100, 300));

        let mut minus = CisWindow::new(201, 202);
        classify("T1", &exons, Strand::Minus, 202, &opts, &mut minus).unwrap();
        assert_eq!(minus, CisWindow::new(100, 500));
    }

    #[test]
    fn cis_window_only_widens() {
        let exons = three_exons();
        let mut cis = CisWindow::new(349, 350);
        let mut last = cis;
        for idx in [1, 0, 2, 1] {
            cis.widen(&exons, idx);
            assert!(cis.start <= last.start);
            assert!(cis.end >= last.end);
            last = cis;
        }
        assert_eq!(cis, CisWindow::new(100, 600));
    }

    #[test]
    fn forced_hits_leave_cis_window_alone() {
        let exons = three_exons();
        let opts = SpliceOptions {
            force_exonic: true,
            ..Default::default()
        };
        let mut cis = CisWindow::new(301, 302);
        let hit = classify("T1", &exons, Strand::Plus, 302, &opts, &mut cis).unwrap();
        assert_eq!(hit.class, SpliceClass::Exonic);
        assert_eq!(cis, CisWindow::new(301, 302));
    }
}
