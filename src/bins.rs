//! UCSC-style hierarchical binning.
//!
//! Seven levels, finest first. The finest bins are 16 kb (`FIRST_SHIFT`) and
//! each coarser level is 8x wider (`NEXT_SHIFT`). Every level owns a disjoint
//! range of the shared bin-id space, starting at `LEVEL_OFFSETS[level]`:
//!
//! - Level 0: 16 kb bins, ids from 37449
//! - Level 1: 128 kb bins, ids from 4681
//! - Level 2: 1 Mb bins, ids from 585
//! - Level 3: 8 Mb bins, ids from 73
//! - Level 4: 64 Mb bins, ids from 9
//! - Level 5: 512 Mb bins, ids from 1
//! - Level 6: 4 Gb, the single bin 0
//!
//! An interval is registered in the smallest bin that contains it whole, so a
//! point query has to visit the bins around it on every level.

pub type Bin = u64;

pub const BIN_LEVELS: usize = 7;
pub const FIRST_SHIFT: u32 = 14;
pub const NEXT_SHIFT: u32 = 3;
pub const LEVEL_OFFSETS: [Bin; BIN_LEVELS] = [
    4096 * 8 + 4096 + 512 + 64 + 8 + 1,
    4096 + 512 + 64 + 8 + 1,
    512 + 64 + 8 + 1,
    64 + 8 + 1,
    8 + 1,
    1,
    0,
];

/// Last 0-based position the coarsest level covers; queries are clamped to it.
pub const MAX_POS: u64 = (1 << (FIRST_SHIFT + NEXT_SHIFT * (BIN_LEVELS as u32 - 1))) - 1;

/// Smallest bin containing the 0-based, half-open span `[start0, end0)`.
pub fn bin_for_span(start0: u64, end0: u64) -> Bin {
    let mut start = start0 >> FIRST_SHIFT;
    let mut end = end0.saturating_sub(1).max(start0) >> FIRST_SHIFT;
    for offset in LEVEL_OFFSETS {
        if start == end {
            return offset + start;
        }
        start >>= NEXT_SHIFT;
        end >>= NEXT_SHIFT;
    }
    // Wider than the coarsest level: park it in the top bin.
    0
}

/// Every bin, on every level, that can hold an interval touching
/// `[pos0 - slop, pos0 + slop]`.
///
/// Bins are yielded finest level first, ascending within a level.
pub fn bins_for_query(pos0: u64, slop: u64) -> impl Iterator<Item = Bin> {
    let start = pos0.saturating_sub(slop).min(MAX_POS) >> FIRST_SHIFT;
    let end = pos0.saturating_add(slop).min(MAX_POS) >> FIRST_SHIFT;

    LEVEL_OFFSETS
        .iter()
        .enumerate()
        .flat_map(move |(level, &offset)| {
            let shift = NEXT_SHIFT * level as u32;
            let (lo, hi) = (start >> shift, end >> shift);
            (lo + offset)..=(hi + offset)
        })
}
