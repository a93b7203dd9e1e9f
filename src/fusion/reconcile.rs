// Attach discordant mates to the breakpoints established for each gene pair

use crate::chimeric::{AlignmentRecord, ChimericAlignmentGroup, Direction, Position, Strand};
use crate::fusion::{expand_anchor, DiscordantMateIndex, Fusion, Fusions};

/// Discordant mates attached per fusion before scanning stops
pub const MAX_DISCORDANT_MATES: u32 = 1000;

/// Overshoot allowed past a breakpoint confirmed by split reads
pub const SPLIT_READ_MATE_GAP: Position = 2;

/// Mates of a pair ordered by (contig, inward end)
fn ordered_mates(group: &ChimericAlignmentGroup) -> (&AlignmentRecord, &AlignmentRecord) {
    let (mate1, mate2) = (group.mate1(), group.mate2());
    if (mate1.contig, mate1.inward_end()) > (mate2.contig, mate2.inward_end()) {
        (mate2, mate1)
    } else {
        (mate1, mate2)
    }
}

/// Whether a mate points towards `breakpoint` and does not run past it by more than `gap`
fn mate_supports_breakpoint(
    mate: &AlignmentRecord,
    direction: Direction,
    breakpoint: Position,
    gap: Position,
) -> bool {
    match (direction, mate.strand) {
        (Direction::Downstream, Strand::Forward) => mate.end.saturating_sub(gap) <= breakpoint,
        (Direction::Upstream, Strand::Reverse) => mate.start.saturating_add(gap) >= breakpoint,
        _ => false,
    }
}

/// Scan the discordant mates of the fusion's gene pair; returns whether the cap was hit
fn attach_discordant_mates(
    fusion: &mut Fusion,
    candidates: &[usize],
    groups: &[ChimericAlignmentGroup],
    max_mate_gap: Position,
) -> bool {
    // Without split reads the breakpoint may lie anywhere in a splice-gap-sized window
    let gap = if fusion.split_reads() > 0 {
        SPLIT_READ_MATE_GAP
    } else {
        max_mate_gap
    };

    for &idx in candidates {
        let group = &groups[idx];
        let (mate1, mate2) = ordered_mates(group);

        if !mate_supports_breakpoint(mate1, fusion.direction1, fusion.breakpoint1, gap)
            || !mate_supports_breakpoint(mate2, fusion.direction2, fusion.breakpoint2, gap)
        {
            continue;
        }

        fusion.discordant_mate_list.push(idx);
        if !group.is_filtered() {
            fusion.discordant_mates += 1;
        } else if fusion.filter.is_none() {
            fusion.filter = group.filter;
        }

        expand_anchor(&mut fusion.anchor_start1, fusion.direction1, mate1.outward_end());
        expand_anchor(&mut fusion.anchor_start2, fusion.direction2, mate2.outward_end());

        if fusion.discordant_mates >= MAX_DISCORDANT_MATES {
            return true;
        }
    }

    false
}

/// Count the discordant mates supporting each unfiltered fusion
///
/// A mate pair only bounds the breakpoint region, so every fusion of a gene
/// pair is checked against every pair indexed under it. Returns the number
/// of fusions whose scan stopped at `MAX_DISCORDANT_MATES`.
pub fn reconcile_discordant_mates(
    fusions: &mut Fusions,
    discordant_mates_by_gene_pair: &DiscordantMateIndex,
    groups: &[ChimericAlignmentGroup],
    max_mate_gap: Position,
) -> usize {
    let mut subsampled_fusions = 0;

    for fusion in fusions.values_mut() {
        if fusion.filter.is_some() {
            continue;
        }

        let Some(candidates) =
            discordant_mates_by_gene_pair.get(&(fusion.gene1.id, fusion.gene2.id))
        else {
            continue;
        };

        if attach_discordant_mates(fusion, candidates, groups, max_mate_gap) {
            subsampled_fusions += 1;
        }
    }

    if subsampled_fusions > 0 {
        log::warn!(
            "{} fusions were subsampled, because they have more than {} discordant mates",
            subsampled_fusions,
            MAX_DISCORDANT_MATES
        );
    }

    subsampled_fusions
}
