// Majority vote on the transcribed strand of a fusion

use crate::chimeric::{
    complement_strand_if, AlignmentRecord, ChimericAlignmentGroup, Direction, Filter, Strand,
};
use crate::fusion::Fusion;

/// Votes for the strand of breakpoint1
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct StrandVotes {
    forward: u32,
    reverse: u32,
}

impl StrandVotes {
    fn add(&mut self, alignment: &AlignmentRecord) {
        if alignment.predicted_strand_ambiguous {
            return;
        }
        match alignment.predicted_strand {
            Strand::Forward => self.forward += 1,
            Strand::Reverse => self.reverse += 1,
        }
    }

    /// `None` on a tie
    fn majority(&self) -> Option<Strand> {
        match self.forward.cmp(&self.reverse) {
            std::cmp::Ordering::Greater => Some(Strand::Forward),
            std::cmp::Ordering::Less => Some(Strand::Reverse),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl Fusion {
    /// Set both predicted strands from breakpoint1's
    ///
    /// The two ends run on the same strand only when their directions differ.
    pub(crate) fn set_strands_from_side1(&mut self, strand1: Strand) {
        self.predicted_strands_ambiguous = false;
        self.predicted_strand1 = strand1;
        self.predicted_strand2 = complement_strand_if(strand1, self.direction1 == self.direction2);
    }

    /// Set both predicted strands from breakpoint2's
    pub(crate) fn set_strands_from_side2(&mut self, strand2: Strand) {
        self.predicted_strands_ambiguous = false;
        self.predicted_strand2 = strand2;
        self.predicted_strand1 = complement_strand_if(strand2, self.direction1 == self.direction2);
    }
}

/// Pick the mate of a discordant pair that supports breakpoint1
///
/// Returns `None` when both mates are equally close to either breakpoint.
fn mate_at_breakpoint1<'a>(
    fusion: &Fusion,
    group: &'a ChimericAlignmentGroup,
) -> Option<&'a AlignmentRecord> {
    let (mut mate1, mut mate2) = (group.mate1(), group.mate2());

    let points_to_breakpoint1 =
        (mate1.strand == Strand::Forward) == (fusion.direction1 == Direction::Downstream);

    if mate1.contig != fusion.contig1 || !points_to_breakpoint1 {
        std::mem::swap(&mut mate1, &mut mate2);
    } else if mate1.strand == mate2.strand {
        // Same contig, same orientation: go by proximity
        let (end1, end2) = match fusion.direction1 {
            Direction::Downstream => (mate1.end, mate2.end),
            Direction::Upstream => (mate1.start, mate2.start),
        };
        let distance_kept = (fusion.breakpoint1 - end1).abs() + (fusion.breakpoint2 - end2).abs();
        let distance_swapped =
            (fusion.breakpoint2 - end1).abs() + (fusion.breakpoint1 - end2).abs();

        if distance_kept == distance_swapped {
            return None;
        } else if distance_swapped < distance_kept {
            std::mem::swap(&mut mate1, &mut mate2);
        }
    }

    Some(mate1)
}

/// Predict the strands of both fusion partners from the supporting reads
///
/// Split reads on side 2 vote with their supplementary segment, which is
/// linked to side 1 through the direction pair. Discordant mates from
/// hairpin structures are skipped.
pub fn predict_fusion_strands(fusion: &mut Fusion, groups: &[ChimericAlignmentGroup]) {
    let mut votes = StrandVotes::default();

    for &idx in &fusion.split_read1_list {
        let group = &groups[idx];
        if !group.is_filtered() {
            votes.add(group.split_segment());
        }
    }

    for &idx in &fusion.split_read2_list {
        let group = &groups[idx];
        if !group.is_filtered() {
            votes.add(group.supplementary());
        }
    }

    for &idx in &fusion.discordant_mate_list {
        let group = &groups[idx];
        if group.filter == Some(Filter::Hairpin) {
            continue;
        }
        if let Some(mate) = mate_at_breakpoint1(fusion, group) {
            votes.add(mate);
        }
    }

    match votes.majority() {
        Some(strand1) => fusion.set_strands_from_side1(strand1),
        None => fusion.predicted_strands_ambiguous = true,
    }
}
