// Merge chimeric alignment groups into fusions

use crate::chimeric::{
    ChimericAlignmentGroup, ContigId, Direction, Gene, GeneId, GroupKind, Position, Strand,
};
use crate::fusion::{expand_anchor, Fusion, FusionKey, Fusions};
use std::collections::HashMap;
use std::mem::swap;

/// Discordant mate groups (indices) for each (gene1, gene2) pair
pub type DiscordantMateIndex = HashMap<(GeneId, GeneId), Vec<usize>>;

/// Breakpoint pair described by a single group
struct Evidence<'a> {
    contig1: ContigId,
    contig2: ContigId,
    breakpoint1: Position,
    breakpoint2: Position,
    genes1: &'a [Gene],
    genes2: &'a [Gene],
    direction1: Direction,
    direction2: Direction,
    exonic1: bool,
    exonic2: bool,
    anchor_start1: Position,
    anchor_start2: Position,
}

impl<'a> Evidence<'a> {
    fn from_split_read(group: &'a ChimericAlignmentGroup) -> Self {
        let mate1 = group.mate1();
        let split = group.split_segment();
        let supplementary = group.supplementary();

        // The split segment's clipped end abuts breakpoint1, the supplementary's breakpoint2
        let (breakpoint1, direction1) = match split.strand {
            Strand::Forward => (split.start, Direction::Upstream),
            Strand::Reverse => (split.end, Direction::Downstream),
        };
        let (breakpoint2, direction2) = match supplementary.strand {
            Strand::Forward => (supplementary.end, Direction::Downstream),
            Strand::Reverse => (supplementary.start, Direction::Upstream),
        };

        Self {
            contig1: split.contig,
            contig2: supplementary.contig,
            breakpoint1,
            breakpoint2,
            genes1: &split.genes,
            genes2: &supplementary.genes,
            direction1,
            direction2,
            exonic1: split.exonic,
            exonic2: supplementary.exonic,
            anchor_start1: mate1.outward_end(),
            anchor_start2: supplementary.outward_end(),
        }
    }

    fn from_discordant_mates(group: &'a ChimericAlignmentGroup) -> Self {
        let mate1 = group.mate1();
        let mate2 = group.mate2();

        Self {
            contig1: mate1.contig,
            contig2: mate2.contig,
            breakpoint1: mate1.inward_end(),
            breakpoint2: mate2.inward_end(),
            genes1: &mate1.genes,
            genes2: &mate2.genes,
            direction1: mate1.mate_direction(),
            direction2: mate2.mate_direction(),
            exonic1: mate1.exonic,
            exonic2: mate2.exonic,
            anchor_start1: mate1.outward_end(),
            anchor_start2: mate2.outward_end(),
        }
    }

    /// Put the lower (contig, breakpoint) first; returns whether the sides were swapped
    fn canonicalize(&mut self) -> bool {
        if (self.contig1, self.breakpoint1) <= (self.contig2, self.breakpoint2) {
            return false;
        }
        swap(&mut self.contig1, &mut self.contig2);
        swap(&mut self.breakpoint1, &mut self.breakpoint2);
        swap(&mut self.genes1, &mut self.genes2);
        swap(&mut self.direction1, &mut self.direction2);
        swap(&mut self.exonic1, &mut self.exonic2);
        swap(&mut self.anchor_start1, &mut self.anchor_start2);
        true
    }

    fn key(&self, gene1: Gene, gene2: Gene) -> FusionKey {
        FusionKey {
            gene1,
            gene2,
            contig1: self.contig1,
            contig2: self.contig2,
            breakpoint1: self.breakpoint1,
            breakpoint2: self.breakpoint2,
            direction1: self.direction1,
            direction2: self.direction2,
        }
    }

    /// Visit the fusion of every gene combination, creating it on first encounter
    ///
    /// The callback also receives whether the fusion is new. Every gene after
    /// the first on either side is flagged as an overlap duplicate.
    fn for_each_fusion(&self, fusions: &mut Fusions, mut visit: impl FnMut(&mut Fusion, bool)) {
        for (i, &gene1) in self.genes1.iter().enumerate() {
            for (j, &gene2) in self.genes2.iter().enumerate() {
                let key = self.key(gene1, gene2);
                let is_new = !fusions.contains_key(&key);
                let fusion = fusions.entry(key).or_insert_with(|| Fusion::new(key));

                fusion.exonic1 = self.exonic1;
                fusion.exonic2 = self.exonic2;
                fusion.overlap_duplicate1 = i > 0;
                fusion.overlap_duplicate2 = j > 0;

                visit(&mut *fusion, is_new);

                expand_anchor(&mut fusion.anchor_start1, fusion.direction1, self.anchor_start1);
                expand_anchor(&mut fusion.anchor_start2, fusion.direction2, self.anchor_start2);
            }
        }
    }
}

/// Build fusions from all groups
///
/// Split reads are counted immediately. Discordant mates are only indexed by
/// gene pair here; `reconcile_discordant_mates` attaches them later.
pub fn aggregate_fusions(groups: &[ChimericAlignmentGroup]) -> (Fusions, DiscordantMateIndex) {
    let mut fusions = Fusions::new();
    let mut discordant_mates_by_gene_pair = DiscordantMateIndex::new();

    for (idx, group) in groups.iter().enumerate() {
        match group.kind() {
            Some(GroupKind::SplitRead) => {
                let mut evidence = Evidence::from_split_read(group);
                let swapped = evidence.canonicalize();

                evidence.for_each_fusion(&mut fusions, |fusion, _| {
                    // The first group decides until unfiltered evidence exists
                    if fusion.supporting_reads() == 0 {
                        fusion.filter = group.filter;
                    }

                    if swapped {
                        fusion.split_read2_list.push(idx);
                        if !group.is_filtered() {
                            fusion.split_reads2 += 1;
                        }
                    } else {
                        fusion.split_read1_list.push(idx);
                        if !group.is_filtered() {
                            fusion.split_reads1 += 1;
                        }
                    }
                });
            }
            Some(GroupKind::DiscordantMates) => {
                let mut evidence = Evidence::from_discordant_mates(group);
                evidence.canonicalize();

                evidence.for_each_fusion(&mut fusions, |fusion, is_new| {
                    // Once an unfiltered pair is seen, the fusion stays unfiltered
                    if !group.is_filtered() {
                        fusion.filter = None;
                    } else if is_new || fusion.filter.is_some() {
                        fusion.filter = group.filter;
                    }

                    discordant_mates_by_gene_pair
                        .entry((fusion.gene1.id, fusion.gene2.id))
                        .or_default()
                        .push(idx);
                });
            }
            None => {}
        }
    }

    (fusions, discordant_mates_by_gene_pair)
}
