// Fusion calling from chimeric alignment groups
//
// Stages, in dependency order:
// - aggregate: merge groups into fusions keyed by canonical breakpoint pair
// - reconcile: attach discordant mates to the breakpoints of each gene pair
// - strand: majority vote over supporting reads
// - transcript_start: splice-site check, then which gene is the 5' end
//
// Each stage reads what the previous one wrote into the same Fusion.

mod aggregate;
mod output;
mod reconcile;
mod strand;
mod transcript_start;

pub use aggregate::{aggregate_fusions, DiscordantMateIndex};
pub use output::FusionWriter;
pub use reconcile::{reconcile_discordant_mates, MAX_DISCORDANT_MATES, SPLIT_READ_MATE_GAP};
pub use strand::predict_fusion_strands;
pub use transcript_start::{detect_splice_sites, predict_transcript_start};

use crate::annotation::SpliceSiteLookup;
use crate::chimeric::{ChimericAlignmentGroup, ContigId, Direction, Filter, Gene, Position, Strand};
use crate::stats::FusionStats;
use std::collections::HashMap;

/// Maximum breakpoint distance for two adjacent genes to count as read-through
pub const MAX_READ_THROUGH_DISTANCE: Position = 400_000;

/// Which gene contributes the 5' end of the fused transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptStart {
    Gene1,
    Gene2,
}

/// Canonical identity of a fusion
///
/// `(contig1, breakpoint1) <= (contig2, breakpoint2)` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FusionKey {
    pub gene1: Gene,
    pub gene2: Gene,
    pub contig1: ContigId,
    pub contig2: ContigId,
    pub breakpoint1: Position,
    pub breakpoint2: Position,
    pub direction1: Direction,
    pub direction2: Direction,
}

/// Candidate fusion with its supporting evidence and predictions
#[derive(Debug, Clone)]
pub struct Fusion {
    pub gene1: Gene,
    pub gene2: Gene,
    pub contig1: ContigId,
    pub contig2: ContigId,
    pub breakpoint1: Position,
    pub breakpoint2: Position,
    pub direction1: Direction,
    pub direction2: Direction,
    pub exonic1: bool,
    pub exonic2: bool,
    /// Furthest aligned extent away from each breakpoint
    pub anchor_start1: Option<Position>,
    pub anchor_start2: Option<Position>,
    pub split_reads1: u32,
    pub split_reads2: u32,
    pub discordant_mates: u32,
    /// Indices into the chimeric alignment groups
    pub split_read1_list: Vec<usize>,
    pub split_read2_list: Vec<usize>,
    pub discordant_mate_list: Vec<usize>,
    pub overlap_duplicate1: bool,
    pub overlap_duplicate2: bool,
    pub filter: Option<Filter>,
    pub predicted_strand1: Strand,
    pub predicted_strand2: Strand,
    pub predicted_strands_ambiguous: bool,
    pub spliced1: bool,
    pub spliced2: bool,
    pub transcript_start: TranscriptStart,
    pub transcript_start_ambiguous: bool,
}

pub type Fusions = HashMap<FusionKey, Fusion>;

impl Fusion {
    pub fn new(key: FusionKey) -> Self {
        Self {
            gene1: key.gene1,
            gene2: key.gene2,
            contig1: key.contig1,
            contig2: key.contig2,
            breakpoint1: key.breakpoint1,
            breakpoint2: key.breakpoint2,
            direction1: key.direction1,
            direction2: key.direction2,
            exonic1: false,
            exonic2: false,
            anchor_start1: None,
            anchor_start2: None,
            split_reads1: 0,
            split_reads2: 0,
            discordant_mates: 0,
            split_read1_list: Vec::new(),
            split_read2_list: Vec::new(),
            discordant_mate_list: Vec::new(),
            overlap_duplicate1: false,
            overlap_duplicate2: false,
            filter: None,
            predicted_strand1: Strand::Forward,
            predicted_strand2: Strand::Forward,
            predicted_strands_ambiguous: true,
            spliced1: false,
            spliced2: false,
            transcript_start: TranscriptStart::Gene1,
            transcript_start_ambiguous: false,
        }
    }

    pub fn key(&self) -> FusionKey {
        FusionKey {
            gene1: self.gene1,
            gene2: self.gene2,
            contig1: self.contig1,
            contig2: self.contig2,
            breakpoint1: self.breakpoint1,
            breakpoint2: self.breakpoint2,
            direction1: self.direction1,
            direction2: self.direction2,
        }
    }

    pub fn split_reads(&self) -> u32 {
        self.split_reads1 + self.split_reads2
    }

    pub fn supporting_reads(&self) -> u32 {
        self.split_reads1 + self.split_reads2 + self.discordant_mates
    }

    pub fn is_translocation(&self) -> bool {
        self.contig1 != self.contig2
    }

    pub fn is_inversion(&self) -> bool {
        self.contig1 == self.contig2 && self.direction1 == self.direction2
    }

    pub fn is_deletion(&self) -> bool {
        self.contig1 == self.contig2
            && self.direction1 == Direction::Downstream
            && self.direction2 == Direction::Upstream
    }

    pub fn is_duplication(&self) -> bool {
        self.contig1 == self.contig2
            && self.direction1 == Direction::Upstream
            && self.direction2 == Direction::Downstream
    }

    /// Deletion-like junction between nearby genes of the same orientation
    pub fn is_read_through(&self) -> bool {
        self.is_deletion()
            && self.gene1.strand == self.gene2.strand
            && self.breakpoint2 - self.breakpoint1 < MAX_READ_THROUGH_DISTANCE
    }
}

/// Extend an anchor away from its breakpoint
///
/// DOWNSTREAM anchors grow towards lower coordinates, UPSTREAM anchors
/// towards higher ones.
pub(crate) fn expand_anchor(
    anchor: &mut Option<Position>,
    direction: Direction,
    candidate: Position,
) {
    let extend = match (*anchor, direction) {
        (None, _) => true,
        (Some(current), Direction::Downstream) => candidate < current,
        (Some(current), Direction::Upstream) => candidate > current,
    };
    if extend {
        *anchor = Some(candidate);
    }
}

/// Run all fusion calling stages over the chimeric alignment groups
///
/// Returns every fusion (filtered ones included) and run statistics;
/// `stats.remaining` counts the fusions without a filter.
pub fn find_fusions<A: SpliceSiteLookup + ?Sized>(
    groups: &[ChimericAlignmentGroup],
    annotation: &A,
    max_mate_gap: Position,
) -> (Fusions, FusionStats) {
    let mut stats = FusionStats::new();
    for group in groups {
        stats.record_group(group.kind());
    }
    if stats.malformed_groups > 0 {
        log::warn!(
            "Ignoring {} chimeric alignment groups with neither 2 nor 3 alignments",
            stats.malformed_groups
        );
    }

    let (mut fusions, discordant_mates_by_gene_pair) = aggregate_fusions(groups);
    log::debug!("Aggregated {} candidate fusions", fusions.len());

    stats.subsampled_fusions = reconcile_discordant_mates(
        &mut fusions,
        &discordant_mates_by_gene_pair,
        groups,
        max_mate_gap,
    );

    for fusion in fusions.values_mut() {
        predict_fusion_strands(fusion, groups);
        // needs the predicted strands
        detect_splice_sites(fusion, annotation);
        // needs the splice sites
        predict_transcript_start(fusion);

        stats.record_fusion(fusion);
    }

    (fusions, stats)
}
