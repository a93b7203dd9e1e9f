// Chimeric alignment model and input
//
// A chimeric alignment group is the evidence of one read or read pair for a
// genomic rearrangement:
// - Discordant mates: both mates map, but to distant loci
// - Split read: one mate spans the breakpoint (split + supplementary segment)

mod group;
mod input;
mod segment;

pub use group::{
    ChimericAlignmentGroup, Filter, GroupKind, MATE1, MATE2, SPLIT_READ, SUPPLEMENTARY,
};
pub use input::read_chimeric_alignments;
pub use segment::{
    complement_strand_if, AlignmentRecord, ContigId, Direction, Gene, GeneId, Position, Strand,
};
