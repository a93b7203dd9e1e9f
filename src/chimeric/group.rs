// Chimeric alignment groups: the unit of rearrangement evidence

use crate::chimeric::segment::AlignmentRecord;
use std::fmt;

/// Role index of the first mate (both group kinds)
pub const MATE1: usize = 0;
/// Role index of the second mate of a discordant pair
pub const MATE2: usize = 1;
/// Role index of the split segment of a split read
pub const SPLIT_READ: usize = 1;
/// Role index of the supplementary segment of a split read
pub const SUPPLEMENTARY: usize = 2;

/// Reason an upstream stage discarded an alignment group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Duplicates,
    UninformativeMates,
    Homopolymer,
    ReadThrough,
    SameGene,
    SmallInsertSize,
    LongGap,
    Hairpin,
    Mismatches,
    LowEntropy,
    Multimappers,
    InconsistentlyClipped,
    Homologs,
    Blacklist,
}

impl Filter {
    pub const ALL: [Filter; 14] = [
        Self::Duplicates,
        Self::UninformativeMates,
        Self::Homopolymer,
        Self::ReadThrough,
        Self::SameGene,
        Self::SmallInsertSize,
        Self::LongGap,
        Self::Hairpin,
        Self::Mismatches,
        Self::LowEntropy,
        Self::Multimappers,
        Self::InconsistentlyClipped,
        Self::Homologs,
        Self::Blacklist,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Duplicates => "duplicates",
            Self::UninformativeMates => "uninformative_mates",
            Self::Homopolymer => "homopolymer",
            Self::ReadThrough => "read_through",
            Self::SameGene => "same_gene",
            Self::SmallInsertSize => "small_insert_size",
            Self::LongGap => "long_gap",
            Self::Hairpin => "hairpin",
            Self::Mismatches => "mismatches",
            Self::LowEntropy => "low_entropy",
            Self::Multimappers => "multimappers",
            Self::InconsistentlyClipped => "inconsistently_clipped",
            Self::Homologs => "homologs",
            Self::Blacklist => "blacklist",
        }
    }
}

impl std::str::FromStr for Filter {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("unknown filter '{s}'"))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Shape of the evidence carried by a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Mate pair whose mates map to distant loci
    DiscordantMates,
    /// Read split across the breakpoint, plus its non-split mate
    SplitRead,
}

/// 2 or 3 alignments in fixed role order, see the role constants
#[derive(Debug, Clone)]
pub struct ChimericAlignmentGroup {
    pub name: String,
    pub alignments: Vec<AlignmentRecord>,
    /// `None` means the group passed all upstream filters
    pub filter: Option<Filter>,
}

impl ChimericAlignmentGroup {
    pub fn discordant_mates(
        name: impl Into<String>,
        mate1: AlignmentRecord,
        mate2: AlignmentRecord,
    ) -> Self {
        Self {
            name: name.into(),
            alignments: vec![mate1, mate2],
            filter: None,
        }
    }

    pub fn split_read(
        name: impl Into<String>,
        mate1: AlignmentRecord,
        split_read: AlignmentRecord,
        supplementary: AlignmentRecord,
    ) -> Self {
        Self {
            name: name.into(),
            alignments: vec![mate1, split_read, supplementary],
            filter: None,
        }
    }

    /// Set the group filter and stamp it on every alignment
    pub fn with_filter(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter;
        for alignment in &mut self.alignments {
            alignment.filter = filter;
        }
        self
    }

    /// `None` for malformed groups, which carry neither 2 nor 3 alignments
    pub fn kind(&self) -> Option<GroupKind> {
        match self.alignments.len() {
            2 => Some(GroupKind::DiscordantMates),
            3 => Some(GroupKind::SplitRead),
            _ => None,
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }

    pub fn mate1(&self) -> &AlignmentRecord {
        &self.alignments[MATE1]
    }

    pub fn mate2(&self) -> &AlignmentRecord {
        &self.alignments[MATE2]
    }

    pub fn split_segment(&self) -> &AlignmentRecord {
        &self.alignments[SPLIT_READ]
    }

    pub fn supplementary(&self) -> &AlignmentRecord {
        &self.alignments[SUPPLEMENTARY]
    }
}
