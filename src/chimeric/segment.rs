// Alignment records and the coordinate vocabulary shared by all fusion stages

use crate::chimeric::group::Filter;
use std::fmt;

/// Genomic coordinate (1-based, inclusive)
pub type Position = i64;

/// Contig index, ordered by first appearance in the annotation
pub type ContigId = u32;

/// Strand of an alignment, a gene or a predicted transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn complement(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Forward => '+',
            Self::Reverse => '-',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Forward),
            '-' => Some(Self::Reverse),
            _ => None,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Flip `strand` when `complement` is set
pub fn complement_strand_if(strand: Strand, complement: bool) -> Strand {
    if complement {
        strand.complement()
    } else {
        strand
    }
}

/// Which side of a breakpoint the fusion partner lies on
///
/// DOWNSTREAM means the retained sequence ends at the breakpoint and the
/// partner follows at higher coordinates; UPSTREAM is the mirror image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Upstream,
    Downstream,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upstream => write!(f, "upstream"),
            Self::Downstream => write!(f, "downstream"),
        }
    }
}

/// Index of a gene in the annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneId(pub u32);

/// Gene reference carried by alignments and fusions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Gene {
    pub id: GeneId,
    pub strand: Strand,
}

impl Gene {
    pub fn new(id: u32, strand: Strand) -> Self {
        Self {
            id: GeneId(id),
            strand,
        }
    }
}

/// One mapped segment of a read
#[derive(Debug, Clone)]
pub struct AlignmentRecord {
    pub contig: ContigId,
    pub start: Position,
    pub end: Position,
    pub strand: Strand,
    /// Read-level strand inference (e.g. from splice motifs)
    pub predicted_strand: Strand,
    pub predicted_strand_ambiguous: bool,
    /// Genes overlapping the segment, in annotation order
    pub genes: Vec<Gene>,
    pub exonic: bool,
    /// Filter of the read this segment belongs to
    pub filter: Option<Filter>,
}

impl AlignmentRecord {
    /// Create a record with an unambiguous read-level strand equal to `strand`
    pub fn new(contig: ContigId, start: Position, end: Position, strand: Strand) -> Self {
        Self {
            contig,
            start,
            end,
            strand,
            predicted_strand: strand,
            predicted_strand_ambiguous: false,
            genes: Vec::new(),
            exonic: false,
            filter: None,
        }
    }

    pub fn with_genes(mut self, genes: Vec<Gene>) -> Self {
        self.genes = genes;
        self
    }

    pub fn with_exonic(mut self, exonic: bool) -> Self {
        self.exonic = exonic;
        self
    }

    pub fn with_filter(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_predicted_strand(mut self, strand: Option<Strand>) -> Self {
        match strand {
            Some(s) => {
                self.predicted_strand = s;
                self.predicted_strand_ambiguous = false;
            }
            None => self.predicted_strand_ambiguous = true,
        }
        self
    }

    /// Mate end facing the insert: the end of a forward mate, the start of a reverse one
    pub fn inward_end(&self) -> Position {
        match self.strand {
            Strand::Forward => self.end,
            Strand::Reverse => self.start,
        }
    }

    /// Mate end facing away from the insert
    pub fn outward_end(&self) -> Position {
        match self.strand {
            Strand::Forward => self.start,
            Strand::Reverse => self.end,
        }
    }

    /// Direction implied by a mate pointing towards a breakpoint
    pub fn mate_direction(&self) -> Direction {
        match self.strand {
            Strand::Forward => Direction::Downstream,
            Strand::Reverse => Direction::Upstream,
        }
    }
}
