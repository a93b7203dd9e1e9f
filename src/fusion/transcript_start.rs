// Splice-site detection and 5' partner prediction

use crate::annotation::SpliceSiteLookup;
use crate::chimeric::{Direction, Gene, Strand};
use crate::fusion::{Fusion, TranscriptStart};

/// Whether a gene's own promoter drives transcription across the breakpoint
fn gene_leads(gene: Gene, direction: Direction) -> bool {
    matches!(
        (gene.strand, direction),
        (Strand::Forward, Direction::Downstream) | (Strand::Reverse, Direction::Upstream)
    )
}

fn start_from_gene1(fusion: &Fusion) -> TranscriptStart {
    if gene_leads(fusion.gene1, fusion.direction1) {
        TranscriptStart::Gene1
    } else {
        TranscriptStart::Gene2
    }
}

fn start_from_gene2(fusion: &Fusion) -> TranscriptStart {
    if gene_leads(fusion.gene2, fusion.direction2) {
        TranscriptStart::Gene2
    } else {
        TranscriptStart::Gene1
    }
}

/// Flag breakpoints that coincide with annotated splice sites
///
/// Must run after strand prediction. Fusions supported only by discordant
/// mates, or with unknown strands, are never spliced.
pub fn detect_splice_sites<A: SpliceSiteLookup + ?Sized>(fusion: &mut Fusion, annotation: &A) {
    if (fusion.split_read1_list.is_empty() && fusion.split_read2_list.is_empty())
        || fusion.predicted_strands_ambiguous
    {
        fusion.spliced1 = false;
        fusion.spliced2 = false;
        return;
    }

    fusion.spliced1 = fusion.exonic1
        && fusion.gene1.strand == fusion.predicted_strand1
        && annotation.is_breakpoint_spliced(
            fusion.gene1,
            fusion.direction1,
            fusion.contig1,
            fusion.breakpoint1,
        );
    fusion.spliced2 = fusion.exonic2
        && fusion.gene2.strand == fusion.predicted_strand2
        && annotation.is_breakpoint_spliced(
            fusion.gene2,
            fusion.direction2,
            fusion.contig2,
            fusion.breakpoint2,
        );
}

/// First matching rule wins; `None` means ambiguous
fn infer_transcript_start(fusion: &Fusion) -> Option<TranscriptStart> {
    let strands_known = !fusion.predicted_strands_ambiguous;

    if fusion.spliced1 || (strands_known && fusion.predicted_strand1 == fusion.gene1.strand) {
        return Some(start_from_gene1(fusion));
    }

    if fusion.spliced2 || (strands_known && fusion.predicted_strand2 == fusion.gene2.strand) {
        return Some(start_from_gene2(fusion));
    }

    // Known strands that contradict both genes are as inconclusive as two intronic breakpoints
    if (!fusion.exonic1 && !fusion.exonic2) || strands_known {
        return None;
    }

    // From here on the strands are unknown: guess from exon/intron location
    let unspliced_read_through = fusion.split_reads() == 0 && fusion.is_read_through();

    if !fusion.exonic1 && fusion.exonic2 {
        // Intronic/intergenic breakpoint1, gene2 has priority
        if gene_leads(fusion.gene2, fusion.direction2) {
            Some(TranscriptStart::Gene2)
        } else if unspliced_read_through {
            Some(TranscriptStart::Gene1)
        } else {
            None
        }
    } else if fusion.exonic1 && !fusion.exonic2 {
        if gene_leads(fusion.gene1, fusion.direction1) || unspliced_read_through {
            Some(TranscriptStart::Gene1)
        } else {
            None
        }
    } else if gene_leads(fusion.gene1, fusion.direction1) {
        Some(TranscriptStart::Gene1)
    } else if gene_leads(fusion.gene2, fusion.direction2) {
        Some(TranscriptStart::Gene2)
    } else {
        // End-to-end fused genes
        None
    }
}

/// Decide which gene forms the 5' end of the fused transcript
///
/// Must run after `detect_splice_sites`. Ambiguous fusions still get
/// `TranscriptStart::Gene1` so that partners print in a stable order. When
/// the read evidence left the strands open, they are filled in from the
/// orientation of the 5' gene.
pub fn predict_transcript_start(fusion: &mut Fusion) {
    match infer_transcript_start(fusion) {
        Some(transcript_start) => {
            fusion.transcript_start = transcript_start;
            fusion.transcript_start_ambiguous = false;

            if fusion.predicted_strands_ambiguous {
                match transcript_start {
                    TranscriptStart::Gene1 => fusion.set_strands_from_side1(fusion.gene1.strand),
                    TranscriptStart::Gene2 => fusion.set_strands_from_side2(fusion.gene2.strand),
                }
            }
        }
        None => {
            fusion.transcript_start = TranscriptStart::Gene1;
            fusion.transcript_start_ambiguous = true;
        }
    }
}
