// Fusion table writer

use crate::annotation::GeneAnnotation;
use crate::chimeric::{Position, Strand};
use crate::error::Error;
use crate::fusion::{Fusion, Fusions, TranscriptStart};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const HEADER: &str = "#gene1\tgene2\tstrand1(gene/fusion)\tstrand2(gene/fusion)\tbreakpoint1\tbreakpoint2\tdirection1\tdirection2\tsite1\tsite2\ttype\tsplit_reads1\tsplit_reads2\tdiscordant_mates\tanchor1\tanchor2\ttranscript_start\tfilter\toverlap_duplicate";

/// Writer for the tab-separated fusion table
pub struct FusionWriter {
    writer: BufWriter<File>,
}

impl FusionWriter {
    /// Create the output file and write the header line
    pub fn create(path: &Path) -> Result<Self, Error> {
        let file = File::create(path).map_err(|e| Error::io(e, path))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", HEADER)
            .map_err(|e| Error::Output(format!("Failed to write fusion header: {}", e)))?;
        Ok(Self { writer })
    }

    /// Write fusions in genomic order; returns the number of rows written
    ///
    /// Filtered fusions are skipped unless `include_filtered` is set.
    pub fn write_fusions(
        &mut self,
        fusions: &Fusions,
        annotation: &GeneAnnotation,
        include_filtered: bool,
    ) -> Result<usize, Error> {
        let mut sorted: Vec<&Fusion> = fusions
            .values()
            .filter(|f| include_filtered || f.filter.is_none())
            .collect();
        sorted.sort_by_key(|f| {
            (
                f.contig1,
                f.breakpoint1,
                f.contig2,
                f.breakpoint2,
                f.gene1.id,
                f.gene2.id,
                f.direction1,
                f.direction2,
            )
        });

        for fusion in &sorted {
            self.write_fusion(fusion, annotation)?;
        }

        Ok(sorted.len())
    }

    /// Write a single fusion
    ///
    /// Format: 19 tab-separated columns
    /// 1-2. Gene names
    /// 3-4. Gene strand / predicted fusion strand (`.` when unknown)
    /// 5-6. Breakpoints as contig:position
    /// 7-8. Directions
    /// 9-10. splice-site, exon or intron
    /// 11. Event type
    /// 12-14. Split reads per side, discordant mates
    /// 15-16. Anchor extents (`.` when unset)
    /// 17. 5' gene (`.` when ambiguous)
    /// 18. Filter (`.` when passed)
    /// 19. `duplicate` for secondary interpretations of overlapping genes
    pub fn write_fusion(&mut self, fusion: &Fusion, annotation: &GeneAnnotation) -> Result<(), Error> {
        let strand = |gene_strand: Strand, predicted: Strand| {
            if fusion.predicted_strands_ambiguous {
                format!("{}/.", gene_strand)
            } else {
                format!("{}/{}", gene_strand, predicted)
            }
        };
        let site = |spliced: bool, exonic: bool| {
            if spliced {
                "splice-site"
            } else if exonic {
                "exon"
            } else {
                "intron"
            }
        };
        let transcript_start = match (fusion.transcript_start_ambiguous, fusion.transcript_start) {
            (true, _) => ".",
            (false, TranscriptStart::Gene1) => "gene1",
            (false, TranscriptStart::Gene2) => "gene2",
        };
        let filter = fusion.filter.map_or_else(|| ".".to_string(), |f| f.to_string());
        let overlap_duplicate = if fusion.overlap_duplicate1 || fusion.overlap_duplicate2 {
            "duplicate"
        } else {
            "."
        };

        writeln!(
            self.writer,
            "{}\t{}\t{}\t{}\t{}:{}\t{}:{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            annotation.gene_name(fusion.gene1.id),
            annotation.gene_name(fusion.gene2.id),
            strand(fusion.gene1.strand, fusion.predicted_strand1),
            strand(fusion.gene2.strand, fusion.predicted_strand2),
            annotation.contig_name(fusion.contig1),
            fusion.breakpoint1,
            annotation.contig_name(fusion.contig2),
            fusion.breakpoint2,
            fusion.direction1,
            fusion.direction2,
            site(fusion.spliced1, fusion.exonic1),
            site(fusion.spliced2, fusion.exonic2),
            event_type(fusion),
            fusion.split_reads1,
            fusion.split_reads2,
            fusion.discordant_mates,
            format_anchor(fusion.anchor_start1),
            format_anchor(fusion.anchor_start2),
            transcript_start,
            filter,
            overlap_duplicate,
        )
        .map_err(|e| Error::Output(format!("Failed to write fusion: {}", e)))?;

        Ok(())
    }

    /// Flush buffered data to disk
    pub fn flush(&mut self) -> Result<(), Error> {
        self.writer
            .flush()
            .map_err(|e| Error::Output(format!("Failed to flush fusion table: {}", e)))
    }
}

fn format_anchor(anchor: Option<Position>) -> String {
    anchor.map_or_else(|| ".".to_string(), |a| a.to_string())
}

/// Structural classification of the rearrangement
fn event_type(fusion: &Fusion) -> &'static str {
    if fusion.is_translocation() {
        "translocation"
    } else if fusion.is_inversion() {
        "inversion"
    } else if fusion.is_read_through() {
        "deletion/read-through"
    } else if fusion.is_duplication() {
        "duplication"
    } else {
        "deletion"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chimeric::{Direction, Filter};
    use crate::fusion::FusionKey;
    use tempfile::tempdir;

    fn annotation() -> GeneAnnotation {
        let mut annotation = GeneAnnotation::empty();
        annotation.contig_or_insert("chr9");
        annotation.contig_or_insert("chr22");
        annotation.gene_or_insert("ABL1", Strand::Forward);
        annotation.gene_or_insert("BCR", Strand::Forward);
        annotation
    }

    fn fusion(annotation: &GeneAnnotation, breakpoint1: Position) -> Fusion {
        let mut f = Fusion::new(FusionKey {
            gene1: annotation.gene("ABL1").unwrap(),
            gene2: annotation.gene("BCR").unwrap(),
            contig1: 0,
            contig2: 1,
            breakpoint1,
            breakpoint2: 23_632_600,
            direction1: Direction::Upstream,
            direction2: Direction::Downstream,
        });
        f.exonic1 = true;
        f.split_reads1 = 3;
        f.discordant_mates = 2;
        f.anchor_start1 = Some(breakpoint1 + 150);
        f.set_strands_from_side1(Strand::Forward);
        f.spliced2 = true;
        f.transcript_start = TranscriptStart::Gene2;
        f
    }

    fn write(fusions: &Fusions, include_filtered: bool) -> (usize, Vec<String>) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fusions.tsv");
        let annotation = annotation();

        let mut writer = FusionWriter::create(&path).unwrap();
        let n = writer
            .write_fusions(fusions, &annotation, include_filtered)
            .unwrap();
        writer.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        (n, content.lines().map(str::to_string).collect())
    }

    #[test]
    fn test_write_translocation() {
        let annotation = annotation();
        let f = fusion(&annotation, 133_729_450);
        let fusions: Fusions = [(f.key(), f)].into_iter().collect();

        let (n, lines) = write(&fusions, false);
        assert_eq!(n, 1);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("#gene1"));

        let fields: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(fields.len(), 19);
        assert_eq!(fields[0], "ABL1");
        assert_eq!(fields[1], "BCR");
        assert_eq!(fields[2], "+/+");
        assert_eq!(fields[4], "chr9:133729450");
        assert_eq!(fields[5], "chr22:23632600");
        assert_eq!(fields[6], "upstream");
        assert_eq!(fields[7], "downstream");
        assert_eq!(fields[8], "exon");
        assert_eq!(fields[9], "splice-site");
        assert_eq!(fields[10], "translocation");
        assert_eq!(fields[11], "3");
        assert_eq!(fields[13], "2");
        assert_eq!(fields[14], "133729600");
        assert_eq!(fields[15], ".");
        assert_eq!(fields[16], "gene2");
        assert_eq!(fields[17], ".");
        assert_eq!(fields[18], ".");
    }

    #[test]
    fn test_filtered_and_ordering() {
        let annotation = annotation();
        let late = fusion(&annotation, 200_000);
        let early = fusion(&annotation, 100_000);
        let mut filtered = fusion(&annotation, 150_000);
        filtered.filter = Some(Filter::Duplicates);
        filtered.predicted_strands_ambiguous = true;
        filtered.transcript_start_ambiguous = true;

        let fusions: Fusions = [late, early, filtered]
            .into_iter()
            .map(|f| (f.key(), f))
            .collect();

        let (n, lines) = write(&fusions, false);
        assert_eq!(n, 2);
        assert!(lines[1].contains("chr9:100000"));
        assert!(lines[2].contains("chr9:200000"));

        let (n, lines) = write(&fusions, true);
        assert_eq!(n, 3);
        let fields: Vec<&str> = lines[2].split('\t').collect();
        assert_eq!(fields[4], "chr9:150000");
        assert_eq!(fields[2], "+/.");
        assert_eq!(fields[16], ".");
        assert_eq!(fields[17], "duplicates");
    }

    #[test]
    fn test_event_types() {
        let annotation = annotation();
        let mut f = fusion(&annotation, 1_000);
        f.contig2 = 0;
        f.breakpoint2 = 5_000;
        assert_eq!(event_type(&f), "duplication");

        f.direction1 = Direction::Downstream;
        f.direction2 = Direction::Upstream;
        assert_eq!(event_type(&f), "deletion/read-through");

        f.breakpoint2 = 1_000_000;
        assert_eq!(event_type(&f), "deletion");

        f.direction2 = Direction::Downstream;
        assert_eq!(event_type(&f), "inversion");
    }
}
