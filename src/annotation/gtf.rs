//! GTF file parsing for gene annotations
//!
//! Supports standard GTF format (tab-separated, 9 columns):
//! 1. seqname (chromosome)
//! 2. source (ignored)
//! 3. feature (gene, transcript, exon, etc.)
//! 4. start (1-based inclusive)
//! 5. end (1-based inclusive)
//! 6. score (ignored)
//! 7. strand (+, -, .)
//! 8. frame (ignored)
//! 9. attributes (semicolon-separated key-value pairs)
//!
//! Plain and gzip-compressed files are accepted.
use crate::chimeric::Position;
use crate::error::Error;
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// GTF record (single line)
#[derive(Debug, Clone)]
pub struct GtfRecord {
    pub seqname: String,
    pub feature: String,
    pub start: Position,
    pub end: Position,
    pub strand: char,
    pub attributes: HashMap<String, String>,
}

impl GtfRecord {
    pub fn gene_id(&self) -> Option<&str> {
        self.attributes.get("gene_id").map(String::as_str)
    }

    pub fn transcript_id(&self) -> Option<&str> {
        self.attributes.get("transcript_id").map(String::as_str)
    }
}

/// Exon boundary adjacent to an annotated intron
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExonBoundary {
    pub gene_id: String,
    pub seqname: String,
    /// Last base of the exon before the intron
    pub exon_end: Position,
    /// First base of the exon after the intron
    pub next_exon_start: Position,
}

/// Open a text file, transparently decompressing `.gz`
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead>, Error> {
    let path_str = path.to_string_lossy();
    let is_gzipped = path_str.ends_with(".gz") || path_str.ends_with(".gzip");

    let file = File::open(path).map_err(|e| Error::io(e, path))?;

    if is_gzipped {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parse GTF file and extract exon features
///
/// Returns only records with feature == "exon", in file order
pub fn parse_gtf(path: &Path) -> Result<Vec<GtfRecord>, Error> {
    let reader = open_text(path)
        .map_err(|e| Error::Gtf(format!("Failed to open GTF file: {}", e)))?;

    let mut exons = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_num = idx + 1;
        let line =
            line.map_err(|e| Error::Gtf(format!("Failed to read line {}: {}", line_num, e)))?;

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_gtf_line(line) {
            Ok(record) => {
                if record.feature.eq_ignore_ascii_case("exon") {
                    exons.push(record);
                }
            }
            Err(e) => {
                log::warn!("Skipping malformed GTF line {}: {}", line_num, e);
                continue;
            }
        }
    }

    Ok(exons)
}

/// Parse a single GTF line
fn parse_gtf_line(line: &str) -> Result<GtfRecord, Error> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() < 9 {
        return Err(Error::Gtf(format!(
            "GTF line has {} fields, expected 9",
            fields.len()
        )));
    }

    let start = fields[3]
        .parse::<Position>()
        .map_err(|e| Error::Gtf(format!("Invalid start position: {}", e)))?;
    let end = fields[4]
        .parse::<Position>()
        .map_err(|e| Error::Gtf(format!("Invalid end position: {}", e)))?;
    let strand = fields[6]
        .chars()
        .next()
        .ok_or_else(|| Error::Gtf("Empty strand field".to_string()))?;

    Ok(GtfRecord {
        seqname: fields[0].to_string(),
        feature: fields[2].to_string(),
        start,
        end,
        strand,
        attributes: parse_attributes(fields[8]),
    })
}

/// Parse GTF attributes field
///
/// Format: key1 "value1"; key2 "value2";
fn parse_attributes(attr_str: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();

    for pair in attr_str.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }

        // Split on first space to separate key and value
        let Some((key, value)) = pair.split_once(' ') else {
            continue;
        };

        attributes.insert(
            key.trim().to_string(),
            value.trim().trim_matches('"').to_string(),
        );
    }

    attributes
}

/// Extract exon boundaries flanking introns
///
/// Groups exons by transcript_id, sorts them by position, and reports one
/// boundary pair per pair of consecutive exons.
///
/// Exons without a transcript_id are skipped with a warning.
pub fn extract_exon_boundaries(exons: &[GtfRecord]) -> Vec<ExonBoundary> {
    let mut transcripts: HashMap<&str, Vec<&GtfRecord>> = HashMap::new();

    for exon in exons {
        let Some(transcript_id) = exon.transcript_id() else {
            log::warn!(
                "Skipping exon without transcript_id at {}:{}-{}",
                exon.seqname,
                exon.start,
                exon.end
            );
            continue;
        };
        transcripts.entry(transcript_id).or_default().push(exon);
    }

    let mut boundaries = Vec::new();

    for (transcript_id, mut exons) in transcripts {
        if exons.len() < 2 {
            continue;
        }

        let Some(gene_id) = exons[0].gene_id() else {
            log::warn!("Skipping transcript without gene_id: {}", transcript_id);
            continue;
        };

        exons.sort_by_key(|e| e.start);

        for pair in exons.windows(2) {
            let (exon1, exon2) = (pair[0], pair[1]);

            if exon2.start <= exon1.end + 1 {
                log::warn!(
                    "Invalid intron between {}-{} and {}-{} in {} (possibly overlapping exons)",
                    exon1.start,
                    exon1.end,
                    exon2.start,
                    exon2.end,
                    transcript_id
                );
                continue;
            }

            boundaries.push(ExonBoundary {
                gene_id: gene_id.to_string(),
                seqname: exon1.seqname.clone(),
                exon_end: exon1.end,
                next_exon_start: exon2.start,
            });
        }
    }

    // Same intron can appear in multiple transcripts
    boundaries.sort_unstable();
    boundaries.dedup();

    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn exon(gene: &str, transcript: &str, start: Position, end: Position) -> GtfRecord {
        GtfRecord {
            seqname: "chr1".to_string(),
            feature: "exon".to_string(),
            start,
            end,
            strand: '+',
            attributes: vec![
                ("gene_id".to_string(), gene.to_string()),
                ("transcript_id".to_string(), transcript.to_string()),
            ]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn test_parse_attributes() {
        let attr = r#"gene_id "ENSG001"; transcript_id "ENST001"; gene_name "MYC";"#;
        let attrs = parse_attributes(attr);

        assert_eq!(attrs.get("gene_id"), Some(&"ENSG001".to_string()));
        assert_eq!(attrs.get("transcript_id"), Some(&"ENST001".to_string()));
        assert_eq!(attrs.get("gene_name"), Some(&"MYC".to_string()));
    }

    #[test]
    fn test_parse_gtf_line_valid() {
        let line = "chr1\ttest\texon\t100\t200\t.\t-\t.\tgene_id \"G1\"; transcript_id \"T1\";";
        let record = parse_gtf_line(line).unwrap();

        assert_eq!(record.seqname, "chr1");
        assert_eq!(record.start, 100);
        assert_eq!(record.end, 200);
        assert_eq!(record.strand, '-');
        assert_eq!(record.gene_id(), Some("G1"));
        assert_eq!(record.transcript_id(), Some("T1"));
    }

    #[test]
    fn test_parse_gtf_line_invalid_columns() {
        assert!(parse_gtf_line("chr1\ttest\texon").is_err());
        assert!(parse_gtf_line("chr1\tt\texon\tx\t200\t.\t+\t.\tgene_id \"G1\";").is_err());
    }

    #[test]
    fn test_parse_gtf_skips_comments_and_non_exons() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# header").unwrap();
        writeln!(file, "chr1\ttest\tgene\t50\t300\t.\t+\t.\tgene_id \"G1\";").unwrap();
        writeln!(
            file,
            "chr1\ttest\texon\t100\t200\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";"
        )
        .unwrap();
        writeln!(file, "chr1\tbroken").unwrap();

        let exons = parse_gtf(file.path()).unwrap();
        assert_eq!(exons.len(), 1);
        assert_eq!(exons[0].feature, "exon");
    }

    #[test]
    fn test_parse_gzipped_gtf() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.gtf.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        writeln!(
            encoder,
            "chr1\ttest\texon\t100\t200\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";"
        )
        .unwrap();
        encoder.finish().unwrap();

        let exons = parse_gtf(&path).unwrap();
        assert_eq!(exons.len(), 1);
        assert_eq!(exons[0].end, 200);
    }

    #[test]
    fn test_exon_boundaries_shared_intron() {
        // Two transcripts sharing the intron 201-299
        let exons = vec![
            exon("G1", "T1", 300, 400),
            exon("G1", "T1", 100, 200),
            exon("G1", "T2", 100, 200),
            exon("G1", "T2", 300, 500),
        ];

        let boundaries = extract_exon_boundaries(&exons);
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].exon_end, 200);
        assert_eq!(boundaries[0].next_exon_start, 300);
        assert_eq!(boundaries[0].gene_id, "G1");
    }

    #[test]
    fn test_exon_boundaries_single_exon_transcript() {
        let exons = vec![exon("G1", "T1", 100, 200)];
        assert!(extract_exon_boundaries(&exons).is_empty());
    }

    #[test]
    fn test_exon_boundaries_missing_transcript_id() {
        let mut orphan = exon("G2", "T2", 5000, 5100);
        orphan.attributes.remove("transcript_id");
        let exons = vec![exon("G1", "T1", 100, 200), orphan, exon("G1", "T1", 300, 400)];

        let boundaries = extract_exon_boundaries(&exons);
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].gene_id, "G1");
        assert_eq!(boundaries[0].exon_end, 200);
        assert_eq!(boundaries[0].next_exon_start, 300);
    }
}
