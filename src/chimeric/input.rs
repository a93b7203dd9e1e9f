// Reader for tab-separated chimeric alignment tables
//
// One line per alignment record; the lines of a group are contiguous:
// group  filter  role  contig  start  end  strand  predicted_strand  exonic  genes

use crate::annotation::{open_text, GeneAnnotation};
use crate::chimeric::{AlignmentRecord, ChimericAlignmentGroup, Filter, Gene, Position, Strand};
use crate::error::Error;
use std::io::BufRead;
use std::path::Path;

const N_COLUMNS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Role {
    Mate1,
    Mate2,
    SplitRead,
    Supplementary,
}

impl Role {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "mate1" => Some(Self::Mate1),
            "mate2" => Some(Self::Mate2),
            "split_read" => Some(Self::SplitRead),
            "supplementary" => Some(Self::Supplementary),
            _ => None,
        }
    }
}

/// Alignment lines of one group, collected until the group name changes
struct PendingGroup {
    name: String,
    filter: Option<Filter>,
    first_line: usize,
    records: Vec<(Role, AlignmentRecord)>,
}

impl PendingGroup {
    fn finish(mut self) -> Result<ChimericAlignmentGroup, Error> {
        self.records.sort_by_key(|(role, _)| *role);
        let roles: Vec<Role> = self.records.iter().map(|(role, _)| *role).collect();
        let records: Vec<AlignmentRecord> =
            self.records.into_iter().map(|(_, record)| record).collect();

        let group = match (roles.as_slice(), records.as_slice()) {
            ([Role::Mate1, Role::Mate2], [mate1, mate2]) => {
                ChimericAlignmentGroup::discordant_mates(self.name, mate1.clone(), mate2.clone())
            }
            (
                [Role::Mate1, Role::SplitRead, Role::Supplementary],
                [mate1, split, supplementary],
            ) => ChimericAlignmentGroup::split_read(
                self.name,
                mate1.clone(),
                split.clone(),
                supplementary.clone(),
            ),
            _ => {
                return Err(Error::Input(format!(
                    "Group '{}' at line {} has roles {:?}, expected mate1+mate2 or mate1+split_read+supplementary",
                    self.name, self.first_line, roles
                )))
            }
        };

        Ok(group.with_filter(self.filter))
    }
}

/// Read all chimeric alignment groups from a table (plain or gzipped)
///
/// Contigs and genes not yet known to `annotation` are registered in order
/// of first appearance.
pub fn read_chimeric_alignments(
    path: &Path,
    annotation: &mut GeneAnnotation,
) -> Result<Vec<ChimericAlignmentGroup>, Error> {
    let reader = open_text(path)?;
    let groups = parse_chimeric_alignments(reader, annotation)?;
    log::info!(
        "Read {} chimeric alignment groups from {}",
        groups.len(),
        path.display()
    );
    Ok(groups)
}

fn parse_chimeric_alignments<R: BufRead>(
    reader: R,
    annotation: &mut GeneAnnotation,
) -> Result<Vec<ChimericAlignmentGroup>, Error> {
    let mut groups = Vec::new();
    let mut pending: Option<PendingGroup> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_num = idx + 1;
        let line =
            line.map_err(|e| Error::Input(format!("Failed to read line {}: {}", line_num, e)))?;

        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != N_COLUMNS {
            return Err(Error::Input(format!(
                "Line {}: expected {} columns, found {}",
                line_num,
                N_COLUMNS,
                fields.len()
            )));
        }

        let name = fields[0];
        let filter = parse_filter(fields[1], line_num)?;
        let role = Role::parse(fields[2]).ok_or_else(|| {
            Error::Input(format!("Line {}: unknown role '{}'", line_num, fields[2]))
        })?;
        let record = parse_record(&fields[3..], line_num, annotation)?.with_filter(filter);

        match pending.as_mut() {
            Some(group) if group.name == name => {
                if group.filter != filter {
                    return Err(Error::Input(format!(
                        "Line {}: filter differs from the rest of group '{}'",
                        line_num, name
                    )));
                }
                group.records.push((role, record));
            }
            _ => {
                if let Some(done) = pending.take() {
                    groups.push(done.finish()?);
                }
                pending = Some(PendingGroup {
                    name: name.to_string(),
                    filter,
                    first_line: line_num,
                    records: vec![(role, record)],
                });
            }
        }
    }

    if let Some(done) = pending {
        groups.push(done.finish()?);
    }

    Ok(groups)
}

fn parse_filter(s: &str, line_num: usize) -> Result<Option<Filter>, Error> {
    if s == "." {
        return Ok(None);
    }
    s.parse::<Filter>()
        .map(Some)
        .map_err(|e| Error::Input(format!("Line {}: {}", line_num, e)))
}

fn parse_strand(s: &str, line_num: usize) -> Result<Strand, Error> {
    let mut chars = s.chars();
    match (chars.next().and_then(Strand::from_symbol), chars.next()) {
        (Some(strand), None) => Ok(strand),
        _ => Err(Error::Input(format!(
            "Line {}: invalid strand '{}'",
            line_num, s
        ))),
    }
}

fn parse_position(s: &str, column: &str, line_num: usize) -> Result<Position, Error> {
    s.parse::<Position>().map_err(|_| {
        Error::Input(format!(
            "Line {}: invalid {} '{}'",
            line_num, column, s
        ))
    })
}

/// Parse contig through genes
fn parse_record(
    fields: &[&str],
    line_num: usize,
    annotation: &mut GeneAnnotation,
) -> Result<AlignmentRecord, Error> {
    let contig = annotation.contig_or_insert(fields[0]);
    let start = parse_position(fields[1], "start", line_num)?;
    let end = parse_position(fields[2], "end", line_num)?;
    if end < start {
        return Err(Error::Input(format!(
            "Line {}: end {} before start {}",
            line_num, end, start
        )));
    }
    let strand = parse_strand(fields[3], line_num)?;
    let predicted_strand = match fields[4] {
        "." => None,
        s => Some(parse_strand(s, line_num)?),
    };
    let exonic = match fields[5] {
        "0" => false,
        "1" => true,
        s => {
            return Err(Error::Input(format!(
                "Line {}: exonic must be 0 or 1, found '{}'",
                line_num, s
            )))
        }
    };
    let genes = parse_genes(fields[6], line_num, annotation)?;

    Ok(AlignmentRecord::new(contig, start, end, strand)
        .with_predicted_strand(predicted_strand)
        .with_exonic(exonic)
        .with_genes(genes))
}

/// Parse `gene_id:strand` tokens, or bare gene ids known to the annotation
fn parse_genes(
    s: &str,
    line_num: usize,
    annotation: &mut GeneAnnotation,
) -> Result<Vec<Gene>, Error> {
    if s == "." {
        return Ok(Vec::new());
    }

    s.split(',')
        .map(|token| match token.rsplit_once(':') {
            Some((name, strand)) if !name.is_empty() => {
                let strand = parse_strand(strand, line_num)?;
                Ok(annotation.gene_or_insert(name, strand))
            }
            _ => annotation.gene(token).ok_or_else(|| {
                Error::Input(format!(
                    "Line {}: gene '{}' is not annotated and has no strand",
                    line_num, token
                ))
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chimeric::{Direction, GroupKind, SPLIT_READ, SUPPLEMENTARY};
    use std::fs::File;
    use std::io::{Cursor, Write};

    const TABLE: &str = "\
# group\tfilter\trole\tcontig\tstart\tend\tstrand\tpredicted_strand\texonic\tgenes
r1\t.\tmate1\tchr9\t1000\t1100\t+\t+\t1\tABL1:+
r1\t.\tsupplementary\tchr22\t5000\t5040\t-\t.\t0\tBCR:+
r1\t.\tsplit_read\tchr9\t1140\t1200\t-\t-\t1\tABL1:+
p1\tduplicates\tmate1\tchr9\t900\t999\t+\t+\t1\tABL1:+
p1\tduplicates\tmate2\tchr22\t5100\t5199\t-\t-\t1\tBCR:+,NEAR:-
";

    fn parse(table: &str, annotation: &mut GeneAnnotation) -> Result<Vec<ChimericAlignmentGroup>, Error> {
        parse_chimeric_alignments(Cursor::new(table), annotation)
    }

    #[test]
    fn test_parse_groups() {
        let mut annotation = GeneAnnotation::empty();
        let groups = parse(TABLE, &mut annotation).unwrap();
        assert_eq!(groups.len(), 2);

        let split = &groups[0];
        assert_eq!(split.name, "r1");
        assert_eq!(split.kind(), Some(GroupKind::SplitRead));
        assert!(!split.is_filtered());
        assert!(split.alignments.iter().all(|a| a.filter.is_none()));
        // Roles are reordered
        assert_eq!(split.alignments[SPLIT_READ].start, 1140);
        assert_eq!(split.alignments[SUPPLEMENTARY].start, 5000);
        assert!(split.supplementary().predicted_strand_ambiguous);
        assert!(!split.supplementary().exonic);
        assert_eq!(split.split_segment().mate_direction(), Direction::Upstream);

        let pair = &groups[1];
        assert_eq!(pair.kind(), Some(GroupKind::DiscordantMates));
        assert_eq!(pair.filter, Some(Filter::Duplicates));
        assert_eq!(pair.mate1().filter, Some(Filter::Duplicates));
        assert_eq!(pair.mate2().filter, Some(Filter::Duplicates));
        assert_eq!(pair.mate2().genes.len(), 2);
        assert_eq!(pair.mate2().genes[1].strand, Strand::Reverse);

        assert_eq!(annotation.contig_id("chr9"), Some(0));
        assert_eq!(annotation.contig_id("chr22"), Some(1));
        assert_eq!(annotation.n_genes(), 3);
    }

    #[test]
    fn test_bare_gene_ids_resolve_against_annotation() {
        let mut annotation = GeneAnnotation::empty();
        let abl1 = annotation.gene_or_insert("ABL1", Strand::Reverse);

        let table = "p\t.\tmate1\tchr9\t1\t100\t+\t.\t1\tABL1\n\
                     p\t.\tmate2\tchr9\t500\t600\t-\t.\t1\t.\n";
        let groups = parse(table, &mut annotation).unwrap();
        assert_eq!(groups[0].mate1().genes, vec![abl1]);
        assert!(groups[0].mate2().genes.is_empty());

        let unknown = "p\t.\tmate1\tchr9\t1\t100\t+\t.\t1\tXYZ\n";
        assert!(matches!(parse(unknown, &mut annotation), Err(Error::Input(_))));
    }

    #[test]
    fn test_annotated_gene_keeps_strand() {
        let mut annotation = GeneAnnotation::empty();
        annotation.gene_or_insert("ABL1", Strand::Forward);
        let table = "p\t.\tmate1\tchr9\t1\t100\t+\t.\t1\tABL1:-\n\
                     p\t.\tmate2\tchr9\t500\t600\t-\t.\t1\tABL1:-\n";
        let groups = parse(table, &mut annotation).unwrap();
        assert_eq!(groups[0].mate1().genes[0].strand, Strand::Forward);
    }

    #[test]
    fn test_invalid_role_combination() {
        let mut annotation = GeneAnnotation::empty();
        let table = "p\t.\tmate1\tchr9\t1\t100\t+\t.\t1\t.\n\
                     p\t.\tsplit_read\tchr9\t500\t600\t-\t.\t1\t.\n";
        match parse(table, &mut annotation) {
            Err(Error::Input(msg)) => assert!(msg.contains("line 1")),
            other => panic!("expected input error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_lines() {
        let mut annotation = GeneAnnotation::empty();
        let cases = [
            "p\t.\tmate1\tchr9\t1\t100\t+\t.\t1\n",
            "p\t.\tmate3\tchr9\t1\t100\t+\t.\t1\t.\n",
            "p\t.\tmate1\tchr9\tx\t100\t+\t.\t1\t.\n",
            "p\t.\tmate1\tchr9\t200\t100\t+\t.\t1\t.\n",
            "p\t.\tmate1\tchr9\t1\t100\t*\t.\t1\t.\n",
            "p\t.\tmate1\tchr9\t1\t100\t+\t.\t2\t.\n",
            "p\tbogus\tmate1\tchr9\t1\t100\t+\t.\t1\t.\n",
        ];
        for table in cases {
            assert!(
                matches!(parse(table, &mut annotation), Err(Error::Input(_))),
                "accepted: {table:?}"
            );
        }
    }

    #[test]
    fn test_inconsistent_group_filter() {
        let mut annotation = GeneAnnotation::empty();
        let table = "p\t.\tmate1\tchr9\t1\t100\t+\t.\t1\t.\n\
                     p\thairpin\tmate2\tchr9\t500\t600\t-\t.\t1\t.\n";
        assert!(matches!(parse(table, &mut annotation), Err(Error::Input(_))));
    }

    #[test]
    fn test_read_gzipped_table() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chimeric.tsv.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(TABLE.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let mut annotation = GeneAnnotation::empty();
        let groups = read_chimeric_alignments(&path, &mut annotation).unwrap();
        assert_eq!(groups.len(), 2);
    }
}
