//! Gene annotation and splice-site lookup
//!
//! This module handles:
//! - GTF file parsing for gene/transcript/exon annotations
//! - Contig and gene name registries shared with the input reader
//! - The breakpoint-is-spliced query used by transcript start prediction

mod gtf;

pub use gtf::open_text;

use crate::chimeric::{ContigId, Direction, Gene, GeneId, Position, Strand};
use crate::error::Error;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Query answering whether a breakpoint coincides with an annotated exon boundary
pub trait SpliceSiteLookup {
    fn is_breakpoint_spliced(
        &self,
        gene: Gene,
        direction: Direction,
        contig: ContigId,
        breakpoint: Position,
    ) -> bool;
}

/// Key for splice site lookup
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
struct SpliceSiteKey {
    gene: GeneId,
    direction: Direction,
    contig: ContigId,
    position: Position,
}

/// Gene name and orientation
#[derive(Debug, Clone)]
pub struct GeneInfo {
    pub name: String,
    pub strand: Strand,
}

/// Contigs, genes and exon boundaries
#[derive(Debug, Default)]
pub struct GeneAnnotation {
    contig_names: Vec<String>,
    contig_index: HashMap<String, ContigId>,
    genes: Vec<GeneInfo>,
    gene_index: HashMap<String, GeneId>,
    splice_sites: HashSet<SpliceSiteKey>,
}

impl GeneAnnotation {
    /// Create empty annotation (no-GTF mode)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build annotation from GTF file
    pub fn from_gtf(gtf_path: &Path) -> Result<Self, Error> {
        log::info!("Loading GTF annotations from: {}", gtf_path.display());

        let exons = gtf::parse_gtf(gtf_path)?;
        log::debug!("Parsed {} exon features from GTF", exons.len());

        let mut annotation = Self::empty();

        // Genes and contigs get ids in order of first appearance
        for exon in &exons {
            annotation.contig_or_insert(&exon.seqname);
            let Some(gene_id) = exon.gene_id() else {
                continue;
            };
            if annotation.gene_index.contains_key(gene_id) {
                continue;
            }
            match Strand::from_symbol(exon.strand) {
                Some(strand) => {
                    annotation.gene_or_insert(gene_id, strand);
                }
                None => log::warn!("Skipping gene without strand: {}", gene_id),
            }
        }

        for boundary in gtf::extract_exon_boundaries(&exons) {
            let Some(gene) = annotation.gene(&boundary.gene_id) else {
                continue;
            };
            let contig = annotation.contig_or_insert(&boundary.seqname);
            annotation.add_splice_site(gene, Direction::Downstream, contig, boundary.exon_end);
            annotation.add_splice_site(
                gene,
                Direction::Upstream,
                contig,
                boundary.next_exon_start,
            );
        }

        log::info!(
            "Loaded {} genes and {} splice sites on {} contigs",
            annotation.genes.len(),
            annotation.splice_sites.len(),
            annotation.contig_names.len()
        );

        Ok(annotation)
    }

    pub fn contig_id(&self, name: &str) -> Option<ContigId> {
        self.contig_index.get(name).copied()
    }

    /// Look up a contig, registering it when unseen
    pub fn contig_or_insert(&mut self, name: &str) -> ContigId {
        if let Some(id) = self.contig_index.get(name) {
            return *id;
        }
        let id = self.contig_names.len() as ContigId;
        self.contig_names.push(name.to_string());
        self.contig_index.insert(name.to_string(), id);
        id
    }

    pub fn contig_name(&self, contig: ContigId) -> &str {
        self.contig_names
            .get(contig as usize)
            .map(String::as_str)
            .unwrap_or("?")
    }

    pub fn gene(&self, name: &str) -> Option<Gene> {
        self.gene_index.get(name).map(|&id| Gene {
            id,
            strand: self.genes[id.0 as usize].strand,
        })
    }

    /// Look up a gene, registering it with `strand` when unseen
    ///
    /// An already known gene keeps its annotated strand.
    pub fn gene_or_insert(&mut self, name: &str, strand: Strand) -> Gene {
        if let Some(gene) = self.gene(name) {
            return gene;
        }
        let id = GeneId(self.genes.len() as u32);
        self.genes.push(GeneInfo {
            name: name.to_string(),
            strand,
        });
        self.gene_index.insert(name.to_string(), id);
        Gene { id, strand }
    }

    pub fn gene_name(&self, gene: GeneId) -> &str {
        self.genes
            .get(gene.0 as usize)
            .map(|g| g.name.as_str())
            .unwrap_or("?")
    }

    pub fn add_splice_site(
        &mut self,
        gene: Gene,
        direction: Direction,
        contig: ContigId,
        position: Position,
    ) {
        self.splice_sites.insert(SpliceSiteKey {
            gene: gene.id,
            direction,
            contig,
            position,
        });
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn n_splice_sites(&self) -> usize {
        self.splice_sites.len()
    }
}

impl SpliceSiteLookup for GeneAnnotation {
    fn is_breakpoint_spliced(
        &self,
        gene: Gene,
        direction: Direction,
        contig: ContigId,
        breakpoint: Position,
    ) -> bool {
        self.splice_sites.contains(&SpliceSiteKey {
            gene: gene.id,
            direction,
            contig,
            position: breakpoint,
        })
    }
}
