use std::path::PathBuf;

use clap::Parser;

use crate::chimeric::Position;

/// rufusion command-line parameters, using `--camelCase` argument names.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rufusion",
    about = "Gene fusion caller for chimeric RNA-seq alignments",
    version
)]
pub struct Parameters {
    // ── Input ───────────────────────────────────────────────────────────
    /// Chimeric alignment table (plain or gzipped)
    #[arg(long = "chimericIn")]
    pub chimeric_in: PathBuf,

    /// Gene annotation in GTF format (plain or gzipped)
    #[arg(long = "annotationGTF")]
    pub annotation_gtf: Option<PathBuf>,

    // ── Output ──────────────────────────────────────────────────────────
    /// Fusion table to write
    #[arg(long = "outFusions", default_value = "fusions.tsv")]
    pub out_fusions: PathBuf,

    /// Also write fusions removed by a filter
    #[arg(long = "reportFiltered")]
    pub report_filtered: bool,

    // ── Fusion calling ──────────────────────────────────────────────────
    /// Bases a discordant mate may extend past a breakpoint without split read support
    #[arg(long = "maxMateGap", default_value_t = 200, allow_hyphen_values = true)]
    pub max_mate_gap: Position,
}

impl Parameters {
    /// Validate parameter combinations.
    pub fn validate(&self) -> Result<(), crate::error::Error> {
        if self.max_mate_gap < 0 {
            return Err(crate::error::Error::Parameter(format!(
                "--maxMateGap must be >= 0, got {}",
                self.max_mate_gap
            )));
        }

        Ok(())
    }
}
