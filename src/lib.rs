pub mod annotation;
pub mod chimeric;
pub mod error;
pub mod fusion;
pub mod params;
pub mod stats;

use anyhow::Context;
use log::info;

use crate::annotation::GeneAnnotation;
use crate::chimeric::read_chimeric_alignments;
use crate::fusion::{find_fusions, FusionWriter};
use crate::params::Parameters;
use crate::stats::FusionStats;

/// Top-level driver. Called from `main()` after CLI parsing.
pub fn run(params: &Parameters) -> anyhow::Result<()> {
    params.validate()?;

    info!("rufusion v{}", env!("CARGO_PKG_VERSION"));
    info!("chimericIn: {}", params.chimeric_in.display());
    info!("maxMateGap: {}", params.max_mate_gap);

    let stats = call_fusions(params)?;
    stats.print_summary();

    info!("Fusion calling complete!");
    Ok(())
}

fn call_fusions(params: &Parameters) -> anyhow::Result<FusionStats> {
    let mut annotation = match &params.annotation_gtf {
        Some(gtf) => {
            info!("annotationGTF: {}", gtf.display());
            GeneAnnotation::from_gtf(gtf)
                .with_context(|| format!("loading annotation {}", gtf.display()))?
        }
        None => {
            info!("No annotation given, no breakpoint will be reported as spliced");
            GeneAnnotation::empty()
        }
    };

    let groups = read_chimeric_alignments(&params.chimeric_in, &mut annotation)
        .with_context(|| format!("reading {}", params.chimeric_in.display()))?;

    let (fusions, stats) = find_fusions(&groups, &annotation, params.max_mate_gap);
    info!(
        "Called {} fusions, {} unfiltered",
        stats.fusions, stats.remaining
    );

    info!("Writing fusions to {}...", params.out_fusions.display());
    let mut writer = FusionWriter::create(&params.out_fusions)?;
    let n_written = writer.write_fusions(&fusions, &annotation, params.report_filtered)?;
    writer.flush()?;
    log::debug!("Wrote {} fusion rows", n_written);

    Ok(stats)
}
