//! Fusion calling statistics tracking and reporting
use crate::chimeric::GroupKind;
use crate::fusion::Fusion;
use log::info;

/// Tracks input groups and called fusions for one run
#[derive(Default, Debug)]
pub struct FusionStats {
    /// Total number of chimeric alignment groups
    pub groups: u64,
    /// Groups with a split read
    pub split_read_groups: u64,
    /// Groups with a discordant mate pair
    pub discordant_mate_groups: u64,
    /// Groups with neither 2 nor 3 alignments
    pub malformed_groups: u64,
    /// Fusions called, filtered ones included
    pub fusions: u64,
    /// Fusions whose discordant mate scan stopped at the cap
    pub subsampled_fusions: usize,
    /// Fusions without a filter
    pub remaining: u64,
}

impl FusionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one chimeric alignment group by its shape
    pub fn record_group(&mut self, kind: Option<GroupKind>) {
        self.groups += 1;
        match kind {
            Some(GroupKind::SplitRead) => self.split_read_groups += 1,
            Some(GroupKind::DiscordantMates) => self.discordant_mate_groups += 1,
            None => self.malformed_groups += 1,
        }
    }

    /// Record a fusion after all calling stages ran
    pub fn record_fusion(&mut self, fusion: &Fusion) {
        self.fusions += 1;
        if fusion.filter.is_none() {
            self.remaining += 1;
        }
    }

    /// Print summary statistics to log
    pub fn print_summary(&self) {
        if self.groups == 0 {
            info!("No chimeric alignments processed");
            return;
        }

        info!("=== Fusion Summary ===");
        info!("Chimeric alignment groups: {}", self.groups);
        info!("Split reads: {}", self.split_read_groups);
        info!("Discordant mates: {}", self.discordant_mate_groups);
        if self.malformed_groups > 0 {
            info!("Malformed groups: {}", self.malformed_groups);
        }
        info!("Candidate fusions: {}", self.fusions);
        if self.subsampled_fusions > 0 {
            info!("Subsampled fusions: {}", self.subsampled_fusions);
        }
        info!(
            "Unfiltered fusions: {} ({:.2}%)",
            self.remaining,
            self.remaining_percent()
        );
    }

    /// Percentage of candidate fusions that passed all filters
    pub fn remaining_percent(&self) -> f64 {
        if self.fusions == 0 {
            0.0
        } else {
            100.0 * self.remaining as f64 / self.fusions as f64
        }
    }
}
