use std::path::PathBuf;

use bizdash_core::{generate_snapshot, save_snapshot, Snapshot};
use chrono::{NaiveDate, Utc};
use clap::Subcommand;

/// Sub-commands available under `snapshot`.
#[derive(Debug, Subcommand)]
pub enum SnapshotCommands {
    /// Write a synthetic demo snapshot
    Generate {
        /// Number of days of metrics per location
        #[arg(long, default_value = "90", value_parser = clap::value_parser!(u32).range(1..=3660))]
        days: u32,
        /// Last day covered (defaults to yesterday)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Seed for the random generator; the same seed yields the same file
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Output YAML path
        #[arg(long)]
        out: PathBuf,
    },
}

/// # Errors
///
/// Returns an error if the generated snapshot fails validation or cannot
/// be written.
pub(crate) fn run_snapshot(command: SnapshotCommands) -> anyhow::Result<()> {
    match command {
        SnapshotCommands::Generate {
            days,
            end,
            seed,
            out,
        } => {
            let end = end.unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(1));
            let file = generate_snapshot(end, days, seed);
            // Only validated snapshots are written.
            let snapshot = Snapshot::from_file(file.clone())?;
            save_snapshot(&file, &out)?;
            println!(
                "wrote {} ({} locations, {} metric rows, {} reviews, ending {end})",
                out.display(),
                snapshot.locations.len(),
                snapshot.metrics.len(),
                snapshot.reviews.len()
            );
            Ok(())
        }
    }
}
