use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::data::Sources;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Terminal dashboard for food-security indicators across East Africa", long_about = None)]
pub struct Cli {
    /// Directory holding the tables and the geometry file.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,
    /// Primary observation table (IPC phase and `_sm` columns).
    #[arg(long, default_value = "fsc_with_soil_moisture.csv")]
    pub primary: PathBuf,
    /// Conflict event counts keyed by `int_id`.
    #[arg(long, default_value = "conflict_counts_by_fsc.csv")]
    pub conflict: PathBuf,
    /// Fatality counts keyed by `int_id`.
    #[arg(long, default_value = "fatality_counts_by_fsc.csv")]
    pub fatality: PathBuf,
    /// FeatureCollection of unit boundaries, in primary-table row order.
    #[arg(long, default_value = "fsc_aggregated.geojson")]
    pub geometry: PathBuf,
    /// Milliseconds between animation steps.
    #[arg(long, default_value_t = 800)]
    pub interval_ms: u64,
    /// Quiet period before a slider burst is applied.
    #[arg(long, default_value_t = 50)]
    pub debounce_ms: u64,
    /// Duration of eased recolors and marker moves.
    #[arg(long, default_value_t = 300)]
    pub transition_ms: u64,
    /// Log destination; the terminal itself is owned by the UI.
    #[arg(long, default_value = "fsc-dash.log")]
    pub log_file: PathBuf,
}

impl Cli {
    /// Resource paths, relative names resolved against `data_dir`
    pub fn sources(&self) -> Sources {
        let resolve = |name: &PathBuf| self.data_dir.join(name);
        Sources {
            primary: resolve(&self.primary),
            conflict: resolve(&self.conflict),
            fatality: resolve(&self.fatality),
            geometry: resolve(&self.geometry),
        }
    }

    pub fn timing(&self) -> Timing {
        Timing {
            interval: Duration::from_millis(self.interval_ms),
            debounce: Duration::from_millis(self.debounce_ms),
            transition: Duration::from_millis(self.transition_ms),
        }
    }
}

/// Cadences of the animated parts of the UI
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    pub interval: Duration,
    pub debounce: Duration,
    pub transition: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(800),
            debounce: Duration::from_millis(50),
            transition: Duration::from_millis(300),
        }
    }
}
