//! Per-unit time-series chart: a primary indicator line against a secondary
//! line on its own vertical scale, with a cursor at the current period.

use ratatui::style::Color;

use crate::data::{is_missing, DataModel};
use crate::dataset::DatasetType;
use crate::resolve::reading;

/// Fixed vertical domain of the primary indicator
pub const PRIMARY_DOMAIN: (f64, f64) = (1.0, 5.0);
/// Fixed vertical domain of the vegetation / moisture proxy
pub const SECONDARY_DOMAIN: (f64, f64) = (-0.1, 0.2);

/// The right-hand series of the chart
#[derive(Clone, Debug, PartialEq)]
pub struct SecondarySeries {
    pub label: &'static str,
    pub color: Color,
    pub domain: (f64, f64),
    /// One entry per period, `None` marks a gap
    pub values: Vec<Option<f64>>,
}

impl SecondarySeries {
    /// Map a value from this series' domain onto the primary axis
    pub fn to_primary_axis(&self, value: f64) -> f64 {
        let (lo, hi) = self.domain;
        let span = if hi > lo { hi - lo } else { 1.0 };
        let (p_lo, p_hi) = PRIMARY_DOMAIN;
        p_lo + (value - lo) / span * (p_hi - p_lo)
    }

    /// Right-axis tick labels, bottom to top
    pub fn axis_labels(&self) -> [String; 3] {
        let (lo, hi) = self.domain;
        [
            format!("{lo:.2}"),
            format!("{:.2}", (lo + hi) / 2.0),
            format!("{hi:.2}"),
        ]
    }
}

/// A fully built chart for one unit under one dataset type
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesChart {
    pub unit: usize,
    pub unit_id: String,
    pub dataset: DatasetType,
    pub primary: Vec<Option<f64>>,
    /// Absent while the primary dataset type is active
    pub secondary: Option<SecondarySeries>,
}

impl SeriesChart {
    /// Contiguous runs of the primary line, as (period, value) points
    pub fn primary_segments(&self) -> Vec<Vec<(f64, f64)>> {
        segments(&self.primary, |v| v)
    }

    /// Contiguous runs of the secondary line, mapped onto the primary axis
    pub fn secondary_segments(&self) -> Vec<Vec<(f64, f64)>> {
        match &self.secondary {
            Some(series) => segments(&series.values, |v| series.to_primary_axis(v)),
            None => Vec::new(),
        }
    }
}

/// Build the chart for `unit` from scratch. Returns `None` for an index
/// outside the model.
pub fn build_series(model: &DataModel, dataset: DatasetType, unit: usize) -> Option<SeriesChart> {
    let u = model.units.get(unit)?;
    let periods = 0..model.timeline.len();

    let primary = periods
        .clone()
        .map(|p| {
            let v = reading(model, DatasetType::Primary, u, p);
            (!is_missing(v) && in_domain(v, PRIMARY_DOMAIN)).then_some(v)
        })
        .collect();

    let secondary = match dataset {
        DatasetType::Primary => None,
        DatasetType::Secondary => Some(SecondarySeries {
            label: dataset.label(),
            color: dataset.series_color(),
            domain: SECONDARY_DOMAIN,
            values: periods
                .map(|p| {
                    let v = reading(model, dataset, u, p);
                    (!is_missing(v) && in_domain(v, SECONDARY_DOMAIN)).then_some(v)
                })
                .collect(),
        }),
        DatasetType::Conflict | DatasetType::Fatality => {
            let max = match dataset {
                DatasetType::Conflict => model.conflict.max(),
                _ => model.fatality.max(),
            };
            Some(SecondarySeries {
                label: dataset.label(),
                color: dataset.series_color(),
                domain: (0.0, max),
                values: periods
                    .map(|p| {
                        let v = reading(model, dataset, u, p);
                        (!is_missing(v)).then_some(v)
                    })
                    .collect(),
            })
        }
    };

    Some(SeriesChart {
        unit,
        unit_id: u.row.id.clone(),
        dataset,
        primary,
        secondary,
    })
}

fn in_domain(v: f64, (lo, hi): (f64, f64)) -> bool {
    v >= lo && v <= hi
}

/// Split a gappy series into runs of consecutive defined points so the line
/// breaks across gaps instead of interpolating over them
pub fn segments(values: &[Option<f64>], map: impl Fn(f64) -> f64) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut run = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => run.push((i as f64, map(*v))),
            None if !run.is_empty() => out.push(std::mem::take(&mut run)),
            None => {}
        }
    }
    if !run.is_empty() {
        out.push(run);
    }
    out
}

/// Evenly spaced period indices for x-axis labels
pub fn tick_indices(periods: usize, ticks: usize) -> Vec<usize> {
    match (periods, ticks) {
        (0, _) | (_, 0) => Vec::new(),
        (1, _) | (_, 1) => vec![0],
        _ => {
            let ticks = ticks.min(periods);
            (0..ticks)
                .map(|k| (k * (periods - 1) + (ticks - 1) / 2) / (ticks - 1))
                .collect()
        }
    }
}
