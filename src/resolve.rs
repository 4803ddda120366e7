//! Value resolution shared by the map, the tooltip and the chart.
//!
//! Everything here is a pure function of the data model and the selection.

use ratatui::style::Color;

use crate::data::{is_missing, DataModel, Unit};
use crate::dataset::DatasetType;
use crate::scale::{NOT_APPLICABLE, NO_DATA, ZERO};
use crate::state::{CountryFilter, Selection};

/// Visual category of one unit under the current selection
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fill {
    /// Outside the selected country
    NotApplicable,
    NoData,
    /// True zero on a non-primary dataset
    Zero,
    Value(f64),
}

impl Fill {
    pub fn color(self, dataset: DatasetType) -> Color {
        match self {
            Fill::NotApplicable => NOT_APPLICABLE,
            Fill::NoData => NO_DATA,
            Fill::Zero => ZERO,
            Fill::Value(v) => dataset.scale().color(v),
        }
    }

    /// The value to show to the user, if any
    pub fn value(self) -> Option<f64> {
        match self {
            Fill::Zero => Some(0.0),
            Fill::Value(v) => Some(v),
            Fill::NotApplicable | Fill::NoData => None,
        }
    }
}

/// The unit at `index` if it belongs to the selected country
pub fn resolve_unit(model: &DataModel, country: CountryFilter, index: usize) -> Option<&Unit> {
    let unit = model.units.get(index)?;
    match country {
        CountryFilter::All => Some(unit),
        CountryFilter::Country(c) => model
            .countries
            .get(c)
            .filter(|range| range.contains(index))
            .map(|_| unit),
    }
}

/// Raw field value for `unit` at timeline position `period`; `NAN` on a miss
pub fn reading(model: &DataModel, dataset: DatasetType, unit: &Unit, period: usize) -> f64 {
    let field = |values: &[f64]| values.get(period).copied().unwrap_or(f64::NAN);
    match dataset {
        DatasetType::Primary => field(&unit.row.primary),
        DatasetType::Secondary => field(&unit.row.secondary),
        DatasetType::Conflict => model.conflict.get(unit.row.key, period),
        DatasetType::Fatality => model.fatality.get(unit.row.key, period),
    }
}

/// Apply the no-data / zero / domain policy to a raw value
pub fn classify(dataset: DatasetType, value: f64) -> Fill {
    if is_missing(value) {
        Fill::NoData
    } else if value == 0.0 && dataset != DatasetType::Primary {
        Fill::Zero
    } else if dataset == DatasetType::Primary && !(1.0..=5.0).contains(&value) {
        Fill::NoData
    } else {
        Fill::Value(value)
    }
}

pub fn fill(model: &DataModel, sel: &Selection, index: usize) -> Fill {
    match resolve_unit(model, sel.country, index) {
        Some(unit) => classify(sel.dataset, reading(model, sel.dataset, unit, sel.time_index)),
        None => Fill::NotApplicable,
    }
}

/// One recolor pass: the fill color of every unit, in geometry order
pub fn fill_colors(model: &DataModel, sel: &Selection) -> Vec<Color> {
    (0..model.units.len())
        .map(|i| fill(model, sel, i).color(sel.dataset))
        .collect()
}

/// Hover text for one unit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tooltip {
    pub unit_id: String,
    pub period: String,
    pub label: &'static str,
    pub value: String,
}

impl Tooltip {
    pub fn lines(&self) -> [String; 3] {
        [
            format!("Unit {}", self.unit_id),
            format!("Time: {}", self.period),
            format!("{}: {}", self.label, self.value),
        ]
    }
}

/// Tooltip for the unit at `index`, suppressed under the same conditions
/// that give it a not-applicable or no-data fill
pub fn tooltip(model: &DataModel, sel: &Selection, index: usize) -> Option<Tooltip> {
    let unit = resolve_unit(model, sel.country, index)?;
    let value = fill(model, sel, index).value()?;
    Some(Tooltip {
        unit_id: unit.row.id.clone(),
        period: model.timeline.label(sel.time_index),
        label: sel.dataset.label(),
        value: sel.dataset.format_value(value),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::{CountryRange, EventTable, ObservationRow, Timeline, SENTINEL};
    use geo::MultiPolygon;
    use std::collections::HashMap;

    /// Three units over three periods; unit 2 has no event rows
    pub(crate) fn model() -> DataModel {
        let row = |id: i64, primary: Vec<f64>, secondary: Vec<f64>| ObservationRow {
            id: id.to_string(),
            key: Some(id),
            primary,
            secondary,
        };
        let rows = vec![
            row(100, vec![3.0, SENTINEL, 7.0], vec![0.05, 0.0, SENTINEL]),
            row(101, vec![1.0, 5.0, f64::NAN], vec![-0.2, 0.1, 0.3]),
            row(102, vec![2.0, 2.0, 2.0], vec![0.0, 0.0, 0.0]),
        ];
        let mut conflict = HashMap::new();
        conflict.insert(100, vec![0.0, 4.0, SENTINEL]);
        conflict.insert(101, vec![1500.0, 2.0, 3.0]);
        let mut fatality = HashMap::new();
        fatality.insert(100, vec![10.0, 0.0, 2.0]);

        DataModel::join(
            rows,
            vec![MultiPolygon::new(Vec::new()); 3],
            EventTable::from_rows(conflict),
            EventTable::from_rows(fatality),
            Timeline::new(vec!["200907".into(), "200910".into(), "201001".into()]),
            vec![CountryRange::new("A", 0, 2), CountryRange::new("B", 2, 1)],
        )
        .unwrap()
    }

    fn sel(dataset: DatasetType, time_index: usize) -> Selection {
        Selection {
            dataset,
            time_index,
            ..Selection::default()
        }
    }

    #[test]
    fn test_sentinel_is_no_data_for_every_reader() {
        let model = model();
        assert_eq!(fill(&model, &sel(DatasetType::Primary, 1), 0), Fill::NoData);
        assert_eq!(fill(&model, &sel(DatasetType::Secondary, 2), 0), Fill::NoData);
        assert_eq!(fill(&model, &sel(DatasetType::Conflict, 2), 0), Fill::NoData);
    }

    #[test]
    fn test_primary_value_uses_scale() {
        let model = model();
        let s = sel(DatasetType::Primary, 0);
        assert_eq!(fill(&model, &s, 0), Fill::Value(3.0));
        assert_eq!(fill_colors(&model, &s)[0], DatasetType::Primary.scale().color(3.0));
    }

    #[test]
    fn test_primary_out_of_domain_is_no_data() {
        let model = model();
        assert_eq!(fill(&model, &sel(DatasetType::Primary, 2), 0), Fill::NoData);
        assert_eq!(fill(&model, &sel(DatasetType::Primary, 2), 1), Fill::NoData);
    }

    #[test]
    fn test_zero_is_distinguished_off_primary() {
        let model = model();
        for (dataset, period, index) in [
            (DatasetType::Secondary, 1, 0),
            (DatasetType::Conflict, 0, 0),
            (DatasetType::Fatality, 1, 0),
        ] {
            let f = fill(&model, &sel(dataset, period), index);
            assert_eq!(f, Fill::Zero);
            assert_eq!(f.color(dataset), ZERO);
            assert_ne!(f.color(dataset), dataset.scale().color(0.0));
        }
    }

    #[test]
    fn test_secondary_outside_domain_is_still_colored() {
        let model = model();
        let f = fill(&model, &sel(DatasetType::Secondary, 2), 1);
        assert_eq!(f, Fill::Value(0.3));
    }

    #[test]
    fn test_event_lookup_miss_is_no_data() {
        let model = model();
        for period in 0..3 {
            let s = sel(DatasetType::Conflict, period);
            assert_eq!(fill(&model, &s, 2), Fill::NoData);
            assert_eq!(tooltip(&model, &s, 2), None);
        }
    }

    #[test]
    fn test_country_filter_marks_not_applicable() {
        let model = model();
        let s = Selection {
            country: CountryFilter::Country(1),
            ..Selection::default()
        };
        assert_eq!(fill(&model, &s, 1), Fill::NotApplicable);
        assert_eq!(fill(&model, &s, 2), Fill::Value(2.0));
        assert!(resolve_unit(&model, s.country, 1).is_none());
        assert_eq!(resolve_unit(&model, s.country, 2).unwrap().row.id, "102");
        assert_eq!(tooltip(&model, &s, 1), None);
    }

    #[test]
    fn test_burundi_range_boundary() {
        use crate::data::COUNTRY_RANGES;

        let rows = (0..2816)
            .map(|i| ObservationRow {
                id: i.to_string(),
                key: Some(i),
                primary: vec![2.0],
                secondary: vec![0.1],
            })
            .collect();
        let model = DataModel::join(
            rows,
            vec![MultiPolygon::new(Vec::new()); 2816],
            EventTable::default(),
            EventTable::default(),
            Timeline::new(vec!["200907".into()]),
            COUNTRY_RANGES.to_vec(),
        )
        .unwrap();
        let burundi = Selection {
            country: CountryFilter::Country(2),
            ..Selection::default()
        };

        assert_eq!(fill(&model, &burundi, 1339), Fill::NotApplicable);
        assert_eq!(resolve_unit(&model, burundi.country, 1340).unwrap().row.id, "1340");
        assert_eq!(fill(&model, &burundi, 1340), Fill::Value(2.0));
    }

    #[test]
    fn test_tooltip_text() {
        let model = model();
        let tip = tooltip(&model, &sel(DatasetType::Primary, 0), 0).unwrap();
        assert_eq!(
            tip.lines(),
            [
                "Unit 100".to_string(),
                "Time: 2009-Jul".to_string(),
                "IPC Level: 3".to_string()
            ]
        );

        let tip = tooltip(&model, &sel(DatasetType::Conflict, 0), 1).unwrap();
        assert_eq!(tip.value, "1,500");
        assert_eq!(tip.label, "Conflict");

        let tip = tooltip(&model, &sel(DatasetType::Fatality, 1), 0).unwrap();
        assert_eq!(tip.value, "0");
    }
}
