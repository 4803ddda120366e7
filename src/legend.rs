use ratatui::style::Color;

use crate::dataset::DatasetType;

const IPC_PHASES: [&str; 5] = ["Minimal", "Stressed", "Crisis", "Emergency", "Famine"];
const EVENT_STOPS: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 100.0];

/// One swatch in the legend strip
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub value: f64,
    pub label: String,
    pub color: Color,
}

/// Five swatches sampled from the active dataset's color scale
pub fn legend(dataset: DatasetType) -> Vec<LegendEntry> {
    let scale = dataset.scale();
    let entry = |value: f64, label: String| LegendEntry {
        value,
        label,
        color: scale.color(value),
    };

    match dataset {
        DatasetType::Primary => IPC_PHASES
            .iter()
            .enumerate()
            .map(|(i, phase)| {
                let level = i + 1;
                entry(level as f64, format!("{level} - {phase}"))
            })
            .collect(),
        DatasetType::Secondary => {
            let (min, max) = scale.domain();
            let span = max - min;
            let q = |f: f64| min + span * f;
            vec![
                entry(min, format!("< {min:.2}")),
                entry(q(0.25), format!("{:.2}", q(0.25))),
                entry(q(0.5), format!("{:.2}", q(0.5))),
                entry(q(0.75), format!("{:.2}", q(0.75))),
                entry(max, format!("> {max:.2}")),
            ]
        }
        DatasetType::Conflict | DatasetType::Fatality => EVENT_STOPS
            .iter()
            .map(|&v| {
                let label = if v == 100.0 { "> 100".to_string() } else { format!("{v}") };
                entry(v, label)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_categories() {
        let entries = legend(DatasetType::Primary);
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            ["1 - Minimal", "2 - Stressed", "3 - Crisis", "4 - Emergency", "5 - Famine"]
        );
        assert_eq!(entries[2].color, DatasetType::Primary.scale().color(3.0));
    }

    #[test]
    fn test_secondary_open_ended_bounds() {
        let entries = legend(DatasetType::Secondary);
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].label, "< -0.10");
        assert_eq!(entries[2].label, "0.05");
        assert_eq!(entries[4].label, "> 0.20");
        assert!(entries.windows(2).all(|w| w[0].value < w[1].value));
    }

    #[test]
    fn test_event_stops() {
        for dataset in [DatasetType::Conflict, DatasetType::Fatality] {
            let entries = legend(dataset);
            let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
            assert_eq!(labels, ["0", "25", "50", "75", "> 100"]);
            assert_eq!(entries[4].color, dataset.scale().color(100.0));
        }
    }
}
