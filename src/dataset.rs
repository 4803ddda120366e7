use ratatui::style::Color;

use crate::scale::{ColorScale, Ramp};

/// Which indicator the map is colored by
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DatasetType {
    /// IPC food-insecurity phase, 1 to 5
    #[default]
    Primary,
    /// Vegetation / soil-moisture proxy (`_sm` columns)
    Secondary,
    Conflict,
    Fatality,
}

impl DatasetType {
    pub const ALL: [DatasetType; 4] = [
        DatasetType::Primary,
        DatasetType::Secondary,
        DatasetType::Conflict,
        DatasetType::Fatality,
    ];

    /// Selector option text
    pub fn name(self) -> &'static str {
        match self {
            DatasetType::Primary => "IPC Phase",
            DatasetType::Secondary => "Soil Moisture (SIF)",
            DatasetType::Conflict => "Conflict Events",
            DatasetType::Fatality => "Fatalities",
        }
    }

    /// Short label used in tooltips and on the chart's right axis
    pub fn label(self) -> &'static str {
        match self {
            DatasetType::Primary => "IPC Level",
            DatasetType::Secondary => "SIF",
            DatasetType::Conflict => "Conflict",
            DatasetType::Fatality => "Fatalities",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DatasetType::Primary => DatasetType::Secondary,
            DatasetType::Secondary => DatasetType::Conflict,
            DatasetType::Conflict => DatasetType::Fatality,
            DatasetType::Fatality => DatasetType::Primary,
        }
    }

    pub fn scale(self) -> ColorScale {
        match self {
            DatasetType::Primary => ColorScale::linear(Ramp::YlOrRd, (1.0, 5.0)),
            DatasetType::Secondary => ColorScale::linear(Ramp::Greens, (-0.1, 0.2)),
            DatasetType::Conflict => ColorScale::sqrt(Ramp::Purples, (0.0, 100.0)),
            DatasetType::Fatality => ColorScale::sqrt(Ramp::Oranges, (0.0, 100.0)),
        }
    }

    /// Line color of this dataset's series in the time-series chart
    pub fn series_color(self) -> Color {
        match self {
            DatasetType::Primary => Color::Rgb(0xd7, 0x30, 0x27),
            DatasetType::Secondary => Color::Rgb(0x2c, 0xa2, 0x5f),
            DatasetType::Conflict => Color::Rgb(0x76, 0x2a, 0x83),
            DatasetType::Fatality => Color::White,
        }
    }

    /// Format a present value for display
    pub fn format_value(self, value: f64) -> String {
        match self {
            DatasetType::Primary => format!("{}", value.round() as i64),
            DatasetType::Secondary => format!("{value:.2}"),
            DatasetType::Conflict | DatasetType::Fatality => group_thousands(value.round() as i64),
        }
    }
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
