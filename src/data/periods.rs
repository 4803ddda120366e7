/// Period codes shared by every time-indexed column, oldest first.
pub const PERIOD_CODES: [&str; 50] = [
    "200907", "200910", "201001", "201004", "201007", "201010", "201101", "201104",
    "201107", "201110", "201201", "201204", "201207", "201210", "201301", "201304",
    "201307", "201310", "201401", "201404", "201407", "201410", "201501", "201504",
    "201507", "201510", "201602", "201606", "201610", "201702", "201706", "201710",
    "201802", "201806", "201810", "201902", "201906", "201910", "202002", "202006",
    "202010", "202102", "202106", "202110", "202202", "202206", "202210", "202302",
    "202306", "202310",
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Ordered sequence of `YYYYMM` period codes.
///
/// An index into the timeline is the "current time" coordinate shared by the
/// map and the time-series chart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline {
    codes: Vec<String>,
}

impl Timeline {
    pub fn new(codes: Vec<String>) -> Self {
        Self { codes }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn code(&self, index: usize) -> Option<&str> {
        self.codes.get(index).map(String::as_str)
    }

    /// Display label for the period at `index`, e.g. `2009-Jul`
    pub fn label(&self, index: usize) -> String {
        self.code(index).map(format_period).unwrap_or_default()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(PERIOD_CODES.iter().map(|c| (*c).to_owned()).collect())
    }
}

/// Format a `YYYYMM` code as `YYYY-Mon`. Malformed codes are returned as-is.
pub fn format_period(code: &str) -> String {
    if code.len() != 6 || !code.is_ascii() {
        return code.to_owned();
    }
    let (year, month) = code.split_at(4);
    match month.parse::<usize>() {
        Ok(m @ 1..=12) => format!("{year}-{}", MONTHS[m - 1]),
        _ => code.to_owned(),
    }
}

/// Inverse of [`format_period`]: `2009-Jul` -> `200907`
pub fn parse_period_label(label: &str) -> Option<String> {
    let (year, month) = label.split_once('-')?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let m = MONTHS.iter().position(|name| name.eq_ignore_ascii_case(month))?;
    Some(format!("{year}{:02}", m + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_period() {
        assert_eq!(format_period("200907"), "2009-Jul");
        assert_eq!(format_period("202302"), "2023-Feb");
    }

    #[test]
    fn test_format_malformed_passthrough() {
        assert_eq!(format_period("2009"), "2009");
        assert_eq!(format_period("200913"), "200913");
    }

    #[test]
    fn test_label_round_trip() {
        for code in PERIOD_CODES {
            let label = format_period(code);
            assert_eq!(parse_period_label(&label).as_deref(), Some(code));
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_period_label("July 2009"), None);
        assert_eq!(parse_period_label("09-Jul"), None);
        assert_eq!(parse_period_label("2009-Foo"), None);
    }

    #[test]
    fn test_default_timeline() {
        let timeline = Timeline::default();
        assert_eq!(timeline.len(), 50);
        assert_eq!(timeline.code(0), Some("200907"));
        assert_eq!(timeline.label(49), "2023-Oct");
        assert_eq!(timeline.code(50), None);
        assert_eq!(timeline.label(50), "");
    }
}
