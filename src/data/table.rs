use std::collections::HashMap;
use std::io::Read;

use csv::StringRecord;

use super::periods::Timeline;
use super::LoadError;

/// Reserved value meaning "no observation" in every time-indexed field.
pub const SENTINEL: f64 = 99.0;

const ID_COLUMN: &str = "int_id";
const SECONDARY_SUFFIX: &str = "_sm";
const COUNT_SUFFIX: &str = "_count";

/// True for the sentinel and for fields that failed to parse
#[inline(always)]
pub fn is_missing(value: f64) -> bool {
    value.is_nan() || value == SENTINEL
}

/// One geographic unit from the primary table.
///
/// `primary` and `secondary` are indexed by timeline position. Fields that
/// were absent or unparseable hold `NAN`; the sentinel is kept verbatim.
#[derive(Clone, Debug, PartialEq)]
pub struct ObservationRow {
    /// Identifier as written in the source, used for display
    pub id: String,
    /// Numeric identifier used to join against the event tables
    pub key: Option<i64>,
    pub primary: Vec<f64>,
    pub secondary: Vec<f64>,
}

/// Event counts keyed by unit identifier, with the `_count` header variant
/// already folded into the plain period columns.
#[derive(Clone, Debug, Default)]
pub struct EventTable {
    rows: HashMap<i64, Vec<f64>>,
    max: f64,
}

impl EventTable {
    pub fn from_rows(rows: HashMap<i64, Vec<f64>>) -> Self {
        let max = rows
            .values()
            .flatten()
            .copied()
            .filter(|v| !is_missing(*v))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));
        Self {
            rows,
            max: max.unwrap_or(1.0),
        }
    }

    /// Count for `key` at timeline position `period`; `NAN` on any miss
    pub fn get(&self, key: Option<i64>, period: usize) -> f64 {
        key.and_then(|k| self.rows.get(&k))
            .and_then(|row| row.get(period))
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// Largest non-sentinel count across all periods, 1 when there is none
    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse the primary table: one row per unit, one indicator column per
/// period and one `_sm` suffixed proxy column per period.
pub fn parse_primary<R: Read>(reader: R, timeline: &Timeline) -> Result<Vec<ObservationRow>, LoadError> {
    let csv_err = |source| LoadError::Csv { table: "primary", source };
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers().map_err(csv_err)?.clone();

    let id = column(&headers, ID_COLUMN).ok_or(LoadError::MissingId { table: "primary" })?;
    let primary_cols: Vec<Option<usize>> = timeline.codes().map(|p| column(&headers, p)).collect();
    let secondary_cols: Vec<Option<usize>> = timeline
        .codes()
        .map(|p| column(&headers, &format!("{p}{SECONDARY_SUFFIX}")))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let raw_id = record.get(id).unwrap_or("").trim();
        rows.push(ObservationRow {
            id: raw_id.to_owned(),
            key: parse_key(raw_id),
            primary: primary_cols.iter().map(|c| numeric(&record, *c)).collect(),
            secondary: secondary_cols.iter().map(|c| numeric(&record, *c)).collect(),
        });
    }
    Ok(rows)
}

/// Parse a conflict or fatality table into an [`EventTable`].
///
/// Each period is read from its plain column when present, otherwise from
/// the `<period>_count` column.
pub fn parse_events<R: Read>(
    reader: R,
    table: &'static str,
    timeline: &Timeline,
) -> Result<EventTable, LoadError> {
    let csv_err = |source| LoadError::Csv { table, source };
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers().map_err(csv_err)?.clone();

    let id = column(&headers, ID_COLUMN).ok_or(LoadError::MissingId { table })?;
    let cols: Vec<Option<usize>> = timeline
        .codes()
        .map(|p| column(&headers, p).or_else(|| column(&headers, &format!("{p}{COUNT_SUFFIX}"))))
        .collect();

    let mut rows = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let Some(key) = parse_key(record.get(id).unwrap_or("").trim()) else {
            tracing::debug!(table, "skipping event row without a numeric int_id");
            continue;
        };
        rows.insert(key, cols.iter().map(|c| numeric(&record, *c)).collect());
    }
    Ok(EventTable::from_rows(rows))
}

fn column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Blank or unparsable cells read as missing (NaN), never as zero
fn numeric(record: &StringRecord, col: Option<usize>) -> f64 {
    col.and_then(|c| record.get(c))
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Identifiers are integral but some exports write them as `123.0`
fn parse_key(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> Timeline {
        Timeline::new(vec!["200907".into(), "200910".into()])
    }

    #[test]
    fn test_parse_primary_columns() {
        let csv = "int_id,200907,200910,200907_sm,200910_sm\n\
                   17,3,99,0.05,abc\n\
                   18,,2,99,-0.02\n";
        let rows = parse_primary(csv.as_bytes(), &timeline()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "17");
        assert_eq!(rows[0].key, Some(17));
        assert_eq!(rows[0].primary[0], 3.0);
        assert_eq!(rows[0].primary[1], SENTINEL);
        assert_eq!(rows[0].secondary[0], 0.05);
        assert!(rows[0].secondary[1].is_nan());
        assert!(rows[1].primary[0].is_nan());
        assert!(is_missing(rows[1].secondary[0]));
    }

    #[test]
    fn test_primary_requires_id_column() {
        let csv = "id,200907\n1,2\n";
        let err = parse_primary(csv.as_bytes(), &timeline()).unwrap_err();
        assert!(matches!(err, LoadError::MissingId { table: "primary" }));
    }

    #[test]
    fn test_events_fold_count_suffix() {
        let csv = "int_id,200907_count,200910\n5,4,0\n6,99,12\n";
        let table = parse_events(csv.as_bytes(), "conflict", &timeline()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(Some(5), 0), 4.0);
        assert_eq!(table.get(Some(5), 1), 0.0);
        assert_eq!(table.get(Some(6), 0), SENTINEL);
        assert_eq!(table.max(), 12.0);
    }

    #[test]
    fn test_plain_column_wins_over_count_suffix() {
        let csv = "int_id,200907,200907_count\n5,1,7\n";
        let table = parse_events(csv.as_bytes(), "conflict", &timeline()).unwrap();
        assert_eq!(table.get(Some(5), 0), 1.0);
        assert!(table.get(Some(5), 1).is_nan());
    }

    #[test]
    fn test_blank_event_cell_is_missing_not_zero() {
        let csv = "int_id,200907,200910\n5,,3\n";
        let table = parse_events(csv.as_bytes(), "fatality", &timeline()).unwrap();
        assert!(table.get(Some(5), 0).is_nan());
        assert_eq!(table.get(Some(5), 1), 3.0);
    }

    #[test]
    fn test_event_lookup_miss_is_nan() {
        let table = EventTable::default();
        assert!(table.get(Some(1), 0).is_nan());
        assert!(table.get(None, 0).is_nan());
    }

    #[test]
    fn test_max_ignores_sentinel_and_defaults_to_one() {
        let mut rows = HashMap::new();
        rows.insert(1, vec![99.0, f64::NAN]);
        assert_eq!(EventTable::from_rows(rows).max(), 1.0);

        let mut rows = HashMap::new();
        rows.insert(1, vec![99.0, 42.0, 7.0]);
        rows.insert(2, vec![120.0]);
        assert_eq!(EventTable::from_rows(rows).max(), 120.0);
    }

    #[test]
    fn test_parse_key_accepts_float_form() {
        assert_eq!(parse_key("12"), Some(12));
        assert_eq!(parse_key("12.0"), Some(12));
        assert_eq!(parse_key("12.5"), None);
        assert_eq!(parse_key(""), None);
    }
}
