mod countries;
mod periods;
mod table;

pub use countries::{validate_ranges, CountryRange, RangeError, COUNTRY_RANGES};
pub use periods::{format_period, parse_period_label, Timeline, PERIOD_CODES};
pub use table::{is_missing, parse_events, parse_primary, EventTable, ObservationRow, SENTINEL};

use geo::{Geometry, MultiPolygon};
use geojson::GeoJson;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Errors that abort initialisation. Any one of them is fatal for the session.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed {table} table: {source}")]
    Csv {
        table: &'static str,
        source: csv::Error,
    },

    #[error("{table} table has no int_id column")]
    MissingId { table: &'static str },

    #[error("malformed GeoJSON: {0}")]
    GeoJson(#[from] simd_json::Error),

    #[error("geometry must be a FeatureCollection")]
    NotFeatureCollection,

    #[error("geometry has {features} features but the primary table has {rows} rows")]
    Misaligned { features: usize, rows: usize },

    #[error(transparent)]
    Countries(#[from] RangeError),
}

/// Locations of the four startup resources
#[derive(Clone, Debug)]
pub struct Sources {
    pub primary: PathBuf,
    pub conflict: PathBuf,
    pub fatality: PathBuf,
    pub geometry: PathBuf,
}

/// A primary row joined with the geometry feature at the same position
#[derive(Clone, Debug)]
pub struct Unit {
    pub row: ObservationRow,
    pub shape: MultiPolygon<f64>,
}

/// Everything the renderers read. Built once at startup, never mutated.
#[derive(Clone, Debug)]
pub struct DataModel {
    pub units: Vec<Unit>,
    pub conflict: EventTable,
    pub fatality: EventTable,
    pub timeline: Timeline,
    pub countries: Vec<CountryRange>,
}

impl DataModel {
    /// Pair rows with geometry by position and check the country ranges tile
    /// the row sequence.
    pub fn join(
        rows: Vec<ObservationRow>,
        shapes: Vec<MultiPolygon<f64>>,
        conflict: EventTable,
        fatality: EventTable,
        timeline: Timeline,
        countries: Vec<CountryRange>,
    ) -> Result<Self, LoadError> {
        if rows.len() != shapes.len() {
            return Err(LoadError::Misaligned {
                features: shapes.len(),
                rows: rows.len(),
            });
        }
        validate_ranges(&countries, rows.len())?;

        let units = rows
            .into_iter()
            .zip(shapes)
            .map(|(row, shape)| Unit { row, shape })
            .collect();

        Ok(Self {
            units,
            conflict,
            fatality,
            timeline,
            countries,
        })
    }

    pub fn shapes(&self) -> impl Iterator<Item = &MultiPolygon<f64>> {
        self.units.iter().map(|u| &u.shape)
    }
}

/// Load all four resources concurrently and join them.
pub fn load(
    sources: &Sources,
    timeline: Timeline,
    countries: Vec<CountryRange>,
) -> Result<DataModel, LoadError> {
    let ((rows, shapes), (conflict, fatality)) = rayon::join(
        || {
            rayon::join(
                || read_primary(&sources.primary, &timeline),
                || read_geometry(&sources.geometry),
            )
        },
        || {
            rayon::join(
                || read_events(&sources.conflict, "conflict", &timeline),
                || read_events(&sources.fatality, "fatality", &timeline),
            )
        },
    );
    let (rows, shapes, conflict, fatality) = (rows?, shapes?, conflict?, fatality?);

    tracing::info!(rows = rows.len(), features = shapes.len(), "loaded primary table and geometry");
    tracing::info!(rows = conflict.len(), max = conflict.max(), "loaded conflict table");
    tracing::info!(rows = fatality.len(), max = fatality.max(), "loaded fatality table");
    if let Some(first) = rows.first() {
        tracing::debug!(
            id = %first.id,
            period = timeline.code(0).unwrap_or_default(),
            conflict = conflict.get(first.key, 0),
            fatality = fatality.get(first.key, 0),
            "sample lookup"
        );
    }

    DataModel::join(rows, shapes, conflict, fatality, timeline, countries)
}

fn open(path: &Path) -> Result<BufReader<File>, LoadError> {
    File::open(path).map(BufReader::new).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_primary(path: &Path, timeline: &Timeline) -> Result<Vec<ObservationRow>, LoadError> {
    parse_primary(open(path)?, timeline)
}

fn read_events(path: &Path, table: &'static str, timeline: &Timeline) -> Result<EventTable, LoadError> {
    parse_events(open(path)?, table, timeline)
}

fn read_geometry(path: &Path) -> Result<Vec<MultiPolygon<f64>>, LoadError> {
    let mut bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_geometry(&mut bytes)
}

/// Parse a FeatureCollection into one multipolygon per feature, preserving
/// feature order. Features without polygonal geometry become empty shapes so
/// positions stay aligned with the primary rows.
pub fn parse_geometry(bytes: &mut [u8]) -> Result<Vec<MultiPolygon<f64>>, LoadError> {
    let geojson: GeoJson = simd_json::serde::from_slice(bytes)?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(LoadError::NotFeatureCollection);
    };

    Ok(collection
        .features
        .into_iter()
        .map(|feature| feature.geometry.map(to_multipolygon).unwrap_or_else(|| MultiPolygon::new(Vec::new())))
        .collect())
}

fn to_multipolygon(geometry: geojson::Geometry) -> MultiPolygon<f64> {
    match Geometry::<f64>::try_from(geometry) {
        Ok(Geometry::Polygon(polygon)) => MultiPolygon::new(vec![polygon]),
        Ok(Geometry::MultiPolygon(multi)) => multi,
        Ok(_) => {
            tracing::warn!("ignoring non-polygonal feature geometry");
            MultiPolygon::new(Vec::new())
        }
        Err(err) => {
            tracing::warn!(%err, "ignoring unreadable feature geometry");
            MultiPolygon::new(Vec::new())
        }
    }
}
