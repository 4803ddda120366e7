use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fsc_dash::data::{DataModel, EventTable, ObservationRow, Timeline, COUNTRY_RANGES};
use fsc_dash::dataset::DatasetType;
use fsc_dash::map::{MapRenderer, Raster};
use fsc_dash::resolve::fill_colors;
use fsc_dash::series::build_series;
use fsc_dash::state::{CountryFilter, Paint, Selection};
use geo::{polygon, MultiPolygon};
use std::collections::HashMap;
use std::time::{Duration, Instant};

const UNITS: usize = 2816;
const COLS: usize = 64;

/// Full-size model: one 0.1° square per unit on a 64-wide grid
fn model() -> DataModel {
    let timeline = Timeline::default();
    let periods = timeline.len();

    let rows: Vec<ObservationRow> = (0..UNITS)
        .map(|i| ObservationRow {
            id: i.to_string(),
            key: Some(i as i64),
            primary: (0..periods).map(|p| ((i + p) % 5 + 1) as f64).collect(),
            secondary: (0..periods).map(|p| ((i * 7 + p) % 30) as f64 / 100.0 - 0.1).collect(),
        })
        .collect();

    let shapes = (0..UNITS)
        .map(|i| {
            let x = 22.0 + (i % COLS) as f64 * 0.1;
            let y = -5.0 + (i / COLS) as f64 * 0.1;
            MultiPolygon::new(vec![polygon![
                (x: x, y: y),
                (x: x + 0.1, y: y),
                (x: x + 0.1, y: y + 0.1),
                (x: x, y: y + 0.1),
                (x: x, y: y),
            ]])
        })
        .collect();

    let events = |scale: usize| -> HashMap<i64, Vec<f64>> {
        (0..UNITS as i64)
            .step_by(2)
            .map(|k| (k, (0..periods).map(|p| ((k as usize * scale + p) % 120) as f64).collect()))
            .collect()
    };

    DataModel::join(
        rows,
        shapes,
        EventTable::from_rows(events(3)),
        EventTable::from_rows(events(11)),
        timeline,
        COUNTRY_RANGES.to_vec(),
    )
    .unwrap()
}

fn bench_recolor(c: &mut Criterion) {
    let model = model();
    let now = Instant::now();
    let mut map = MapRenderer::new(model.units.len(), now);
    let sel = Selection {
        dataset: DatasetType::Conflict,
        country: CountryFilter::Country(1),
        time_index: 17,
        ..Selection::default()
    };

    c.bench_function("fill_colors", |b| b.iter(|| fill_colors(black_box(&model), black_box(&sel))));
    c.bench_function("recolor_eased", |b| {
        b.iter(|| {
            map.recolor(fill_colors(&model, &sel), Paint::Eased, now, Duration::from_millis(300));
            black_box(map.fill(42, now + Duration::from_millis(150)))
        })
    });
}

fn bench_series(c: &mut Criterion) {
    let model = model();
    c.bench_function("build_series", |b| {
        b.iter(|| build_series(black_box(&model), DatasetType::Secondary, black_box(1500)))
    });
}

fn bench_raster(c: &mut Criterion) {
    let model = model();
    let shapes: Vec<&MultiPolygon<f64>> = model.shapes().collect();
    c.bench_function("raster_build_120x40", |b| {
        b.iter(|| Raster::build(black_box(&shapes), 120, 40))
    });
}

criterion_group!(benches, bench_recolor, bench_series, bench_raster);
criterion_main!(benches);
