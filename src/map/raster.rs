use geo::{BoundingRect, Contains, InteriorPoint, MultiPolygon, Point};
use rayon::prelude::*;
use std::borrow::Borrow;

use crate::braille::BrailleCanvas;
use crate::map::geometry::draw_ring;
use crate::map::projection::Viewport;
use crate::map::spatial::FeatureGrid;

/// Grid cell size for the hit-test index, in degrees
const INDEX_CELL_DEG: f64 = 0.5;

/// Projected, rasterized geometry for one map size.
///
/// Each terminal cell is bound to at most one unit (the unit containing the
/// cell's center). A unit too small to cover any cell center claims the cell
/// under its interior point instead; borders of every unit are stroked once
/// into a braille overlay.
pub struct Raster {
    viewport: Viewport,
    cols: usize,
    rows: usize,
    /// Unit index per cell, row-major
    cells: Vec<Option<u32>>,
    /// Projected rings per unit, in braille pixels
    outlines: Vec<Vec<Vec<(i32, i32)>>>,
    borders: BrailleCanvas,
}

impl Raster {
    /// Project `shapes` into a `cols` x `rows` cell area, fitted to their
    /// bounds.
    pub fn build<S>(shapes: &[S], cols: usize, rows: usize) -> Self
    where
        S: Borrow<MultiPolygon<f64>>,
    {
        let shapes: Vec<&MultiPolygon<f64>> = shapes.iter().map(Borrow::borrow).collect();
        let viewport = Viewport::fit(shapes.iter().copied(), cols * 2, rows * 4);
        Self::with_viewport(&shapes, viewport)
    }

    /// Project `shapes` through `viewport`; the cell area is the viewport's
    /// pixel size in braille cells.
    pub fn with_viewport<S>(shapes: &[S], viewport: Viewport) -> Self
    where
        S: Borrow<MultiPolygon<f64>>,
    {
        let shapes: Vec<&MultiPolygon<f64>> = shapes.iter().map(Borrow::borrow).collect();
        let (cols, rows) = (viewport.width / 2, viewport.height / 4);

        let grid = FeatureGrid::build(
            shapes.iter().map(|shape| {
                shape
                    .bounding_rect()
                    .map(|r| (r.min().x, r.min().y, r.max().x, r.max().y))
            }),
            INDEX_CELL_DEG,
        );

        let mut cells: Vec<Option<u32>> = (0..cols * rows)
            .into_par_iter()
            .map(|i| {
                let (cx, cy) = (i % cols, i / cols);
                // Cell center in braille pixels
                let (lon, lat) = viewport.unproject(cx as f64 * 2.0 + 1.0, cy as f64 * 4.0 + 2.0);
                let point = Point::new(lon, lat);
                grid.candidates(lon, lat)
                    .iter()
                    .copied()
                    .find(|&u| shapes[u].contains(&point))
                    .map(|u| u as u32)
            })
            .collect();
        let claimed = claim_missed_cells(&mut cells, &shapes, &viewport, cols, rows);

        let outlines: Vec<Vec<Vec<(i32, i32)>>> = shapes
            .par_iter()
            .map(|shape| {
                shape
                    .0
                    .iter()
                    .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
                    .map(|ring| ring.coords().map(|c| viewport.project(c.x, c.y)).collect())
                    .collect()
            })
            .collect();

        let mut borders = BrailleCanvas::new(cols, rows);
        for ring in outlines.iter().flatten() {
            draw_ring(&mut borders, ring);
        }

        tracing::debug!(cols, rows, units = shapes.len(), claimed, zoom = viewport.zoom(), "rasterized map");

        Self {
            viewport,
            cols,
            rows,
            cells,
            outlines,
            borders,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Unit whose geometry covers the cell at `(cx, cy)`
    pub fn unit_at(&self, cx: usize, cy: usize) -> Option<usize> {
        if cx >= self.cols || cy >= self.rows {
            return None;
        }
        self.cells[cy * self.cols + cx].map(|u| u as usize)
    }

    pub fn borders(&self) -> &BrailleCanvas {
        &self.borders
    }

    /// Border overlay for a single unit
    pub fn outline(&self, unit: usize) -> BrailleCanvas {
        let mut canvas = BrailleCanvas::new(self.cols, self.rows);
        for ring in self.outlines.get(unit).into_iter().flatten() {
            draw_ring(&mut canvas, ring);
        }
        canvas
    }
}

/// Give every non-empty unit that owns no cell the cell under its interior
/// point, unless that would leave the current owner with none. Returns the
/// number of cells reassigned.
fn claim_missed_cells(
    cells: &mut [Option<u32>],
    shapes: &[&MultiPolygon<f64>],
    viewport: &Viewport,
    cols: usize,
    rows: usize,
) -> usize {
    let mut owned = vec![0usize; shapes.len()];
    for &unit in cells.iter().flatten() {
        owned[unit as usize] += 1;
    }

    let mut claimed = 0;
    for (unit, shape) in shapes.iter().enumerate() {
        if owned[unit] > 0 {
            continue;
        }
        let Some(point) = shape.interior_point() else {
            continue;
        };
        let (px, py) = viewport.project(point.x(), point.y());
        if px < 0 || py < 0 {
            continue;
        }
        let (cx, cy) = (px as usize / 2, py as usize / 4);
        if cx >= cols || cy >= rows {
            continue;
        }

        let cell = &mut cells[cy * cols + cx];
        match *cell {
            Some(owner) if owned[owner as usize] <= 1 => continue,
            Some(owner) => owned[owner as usize] -= 1,
            None => {}
        }
        *cell = Some(unit as u32);
        owned[unit] += 1;
        claimed += 1;
    }
    claimed
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use geo::polygon;

    /// Two unit squares side by side, lon 30..31 and 31..32, lat 0..1
    pub(crate) fn two_squares() -> Vec<MultiPolygon<f64>> {
        let square = |x0: f64| {
            MultiPolygon::new(vec![polygon![
                (x: x0, y: 0.0),
                (x: x0 + 1.0, y: 0.0),
                (x: x0 + 1.0, y: 1.0),
                (x: x0, y: 1.0),
                (x: x0, y: 0.0),
            ]])
        };
        vec![square(30.0), square(31.0)]
    }

    #[test]
    fn test_cells_bind_to_units_left_to_right() {
        let raster = Raster::build(&two_squares(), 40, 10);
        let mid = 5;

        let row: Vec<Option<usize>> = (0..40).map(|cx| raster.unit_at(cx, mid)).collect();
        let first = row.iter().position(|u| *u == Some(0)).unwrap();
        let second = row.iter().position(|u| *u == Some(1)).unwrap();
        assert!(first < second);
        assert!(row.iter().all(|u| matches!(u, None | Some(0) | Some(1))));
    }

    #[test]
    fn test_corners_are_background() {
        let raster = Raster::build(&two_squares(), 40, 10);
        assert_eq!(raster.unit_at(0, 0), None);
        assert_eq!(raster.unit_at(39, 9), None);
        assert_eq!(raster.unit_at(400, 0), None);
    }

    #[test]
    fn test_outline_is_subset_of_borders() {
        let raster = Raster::build(&two_squares(), 40, 10);
        let outline = raster.outline(1);
        let mut any = false;
        for cy in 0..10 {
            for cx in 0..40 {
                if outline.glyph(cx, cy).is_some() {
                    any = true;
                    assert!(raster.borders().glyph(cx, cy).is_some());
                }
            }
        }
        assert!(any);
        assert!(raster.outline(99).glyph(0, 0).is_none());
    }

    #[test]
    fn test_empty_shapes_never_hit() {
        let mut shapes = two_squares();
        shapes.insert(0, MultiPolygon::new(Vec::new()));
        let raster = Raster::build(&shapes, 40, 10);
        assert!((0..40).all(|cx| raster.unit_at(cx, 5) != Some(0)));
        assert!((0..40).any(|cx| raster.unit_at(cx, 5) == Some(2)));
    }

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]])
    }

    fn cell_counts(raster: &Raster, units: usize) -> Vec<usize> {
        let (cols, rows) = raster.size();
        let mut counts = vec![0; units];
        for cy in 0..rows {
            for cx in 0..cols {
                if let Some(u) = raster.unit_at(cx, cy) {
                    counts[u] += 1;
                }
            }
        }
        counts
    }

    #[test]
    fn test_tiny_units_claim_a_cell() {
        // One large unit, a sliver inside it and a detached sliver
        let shapes = vec![
            square(30.0, 0.0, 4.0),
            square(31.003, 1.003, 0.004),
            square(35.5, 0.5, 0.004),
        ];
        let raster = Raster::build(&shapes, 40, 10);
        let counts = cell_counts(&raster, shapes.len());

        assert!(counts.iter().all(|&n| n > 0), "counts {counts:?}");
        assert_eq!(counts[1], 1);
        assert_eq!(counts[2], 1);
    }

    #[test]
    fn test_every_unit_reachable_when_cells_suffice() {
        // Ten stacked strips, each wide but shorter than a cell row, so some
        // cover no cell center
        let shapes: Vec<_> = (0..10)
            .map(|i| {
                let y0 = i as f64 * 0.2;
                MultiPolygon::new(vec![polygon![
                    (x: 30.0, y: y0),
                    (x: 32.0, y: y0),
                    (x: 32.0, y: y0 + 0.2),
                    (x: 30.0, y: y0 + 0.2),
                    (x: 30.0, y: y0),
                ]])
            })
            .collect();
        let raster = Raster::build(&shapes, 30, 8);
        let counts = cell_counts(&raster, shapes.len());
        assert!(counts.iter().all(|&n| n > 0), "counts {counts:?}");
    }

    #[test]
    fn test_zoom_reaches_units_smaller_than_a_cell() {
        // 30 x 30 grid of 0.2 degree squares outnumbers the cells of a 60 x 20
        // map, so some are unreachable until the view is zoomed
        let shapes: Vec<_> = (0..900)
            .map(|i| square(30.0 + (i % 30) as f64 * 0.2, (i / 30) as f64 * 0.2, 0.2))
            .collect();
        let fitted = Raster::build(&shapes, 60, 20);
        assert!(cell_counts(&fitted, shapes.len()).contains(&0));

        let mut viewport = fitted.viewport().clone();
        for _ in 0..4 {
            viewport.zoom_in_at(60.0, 40.0);
        }
        let zoomed = Raster::with_viewport(&shapes, viewport);
        let counts = cell_counts(&zoomed, shapes.len());
        for (unit, shape) in shapes.iter().enumerate() {
            let p = shape.interior_point().unwrap();
            let (px, py) = zoomed.viewport().project(p.x(), p.y());
            if (0..120).contains(&px) && (0..80).contains(&py) {
                assert!(counts[unit] > 0, "unit {unit} unreachable at zoom");
            }
        }
        assert_eq!(zoomed.size(), (60, 20));
    }
}
