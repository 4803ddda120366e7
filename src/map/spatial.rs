use std::collections::HashMap;

/// Bounding box as (min_lon, min_lat, max_lon, max_lat)
pub type BBox = (f64, f64, f64, f64);

/// Spatial index over unit bounding boxes.
/// Each unit is inserted into every cell its bbox overlaps, so a point query
/// never misses the unit containing it; false positives are resolved by the
/// caller's exact point-in-polygon test.
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from per-unit bounding boxes in unit order. `None` entries
    /// (units without geometry) keep their index but are never returned.
    pub fn build(bboxes: impl Iterator<Item = Option<BBox>>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, bbox) in bboxes.enumerate() {
            let Some((min_lon, min_lat, max_lon, max_lat)) = bbox else {
                continue;
            };
            let min_cell = grid.to_cell(min_lon, min_lat);
            let max_cell = grid.to_cell(max_lon, max_lat);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Units whose bbox cell covers the point, in ascending unit order
    pub fn candidates(&self, lon: f64, lat: f64) -> &[usize] {
        self.cells
            .get(&self.to_cell(lon, lat))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_query_finds_overlapping_boxes() {
        let boxes = vec![
            Some((0.0, 0.0, 1.5, 1.5)),
            None,
            Some((1.2, 1.2, 3.0, 3.0)),
        ];
        let grid = FeatureGrid::build(boxes.into_iter(), 1.0);

        assert_eq!(grid.candidates(0.5, 0.5), &[0]);
        assert_eq!(grid.candidates(1.4, 1.4), &[0, 2]);
        assert_eq!(grid.candidates(2.5, 2.5), &[2]);
        assert!(grid.candidates(-4.0, 9.0).is_empty());
    }
}
