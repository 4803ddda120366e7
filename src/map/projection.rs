use geo::{BoundingRect, Centroid, MultiPolygon, Polygon};
use glam::DVec2;
use std::f64::consts::PI;

/// Headroom left around the fitted geometry
const FIT_MARGIN: f64 = 0.95;

/// Zoom multiplier per scroll step
const ZOOM_STEP: f64 = 1.5;

/// Deepest zoom relative to the fitted view
const MAX_ZOOM: f64 = 64.0;

/// Mercator projection fitted to the loaded geometry, with pan and zoom
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Projection center (lon, lat)
    pub center: DVec2,
    /// Pixels per normalized Mercator unit
    pub scale: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
    /// Scale of the unzoomed view
    fit_scale: f64,
}

impl Viewport {
    pub fn new(center: DVec2, scale: f64, width: usize, height: usize) -> Self {
        Self {
            center,
            scale,
            width,
            height,
            fit_scale: scale,
        }
    }

    /// Center on the centroid of all shapes and pick the largest scale at
    /// which their bounding box still fits the canvas around that center.
    pub fn fit<'a>(shapes: impl IntoIterator<Item = &'a MultiPolygon<f64>>, width: usize, height: usize) -> Self {
        let polygons: Vec<Polygon<f64>> = shapes.into_iter().flat_map(|m| m.0.iter().cloned()).collect();
        let all = MultiPolygon::new(polygons);

        let center = all
            .centroid()
            .map_or(DVec2::ZERO, |p| DVec2::new(p.x(), p.y()));
        let mut viewport = Self::new(center, width.max(1) as f64, width, height);

        if let Some(rect) = all.bounding_rect() {
            let c = mercator(center);
            let lo = mercator(DVec2::new(rect.min().x, rect.min().y));
            let hi = mercator(DVec2::new(rect.max().x, rect.max().y));
            let half = (c - lo).abs().max((hi - c).abs());

            let fit_x = if half.x > 0.0 { width as f64 / 2.0 / half.x } else { f64::INFINITY };
            let fit_y = if half.y > 0.0 { height as f64 / 2.0 / half.y } else { f64::INFINITY };
            let scale = fit_x.min(fit_y);
            if scale.is_finite() && scale > 0.0 {
                viewport.scale = scale * FIT_MARGIN;
                viewport.fit_scale = viewport.scale;
            }
        }
        viewport
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let p = (mercator(DVec2::new(lon, lat)) - mercator(self.center)) * self.scale;
        let px = (p.x + self.width as f64 / 2.0).floor() as i32;
        let py = (p.y + self.height as f64 / 2.0).floor() as i32;
        (px, py)
    }

    /// Unproject a (possibly fractional) pixel position back to (lon, lat)
    pub fn unproject(&self, px: f64, py: f64) -> (f64, f64) {
        let offset = DVec2::new(px - self.width as f64 / 2.0, py - self.height as f64 / 2.0);
        let lonlat = inverse_mercator(mercator(self.center) + offset / self.scale);
        (lonlat.x, lonlat.y)
    }

    /// Magnification relative to the fitted view
    pub fn zoom(&self) -> f64 {
        self.scale / self.fit_scale
    }

    /// Shift the view by a pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let m = mercator(self.center) + DVec2::new(dx as f64, dy as f64) / self.scale;
        self.center = inverse_mercator(m.clamp(DVec2::ZERO, DVec2::ONE));
    }

    pub fn zoom_in_at(&mut self, px: f64, py: f64) {
        self.zoom_at(px, py, ZOOM_STEP);
    }

    pub fn zoom_out_at(&mut self, px: f64, py: f64) {
        self.zoom_at(px, py, 1.0 / ZOOM_STEP);
    }

    /// Zoom by `factor`, keeping the point under pixel `(px, py)` in place.
    /// Zoom never drops below the fitted view.
    fn zoom_at(&mut self, px: f64, py: f64, factor: f64) {
        let offset = DVec2::new(px - self.width as f64 / 2.0, py - self.height as f64 / 2.0);
        let anchor = mercator(self.center) + offset / self.scale;

        let zoom = (self.zoom() * factor).clamp(1.0, MAX_ZOOM);
        self.scale = self.fit_scale * zoom;
        self.center = inverse_mercator(anchor - offset / self.scale);
    }
}

/// Web Mercator in normalized units: x in [0, 1] east, y in [0, 1] south
fn mercator(lonlat: DVec2) -> DVec2 {
    let x = (lonlat.x + 180.0) / 360.0;
    let lat = lonlat.y.clamp(-85.0, 85.0).to_radians();
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    DVec2::new(x, y)
}

fn inverse_mercator(m: DVec2) -> DVec2 {
    let lon = m.x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * m.y)).sinh().atan().to_degrees();
    DVec2::new(lon, lat)
}
