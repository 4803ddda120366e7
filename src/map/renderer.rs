use geo::MultiPolygon;
use ratatui::style::Color;
use std::borrow::Borrow;
use std::time::{Duration, Instant};

use crate::map::projection::Viewport;
use crate::map::raster::Raster;
use crate::scale::lerp_color;
use crate::state::Paint;
use crate::transition::Easing;

/// Choropleth state: the projected geometry plus the current fill of every
/// unit, with an optional eased transition from the previous fills.
pub struct MapRenderer {
    raster: Option<Raster>,
    from: Vec<Color>,
    to: Vec<Color>,
    easing: Easing,
}

impl MapRenderer {
    pub fn new(units: usize, now: Instant) -> Self {
        Self {
            raster: None,
            from: vec![Color::Reset; units],
            to: vec![Color::Reset; units],
            easing: Easing::settled(now),
        }
    }

    /// Project and rasterize the geometry for a `cols` x `rows` map pane.
    /// Does nothing when the size is unchanged; a new size resets the view.
    pub fn layout<S>(&mut self, shapes: &[S], cols: usize, rows: usize)
    where
        S: Borrow<MultiPolygon<f64>>,
    {
        if cols == 0 || rows == 0 {
            self.raster = None;
            return;
        }
        if self.raster.as_ref().is_some_and(|r| r.size() == (cols, rows)) {
            return;
        }
        self.raster = Some(Raster::build(shapes, cols, rows));
    }

    /// Adjust the current view and rasterize again through it
    pub fn reproject<S>(&mut self, shapes: &[S], adjust: impl FnOnce(&mut Viewport))
    where
        S: Borrow<MultiPolygon<f64>>,
    {
        let Some(raster) = &self.raster else {
            return;
        };
        let mut viewport = raster.viewport().clone();
        adjust(&mut viewport);
        self.raster = Some(Raster::with_viewport(shapes, viewport));
    }

    /// Back to the view fitted to the whole geometry
    pub fn reset_view<S>(&mut self, shapes: &[S])
    where
        S: Borrow<MultiPolygon<f64>>,
    {
        if let Some((cols, rows)) = self.raster.as_ref().map(Raster::size) {
            self.raster = Some(Raster::build(shapes, cols, rows));
        }
    }

    pub fn zoom(&self) -> f64 {
        self.raster.as_ref().map_or(1.0, |r| r.viewport().zoom())
    }

    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    /// Replace the target fills. Eased recolors start from whatever is on
    /// screen at `now`.
    pub fn recolor(&mut self, fills: Vec<Color>, paint: Paint, now: Instant, duration: Duration) {
        if paint == Paint::Eased && !self.easing.is_done(now) {
            let t = self.easing.progress(now);
            self.from = self
                .from
                .iter()
                .zip(&self.to)
                .map(|(a, b)| lerp_color(*a, *b, t))
                .collect();
        } else {
            self.from = std::mem::take(&mut self.to);
        }
        self.to = fills;
        self.easing = Easing::new(now, paint, duration);
    }

    /// Fill of `unit` as displayed at `now`
    pub fn fill(&self, unit: usize, now: Instant) -> Color {
        let Some(&to) = self.to.get(unit) else {
            return Color::Reset;
        };
        let t = self.easing.progress(now);
        if t >= 1.0 {
            return to;
        }
        let from = self.from.get(unit).copied().unwrap_or(to);
        lerp_color(from, to, t)
    }

    /// Target fills of the last recolor pass
    pub fn fills(&self) -> &[Color] {
        &self.to
    }

    pub fn is_transitioning(&self, now: Instant) -> bool {
        !self.easing.is_done(now)
    }
}
