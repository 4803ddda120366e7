use geo::MultiPolygon;
use ratatui::layout::Rect;
use std::time::Instant;

use crate::animation::{AnimationDriver, Debouncer};
use crate::config::Timing;
use crate::data::DataModel;
use crate::legend::{legend, LegendEntry};
use crate::map::{MapRenderer, Viewport};
use crate::resolve::{fill_colors, resolve_unit, tooltip, Tooltip};
use crate::series::{build_series, SeriesChart};
use crate::state::{Action, Effects, Paint, Selection};
use crate::transition::MarkerTween;
use crate::ui::{self, Panes};

/// Application state
pub struct App {
    pub model: DataModel,
    pub selection: Selection,
    pub map: MapRenderer,
    pub legend: Vec<LegendEntry>,
    /// Chart for the selected unit, `None` while the panel shows the intro
    pub series: Option<SeriesChart>,
    /// Chart cursor, in period units
    pub marker: MarkerTween,
    pub panes: Panes,
    /// Time of the last tick; eased visuals are sampled at this instant
    pub clock: Instant,
    /// Current mouse position
    pub mouse_pos: Option<(u16, u16)>,
    pub should_quit: bool,
    /// Last mouse position of a left-button press on the map
    grab: Option<(u16, u16)>,
    /// Whether the current map press has turned into a pan
    panned: bool,
    animation: AnimationDriver,
    debounce: Debouncer,
    timing: Timing,
}

impl App {
    pub fn new(model: DataModel, timing: Timing, now: Instant) -> Self {
        let units = model.units.len();
        let mut app = Self {
            model,
            selection: Selection::default(),
            map: MapRenderer::new(units, now),
            legend: Vec::new(),
            series: None,
            marker: MarkerTween::at(0.0, now),
            panes: Panes::default(),
            clock: now,
            mouse_pos: None,
            should_quit: false,
            grab: None,
            panned: false,
            animation: AnimationDriver::new(timing.interval),
            debounce: Debouncer::new(timing.debounce),
            timing,
        };
        app.run_effects(Effects {
            recolor: Some(Paint::Immediate),
            legend: true,
            ..Effects::none()
        });
        app
    }

    fn periods(&self) -> usize {
        self.model.timeline.len()
    }

    /// Apply an action to the selection and run the renderers it asks for
    pub fn dispatch(&mut self, action: Action) {
        let effects = self.selection.apply(action, self.periods());
        tracing::trace!(?action, ?effects, "dispatch");
        self.run_effects(effects);
    }

    fn run_effects(&mut self, fx: Effects) {
        let now = self.clock;
        let sel = self.selection;

        if fx.debounce {
            self.debounce.schedule(now);
        }
        if let Some(paint) = fx.recolor {
            let fills = fill_colors(&self.model, &sel);
            self.map.recolor(fills, paint, now, self.timing.transition);
        }
        if fx.legend {
            self.legend = legend(sel.dataset);
        }
        if fx.rebuild_series {
            self.series = sel
                .selected
                .and_then(|unit| build_series(&self.model, sel.dataset, unit));
            self.marker = MarkerTween::at(sel.time_index as f64, now);
        }
        if fx.hide_series {
            self.series = None;
        }
        if let Some(paint) = fx.marker {
            self.marker
                .retarget(sel.time_index as f64, now, paint, self.timing.transition);
        }
    }

    /// Advance timers: the animation step, a settled slider burst, and the
    /// clock eased visuals are sampled at
    pub fn tick(&mut self, now: Instant) {
        self.clock = now;
        let periods = self.periods();
        if let Some(effects) = self.animation.poll(&mut self.selection, periods, now) {
            self.run_effects(effects);
        }
        if self.debounce.fire(now) {
            self.run_effects(Effects::time_changed(self.selection.paint()));
        }
    }

    /// Recompute panes and re-rasterize the map for a new terminal size
    pub fn resize(&mut self, area: Rect) {
        self.panes = ui::layout(area);
        let inner = self.panes.map_inner;
        let shapes: Vec<&MultiPolygon<f64>> = self.model.shapes().collect();
        self.map
            .layout(&shapes, inner.width as usize, inner.height as usize);
    }

    pub fn cycle_dataset(&mut self) {
        self.dispatch(Action::SetDataset(self.selection.dataset.next()));
    }

    pub fn cycle_country(&mut self) {
        let next = self.selection.country.next(self.model.countries.len());
        self.dispatch(Action::SetCountry(next));
    }

    /// Move the slider by `delta` periods
    pub fn step_time(&mut self, delta: isize) {
        let last = self.periods().saturating_sub(1);
        let index = self.selection.time_index.saturating_add_signed(delta).min(last);
        self.set_time(index);
    }

    pub fn set_time(&mut self, index: usize) {
        self.dispatch(Action::SetTime(index));
    }

    pub fn toggle_play(&mut self) {
        self.dispatch(Action::TogglePlay);
    }

    pub fn close_panel(&mut self) {
        self.dispatch(Action::ClosePanel);
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Unit drawn at a screen position, regardless of the country filter
    pub fn unit_at(&self, col: u16, row: u16) -> Option<usize> {
        let inner = self.panes.map_inner;
        if !ui::hit(inner, col, row) {
            return None;
        }
        self.map
            .raster()?
            .unit_at((col - inner.x) as usize, (row - inner.y) as usize)
    }

    /// Tooltip for the unit under the mouse, with the mouse position
    pub fn hover_tooltip(&self) -> Option<((u16, u16), Tooltip)> {
        let (col, row) = self.mouse_pos?;
        let unit = self.unit_at(col, row)?;
        tooltip(&self.model, &self.selection, unit).map(|tip| ((col, row), tip))
    }

    /// Left click: close button, slider, unit selection or map background
    pub fn click(&mut self, col: u16, row: u16) {
        let panes = self.panes;
        if self.series.is_some() && ui::hit(panes.close, col, row) {
            self.close_panel();
        } else if ui::hit(panes.play, col, row) {
            self.toggle_play();
        } else if ui::hit(panes.slider, col, row) {
            self.set_time(ui::slider_index(panes.slider, col, self.periods()));
        } else if ui::hit(panes.map_inner, col, row) {
            match self.unit_at(col, row) {
                Some(unit) => {
                    if resolve_unit(&self.model, self.selection.country, unit).is_some() {
                        tracing::debug!(unit, "unit selected");
                        self.dispatch(Action::SelectUnit(unit));
                    }
                }
                None => self.close_panel(),
            }
        }
    }

    /// Left-button press. On the map it starts a possible pan and selection
    /// waits for the release; elsewhere it clicks immediately.
    pub fn press(&mut self, col: u16, row: u16) {
        if ui::hit(self.panes.map_inner, col, row) {
            self.grab = Some((col, row));
            self.panned = false;
        } else {
            self.click(col, row);
        }
    }

    /// Left-button drag: scrubs the slider or pans a grabbed map
    pub fn drag(&mut self, col: u16, row: u16) {
        if let Some((last_col, last_row)) = self.grab {
            let (dx, dy) = (last_col as i32 - col as i32, last_row as i32 - row as i32);
            if dx != 0 || dy != 0 {
                self.pan(dx, dy);
                self.grab = Some((col, row));
                self.panned = true;
            }
        } else if ui::hit(self.panes.slider, col, row) {
            self.set_time(ui::slider_index(self.panes.slider, col, self.periods()));
        }
    }

    /// Left-button release: a map press that never panned is a click
    pub fn release(&mut self, col: u16, row: u16) {
        if self.grab.take().is_some() && !self.panned {
            self.click(col, row);
        }
    }

    /// Braille pixel at the center of a map cell
    fn map_pixel(&self, col: u16, row: u16) -> Option<(f64, f64)> {
        let inner = self.panes.map_inner;
        if !ui::hit(inner, col, row) {
            return None;
        }
        let px = (col - inner.x) as f64 * 2.0 + 1.0;
        let py = (row - inner.y) as f64 * 4.0 + 2.0;
        Some((px, py))
    }

    fn reproject(&mut self, adjust: impl FnOnce(&mut Viewport)) {
        let shapes: Vec<&MultiPolygon<f64>> = self.model.shapes().collect();
        self.map.reproject(&shapes, adjust);
        tracing::debug!(zoom = self.map.zoom(), "map view changed");
    }

    /// Zoom in around the map cell under the cursor
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.reproject(|vp| vp.zoom_in_at(px, py));
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.reproject(|vp| vp.zoom_out_at(px, py));
        }
    }

    /// Zoom around the middle of the map
    pub fn zoom_in(&mut self) {
        self.reproject(|vp| vp.zoom_in_at(vp.width as f64 / 2.0, vp.height as f64 / 2.0));
    }

    pub fn zoom_out(&mut self) {
        self.reproject(|vp| vp.zoom_out_at(vp.width as f64 / 2.0, vp.height as f64 / 2.0));
    }

    /// Pan the map by a delta in terminal cells
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.reproject(|vp| vp.pan(dx * 2, dy * 4));
    }

    pub fn reset_view(&mut self) {
        let shapes: Vec<&MultiPolygon<f64>> = self.model.shapes().collect();
        self.map.reset_view(&shapes);
    }
}
