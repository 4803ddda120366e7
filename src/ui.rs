use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::dataset::DatasetType;
use crate::map::Raster;
use crate::scale::NO_DATA;
use crate::series::{tick_indices, SeriesChart, PRIMARY_DOMAIN};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Widget, Wrap},
    Frame,
};

const BORDER: Color = Color::Rgb(0x55, 0x55, 0x55);
const SELECTED: Color = Color::Cyan;
const CURSOR: Color = Color::Gray;

/// Screen regions, recomputed on every resize. Hit testing and rendering
/// both read from here so they always agree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Panes {
    pub header: Rect,
    /// Map pane including its border
    pub map: Rect,
    /// Cells the raster is drawn into
    pub map_inner: Rect,
    pub panel: Rect,
    /// The `[x]` in the panel title
    pub close: Rect,
    pub legend: Rect,
    pub play: Rect,
    /// Slider track
    pub slider: Rect,
    pub period: Rect,
}

pub fn layout(area: Rect) -> Panes {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Map + panel
            Constraint::Length(1), // Legend
            Constraint::Length(1), // Slider
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(rows[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(5), Constraint::Min(1), Constraint::Length(10)])
        .split(rows[3]);

    let panel = body[1];
    let close = Rect {
        x: panel.right().saturating_sub(4),
        y: panel.y,
        width: 3.min(panel.width),
        height: 1.min(panel.height),
    };

    Panes {
        header: rows[0],
        map: body[0],
        map_inner: Block::default().borders(Borders::ALL).inner(body[0]),
        panel,
        close,
        legend: rows[2],
        play: bottom[0],
        slider: bottom[1],
        period: bottom[2],
    }
}

pub fn hit(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x && col < rect.right() && row >= rect.y && row < rect.bottom()
}

/// Period index under column `col` of the slider track
pub fn slider_index(track: Rect, col: u16, periods: usize) -> usize {
    if periods <= 1 || track.width <= 1 {
        return 0;
    }
    let span = track.width as usize - 1;
    let offset = (col.saturating_sub(track.x) as usize).min(span);
    (offset * (periods - 1) + span / 2) / span
}

/// Column of the slider knob for `index`
pub fn slider_column(track: Rect, index: usize, periods: usize) -> u16 {
    if periods <= 1 || track.width <= 1 {
        return track.x;
    }
    let span = track.width as usize - 1;
    let last = periods - 1;
    track.x + ((index.min(last) * span + last / 2) / last) as u16
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let panes = app.panes;

    render_header(frame, app, panes.header);
    render_map(frame, app, panes.map);
    render_tooltip(frame, app, panes.map_inner);
    match &app.series {
        Some(chart) => render_chart(frame, app, chart, panes.panel),
        None => render_intro(frame, panes.panel),
    }
    render_legend(frame, app, panes.legend);
    render_slider(frame, app, &panes);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let sel = &app.selection;
    let dim = Style::default().fg(Color::DarkGray);
    let (play, play_color) = if sel.animating {
        ("▶ playing", Color::Green)
    } else {
        ("❚❚ paused", Color::DarkGray)
    };

    let header = Line::from(vec![
        Span::styled(
            " East Africa Food Security ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled("| [d] ", dim),
        Span::styled(sel.dataset.name(), Style::default().fg(Color::Yellow)),
        Span::styled(" | [c] ", dim),
        Span::styled(sel.country.name(&app.model.countries), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", dim),
        Span::styled(play, Style::default().fg(play_color)),
        Span::styled(" | ", dim),
        Span::styled(app.model.timeline.label(sel.time_index), Style::default().fg(Color::Magenta)),
        Span::styled(format!(" | zoom {:.1}x", app.map.zoom()), dim),
        Span::styled(" | space:play ←/→:time +/-:zoom r:reset x:close q:quit", dim),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", app.selection.dataset.label()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(raster) = app.map.raster() else {
        return;
    };
    let fills = (0..app.model.units.len())
        .map(|unit| app.map.fill(unit, app.clock))
        .collect();
    let widget = MapWidget {
        raster,
        fills,
        selected: app.selection.selected.map(|unit| raster.outline(unit)),
    };
    frame.render_widget(widget, inner);
}

/// Filled units with the border overlay on top
struct MapWidget<'a> {
    raster: &'a Raster,
    /// Displayed fill per unit
    fills: Vec<Color>,
    selected: Option<BrailleCanvas>,
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (cols, rows) = self.raster.size();
        let borders = self.raster.borders();

        for cy in 0..rows.min(area.height as usize) {
            let y = area.y + cy as u16;
            for cx in 0..cols.min(area.width as usize) {
                let cell = &mut buf[(area.x + cx as u16, y)];
                if let Some(&fill) = self.raster.unit_at(cx, cy).and_then(|u| self.fills.get(u)) {
                    cell.set_bg(fill);
                }

                let highlight = self.selected.as_ref().and_then(|c| c.glyph(cx, cy));
                if let Some(ch) = highlight {
                    cell.set_char(ch).set_fg(SELECTED);
                } else if let Some(ch) = borders.glyph(cx, cy) {
                    cell.set_char(ch).set_fg(BORDER);
                }
            }
        }
    }
}

fn render_tooltip(frame: &mut Frame, app: &App, bounds: Rect) {
    let Some(((col, row), tip)) = app.hover_tooltip() else {
        return;
    };
    let lines = tip.lines();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 2;
    let height = lines.len() as u16 + 2;

    let x = (col + 2).min(bounds.right().saturating_sub(width)).max(bounds.x);
    let y = (row + 1).min(bounds.bottom().saturating_sub(height)).max(bounds.y);
    let popup = Rect::new(x, y, width.min(bounds.width), height.min(bounds.height));

    let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        popup,
    );
}

fn render_intro(frame: &mut Frame, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let text = vec![
        Line::from(Span::styled(
            "Food security, vegetation and conflict",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from("Each unit is an aggregated food-security zone in East Africa."),
        Line::from("Hover a unit to read its value for the selected period."),
        Line::from("Click a unit to chart its IPC history against the active indicator."),
        Line::default(),
        Line::from(Span::styled("d  cycle indicator", dim)),
        Line::from(Span::styled("c  cycle country", dim)),
        Line::from(Span::styled("←/→  step through time, space to play", dim)),
        Line::from(Span::styled("scroll or +/-  zoom, drag to pan, r to reset", dim)),
    ];
    frame.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" About "),
        ),
        area,
    );
}

fn render_chart(frame: &mut Frame, app: &App, chart: &SeriesChart, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" Unit {} ", chart.unit_id),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .title_top(Line::from(Span::styled("[x]", Style::default().fg(Color::Red))).right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let right_axis = if chart.secondary.is_some() { 8 } else { 0 };
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(right_axis)])
        .split(inner);

    let primary = chart.primary_segments();
    let secondary = chart.secondary_segments();
    let position = app.marker.position(app.clock);
    let cursor = [(position, PRIMARY_DOMAIN.0), (position, PRIMARY_DOMAIN.1)];

    let mut datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(CURSOR))
        .data(&cursor)];
    let primary_color = DatasetType::Primary.series_color();
    datasets.extend(primary.iter().map(|seg| series_line(seg, primary_color)));
    if let Some(series) = &chart.secondary {
        datasets.extend(secondary.iter().map(|seg| series_line(seg, series.color)));
    }

    let timeline = &app.model.timeline;
    let ticks = (cols[0].width / 10).clamp(2, 8) as usize;
    let x_labels: Vec<Line> = tick_indices(timeline.len(), ticks)
        .into_iter()
        .map(|i| Line::from(timeline.label(i)))
        .collect();
    let x_max = timeline.len().saturating_sub(1).max(1) as f64;

    let widget = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(DatasetType::Primary.label(), Style::default().fg(primary_color)))
                .style(Style::default().fg(Color::DarkGray))
                .bounds([PRIMARY_DOMAIN.0, PRIMARY_DOMAIN.1])
                .labels(["1", "2", "3", "4", "5"].map(Line::from).to_vec()),
        );
    frame.render_widget(widget, cols[0]);

    if let Some(series) = &chart.secondary {
        // Chart rows: title on top, axis line and labels at the bottom
        let height = cols[1].height as usize;
        if let Some([hi_row, mid_row, lo_row]) = right_axis_rows(height) {
            let [lo, mid, hi] = series.axis_labels();
            let style = Style::default().fg(series.color);
            let mut lines = vec![Line::default(); height];
            lines[0] = Line::from(Span::styled(series.label, style));
            lines[hi_row] = Line::from(Span::styled(hi, style));
            lines[mid_row] = Line::from(Span::styled(mid, style));
            lines[lo_row] = Line::from(Span::styled(lo, style));
            frame.render_widget(Paragraph::new(lines), cols[1]);
        }
    }
}

/// Rows of the high, middle and low right-axis labels in a column `height`
/// tall. Row 0 holds the series label and the last two rows line up with the
/// chart's axis line and tick labels.
fn right_axis_rows(height: usize) -> Option<[usize; 3]> {
    if height < 6 {
        return None;
    }
    let (hi, lo) = (1, height - 3);
    Some([hi, (hi + lo + 1) / 2, lo])
}

/// A contiguous run of one series; lone points are drawn as dots
fn series_line(points: &[(f64, f64)], color: Color) -> Dataset<'_> {
    let graph_type = if points.len() == 1 {
        GraphType::Scatter
    } else {
        GraphType::Line
    };
    Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(graph_type)
        .style(Style::default().fg(color))
        .data(points)
}

fn render_legend(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        format!(" {}: ", app.selection.dataset.label()),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for entry in &app.legend {
        spans.push(Span::styled("  ", Style::default().bg(entry.color)));
        spans.push(Span::raw(format!(" {}  ", entry.label)));
    }
    spans.push(Span::styled("  ", Style::default().bg(NO_DATA)));
    spans.push(Span::styled(" no data", Style::default().fg(Color::DarkGray)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_slider(frame: &mut Frame, app: &App, panes: &Panes) {
    let sel = &app.selection;
    let periods = app.model.timeline.len();

    let play = if sel.animating { " ❚❚ " } else { " ▶ " };
    frame.render_widget(
        Paragraph::new(Span::styled(play, Style::default().fg(Color::Green))),
        panes.play,
    );

    let track = panes.slider;
    let knob = slider_column(track, sel.time_index, periods).saturating_sub(track.x) as usize;
    let bar: String = (0..track.width as usize)
        .map(|i| if i == knob { '●' } else { '─' })
        .collect();
    frame.render_widget(
        Paragraph::new(Span::styled(bar, Style::default().fg(Color::DarkGray))),
        track,
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {}", app.model.timeline.label(sel.time_index)),
            Style::default().fg(Color::Magenta),
        )),
        panes.period,
    );
}
