use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use fsc_dash::app::App;
use fsc_dash::config::Cli;
use fsc_dash::data::{self, Timeline, COUNTRY_RANGES};
use fsc_dash::ui;
use ratatui::layout::Rect;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so logs go to a file
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("failed to create log file {}", cli.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();

    let sources = cli.sources();
    tracing::info!(?sources, "loading data");
    let model = match data::load(&sources, Timeline::default(), COUNTRY_RANGES.to_vec()) {
        Ok(model) => model,
        Err(err) => {
            tracing::error!(%err, "initialisation failed");
            return Err(err.into());
        }
    };

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let mut app = App::new(model, cli.timing(), Instant::now());
    let result = run(&mut terminal, &mut app);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Cells moved per horizontal scroll step
const PAN_STEP: i32 = 4;

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.release(mouse.column, mouse.row),
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        MouseEventKind::ScrollLeft => app.pan(-PAN_STEP, 0),
        MouseEventKind::ScrollRight => app.pan(PAN_STEP, 0),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    let size = terminal.size()?;
    app.resize(Rect::new(0, 0, size.width, size.height));

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') => app.quit(),
                    KeyCode::Char('d') | KeyCode::Char('D') => app.cycle_dataset(),
                    KeyCode::Char('c') | KeyCode::Char('C') => app.cycle_country(),
                    KeyCode::Left | KeyCode::Char('h') => app.step_time(-1),
                    KeyCode::Right | KeyCode::Char('l') => app.step_time(1),
                    KeyCode::Home => app.set_time(0),
                    KeyCode::End => app.set_time(usize::MAX),
                    KeyCode::Char(' ') => app.toggle_play(),
                    KeyCode::Char('x') | KeyCode::Esc => app.close_panel(),
                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),
                    KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),
                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                Event::Resize(width, height) => app.resize(Rect::new(0, 0, width, height)),
                _ => {}
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            tracing::info!("quit requested");
            break;
        }
    }

    Ok(())
}
