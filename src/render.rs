//! Display seam between the meter registry and the terminal.
//!
//! The registry only tells a [`Renderer`] when the container must exist and
//! when meter state changed. Redraw timing belongs to the driver loop, see
//! [`crate::app::App::run`].

use std::io::{self, Stdout, Write};

use ratatui::{
    backend::CrosstermBackend,
    layout::{Position, Size},
    Terminal, TerminalOptions, Viewport,
};
use tracing::debug;

use crate::registry::MeterSet;
use crate::ui::{meters, Theme};

/// Something that can display a meter set.
pub trait Renderer {
    /// Create the bordered container for the meter set.
    ///
    /// Called exactly once, right after the declaration frame.
    fn create_container(&mut self, set: &MeterSet) -> io::Result<()>;

    /// Meter state changed since the last draw.
    fn invalidate(&mut self) {}

    /// Redraw the container with the current meter state.
    fn draw(&mut self, set: &MeterSet) -> io::Result<()>;

    /// Release the display. Safe to call more than once.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

type InlineTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Decides whether a timer tick needs a redraw.
///
/// A redraw is due after an invalidation or when the terminal size changed.
#[derive(Debug, Default)]
pub struct RedrawGate {
    dirty: bool,
    last_size: Option<Size>,
}

impl RedrawGate {
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Returns true if a redraw is due, and records it as done.
    pub fn should_draw(&mut self, size: Size) -> bool {
        let due = self.dirty || self.last_size != Some(size);
        self.dirty = false;
        self.last_size = Some(size);
        due
    }
}

/// Renders the meter panel inline on stdout.
///
/// The panel is drawn in an inline viewport below the cursor, so it stays in
/// the scrollback once the process exits.
pub struct TerminalRenderer {
    terminal: Option<InlineTerminal>,
    gate: RedrawGate,
    theme: Theme,
    peak_level: f64,
}

impl TerminalRenderer {
    pub fn new(theme: Theme, peak_level: f64) -> Self {
        Self {
            terminal: None,
            gate: RedrawGate::default(),
            theme,
            peak_level,
        }
    }
}

impl Renderer for TerminalRenderer {
    fn create_container(&mut self, set: &MeterSet) -> io::Result<()> {
        let (_, height) = meters::panel_size(set);
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Inline(height),
            },
        )?;
        debug!("created inline viewport of height {}", height);
        self.terminal = Some(terminal);
        self.gate.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.gate.invalidate();
    }

    fn draw(&mut self, set: &MeterSet) -> io::Result<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            return Ok(());
        };
        if !self.gate.should_draw(terminal.size()?) {
            return Ok(());
        }
        let theme = &self.theme;
        let peak_level = self.peak_level;
        terminal.draw(|frame| {
            let area = frame.area();
            meters::render(frame, set, theme, peak_level, area);
        })?;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        let Some(mut terminal) = self.terminal.take() else {
            return Ok(());
        };
        // Leave the cursor on the line after the panel.
        let area = terminal.get_frame().area();
        terminal.set_cursor_position(Position::new(0, area.bottom().saturating_sub(1)))?;
        terminal.show_cursor()?;
        writeln!(terminal.backend_mut())?;
        terminal.backend_mut().flush()
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}
