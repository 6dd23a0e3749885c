//! Render driver: feeds input lines to the registry and redraws on a timer.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use tracing::info;

use crate::error::MeterError;
use crate::registry::MeterRegistry;
use crate::render::Renderer;
use crate::source::{LineSource, SourceEvent};

/// Upper bound on lines consumed between two redraws.
pub const MAX_LINES_PER_TICK: usize = 4096;

/// Totals reported when the driver stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines read, declaration included.
    pub lines: u64,
    pub frames_applied: u64,
    pub frames_skipped: u64,
    /// Stopped by the shutdown flag rather than end of input.
    pub interrupted: bool,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    pub running: bool,
    source: Box<dyn LineSource>,
    registry: MeterRegistry,
    lines_read: u64,
}

impl App {
    /// Create a new App reading from `source` into `registry`.
    pub fn new(source: Box<dyn LineSource>, registry: MeterRegistry) -> Self {
        Self {
            running: true,
            source,
            registry,
            lines_read: 0,
        }
    }

    /// Returns a description of the current line source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    pub fn registry(&self) -> &MeterRegistry {
        &self.registry
    }

    /// Consume the lines that have arrived, up to [`MAX_LINES_PER_TICK`].
    ///
    /// Returns the number of lines consumed. Clears `running` at end of input.
    /// Only fatal errors are returned.
    pub fn pump(&mut self, renderer: &mut dyn Renderer) -> Result<usize, MeterError> {
        let mut consumed = 0;
        while consumed < MAX_LINES_PER_TICK {
            match self.source.poll() {
                Some(SourceEvent::Line(line)) => {
                    consumed += 1;
                    self.lines_read += 1;
                    self.registry.on_line(&line, renderer)?;
                }
                Some(SourceEvent::Closed) => {
                    self.running = false;
                    break;
                }
                None => break,
            }
        }
        Ok(consumed)
    }

    /// Draw the current meter state, if the meters exist yet.
    pub fn redraw(&self, renderer: &mut dyn Renderer) -> io::Result<()> {
        match self.registry.meter_set() {
            Some(set) => renderer.draw(set),
            None => Ok(()),
        }
    }

    /// Run until end of input, a fatal error, or `shutdown` is set.
    ///
    /// The renderer is finished on every path. A read error on the source is
    /// returned as an error after teardown.
    pub fn run(
        &mut self,
        renderer: &mut dyn Renderer,
        refresh: Duration,
        shutdown: &AtomicBool,
    ) -> Result<RunSummary> {
        let result = self.run_loop(renderer, refresh, shutdown);
        let finished = renderer.finish();
        let interrupted = result?;
        finished?;

        if let Some(err) = self.source.error() {
            bail!("{}: {}", self.source.description(), err);
        }

        Ok(self.summary(interrupted))
    }

    fn run_loop(
        &mut self,
        renderer: &mut dyn Renderer,
        refresh: Duration,
        shutdown: &AtomicBool,
    ) -> Result<bool> {
        loop {
            let tick = Instant::now();
            let consumed = self.pump(renderer)?;
            self.redraw(renderer)?;

            if !self.running {
                info!("end of input from {}", self.source.description());
                return Ok(false);
            }
            if shutdown.load(Ordering::Relaxed) {
                info!("shutdown requested");
                self.running = false;
                return Ok(true);
            }
            // Keep reading without a pause while a backlog is queued.
            if consumed < MAX_LINES_PER_TICK {
                if let Some(rest) = refresh.checked_sub(tick.elapsed()) {
                    thread::sleep(rest);
                }
            }
        }
    }

    fn summary(&self, interrupted: bool) -> RunSummary {
        let stats = self.registry.meter_set().map(|set| set.stats.clone()).unwrap_or_default();
        RunSummary {
            lines: self.lines_read,
            frames_applied: stats.applied,
            frames_skipped: stats.skipped,
            interrupted,
        }
    }
}
