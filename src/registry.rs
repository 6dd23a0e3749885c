//! Meter registry: the ordered meter set and the two-phase line state machine.

use tracing::{debug, warn};

use crate::error::MeterError;
use crate::protocol::{classify_declaration, parse_declaration, parse_value_frame};
use crate::render::Renderer;

/// Container title used when the channels do not share a device.
pub const DEFAULT_TITLE: &str = "VU Meter";

/// A single labeled level indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct Meter {
    label: String,
    /// Current level. Nominally in `[0.0, 1.0]`, stored as received.
    pub fraction: f64,
}

impl Meter {
    fn new(label: String) -> Self {
        Self {
            label,
            fraction: 0.0,
        }
    }

    /// Display label, fixed at creation.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Counters for value frames seen since the declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Frames whose values were applied.
    pub applied: u64,
    /// Frames dropped because a token was not a number.
    pub skipped: u64,
    /// Diagnostic for the most recent dropped frame.
    pub last_error: Option<String>,
}

/// The fixed set of meters built from the declaration frame.
#[derive(Debug, Clone)]
pub struct MeterSet {
    title: String,
    grouped: bool,
    meters: Vec<Meter>,
    pub stats: FrameStats,
}

impl MeterSet {
    /// Container title: the shared device, or the fallback title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether the labels were shortened to their metric part.
    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    pub fn meters(&self) -> &[Meter] {
        &self.meters
    }

    pub fn len(&self) -> usize {
        self.meters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meters.is_empty()
    }

    /// Assign `values[i]` to meter `i`. Returns how many meters changed.
    ///
    /// Missing values leave their meters untouched; extra values are dropped.
    fn apply(&mut self, values: &[f64]) -> usize {
        let mut applied = 0;
        for (meter, value) in self.meters.iter_mut().zip(values) {
            meter.fraction = *value;
            applied += 1;
        }
        applied
    }
}

/// Registry lifecycle.
#[derive(Debug, Clone)]
enum RegistryState {
    /// Waiting for the declaration frame.
    Uninitialized,
    /// Meters exist; every further line is a value frame.
    Active(MeterSet),
}

/// What a single input line did.
#[derive(Debug)]
pub enum LineOutcome {
    /// The declaration created this many meters.
    Declared(usize),
    /// A value frame updated the leading `applied` meters.
    Updated { applied: usize },
    /// A value frame was dropped; meter state is unchanged.
    Skipped(MeterError),
}

/// Owns the meter set for the life of the process.
///
/// Lines must be fed in arrival order through [`MeterRegistry::on_line`].
#[derive(Debug)]
pub struct MeterRegistry {
    state: RegistryState,
    fallback_title: String,
}

impl Default for MeterRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

impl MeterRegistry {
    /// Create an uninitialized registry.
    ///
    /// `fallback_title` is used for the container when channels are not
    /// grouped under a shared device.
    pub fn new(fallback_title: &str) -> Self {
        Self {
            state: RegistryState::Uninitialized,
            fallback_title: fallback_title.to_string(),
        }
    }

    /// Consume one input line.
    ///
    /// The first line declares the meters and asks the renderer for a
    /// container. Every later line is a value frame. Only fatal errors are
    /// returned as `Err`; a bad value frame comes back as
    /// [`LineOutcome::Skipped`].
    pub fn on_line(
        &mut self,
        line: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<LineOutcome, MeterError> {
        match &mut self.state {
            RegistryState::Uninitialized => {
                let identifiers = parse_declaration(line)?;
                let declaration = classify_declaration(&identifiers);
                let grouped = declaration.group_title.is_some();
                let set = MeterSet {
                    title: declaration
                        .group_title
                        .unwrap_or_else(|| self.fallback_title.clone()),
                    grouped,
                    meters: declaration.labels.into_iter().map(Meter::new).collect(),
                    stats: FrameStats::default(),
                };

                renderer.create_container(&set)?;

                debug!(
                    "declared {} meters under {:?} (grouped: {})",
                    set.len(),
                    set.title,
                    grouped
                );
                let count = set.len();
                self.state = RegistryState::Active(set);
                Ok(LineOutcome::Declared(count))
            }
            RegistryState::Active(set) => match parse_value_frame(line) {
                Ok(values) => {
                    let applied = set.apply(&values);
                    set.stats.applied += 1;
                    renderer.invalidate();
                    Ok(LineOutcome::Updated { applied })
                }
                Err(err) => {
                    warn!("skipping value frame: {}", err);
                    set.stats.skipped += 1;
                    set.stats.last_error = Some(err.to_string());
                    renderer.invalidate();
                    Ok(LineOutcome::Skipped(err))
                }
            },
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, RegistryState::Active(_))
    }

    /// The meter set, once the declaration has been consumed.
    pub fn meter_set(&self) -> Option<&MeterSet> {
        match &self.state {
            RegistryState::Active(set) => Some(set),
            RegistryState::Uninitialized => None,
        }
    }

    /// All meters in declaration order. Empty before the declaration.
    pub fn meters(&self) -> &[Meter] {
        self.meter_set().map(MeterSet::meters).unwrap_or(&[])
    }

    /// Meter at `index` in declaration order.
    pub fn meter(&self, index: usize) -> Option<&Meter> {
        self.meters().get(index)
    }
}
