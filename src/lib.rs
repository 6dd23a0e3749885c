//! # vumeter
//!
//! Live terminal level meters driven by a line protocol on standard input.
//!
//! The first input line declares the channels as a JSON array of strings;
//! every following line carries one number per channel:
//!
//! ```text
//! ["mic:left", "mic:right"]
//! 0.25 0.60
//! 0.31 0.58
//! ```
//!
//! When every channel is `device:metric` with a shared device, the device
//! becomes the panel title and the meters are labeled by metric alone.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐  lines  ┌─────────────┐  on_line  ┌───────────────┐
//! │  source  │────────▶│     app     │──────────▶│   registry    │
//! │ (stdin)  │         │ (tick loop) │           │ (meter state) │
//! └──────────┘         └──────┬──────┘           └───────┬───────┘
//!                             │ draw                     │ create_container
//!                             ▼                          ▼
//!                      ┌─────────────────────────────────────┐
//!                      │       render::Renderer (ui)         │
//!                      └─────────────────────────────────────┘
//! ```
//!
//! - **[`protocol`]**: declaration and value frame parsing, channel grouping
//! - **[`registry`]**: the ordered meter set and its two-phase state machine
//! - **[`source`]**: non-blocking line sources ([`LineSource`] trait)
//! - **[`app`]**: the driver loop that drains input and redraws on a timer
//! - **[`render`]** and **[`ui`]**: the [`Renderer`] seam and ratatui panel
//! - **[`settings`]**: layered configuration
//!
//! ## Usage
//!
//! ```bash
//! producer | vumeter
//! producer | vumeter --refresh-rate 30 --title "Jobs"
//! ```
//!
//! ### As a library
//!
//! ```
//! use vumeter::{ChannelSource, MeterRegistry};
//! use vumeter::app::App;
//!
//! let (tx, source) = ChannelSource::create("embedded");
//! tx.send("[\"build\", \"test\"]".to_string()).unwrap();
//! let app = App::new(Box::new(source), MeterRegistry::default());
//! ```

pub mod app;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod render;
pub mod settings;
pub mod source;
pub mod ui;

pub use error::MeterError;
pub use protocol::{classify_declaration, parse_declaration, parse_value_frame, Declaration};
pub use registry::{LineOutcome, Meter, MeterRegistry, MeterSet};
pub use render::{Renderer, TerminalRenderer};
pub use settings::Settings;
pub use source::{ChannelSource, LineSource, SourceEvent, StreamSource};
