//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`meters`]: The bordered meter panel, one bar per declared channel
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Panel Layout
//!
//! ```text
//! ╭─ VU Meter ─────────────────────────────────────────────╮
//! │                                                        │
//! │  left   ━━━━━━━━━━━━━━━━━━━━━━━╺━━━━━━━━━━━━━━━━  60%  │
//! │  right  ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━ 100%  │
//! │                                                        │
//! ╰────────────────────────────────────────────────────────╯
//! ```

pub mod meters;
pub mod theme;

pub use meters::Level;
pub use theme::Theme;
