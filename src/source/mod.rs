//! Line source abstraction for the input stream.
//!
//! A source delivers raw protocol lines in arrival order without blocking the
//! render loop. Reading happens in the background; the driver drains whatever
//! has arrived on each tick.

mod channel;
mod stream;

pub use channel::ChannelSource;
pub use stream::StreamSource;

use std::fmt::Debug;

/// An item delivered by a [`LineSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// One input line, without its line terminator.
    Line(String),
    /// The stream ended. No further events follow.
    Closed,
}

/// Trait for receiving protocol lines from various inputs.
///
/// # Example
///
/// ```
/// use vumeter::{ChannelSource, LineSource, SourceEvent};
///
/// let (tx, mut source) = ChannelSource::create("example");
/// tx.send("[\"left\", \"right\"]".to_string()).unwrap();
/// assert!(matches!(source.poll(), Some(SourceEvent::Line(_))));
/// ```
pub trait LineSource: Send + Debug {
    /// Poll for the next line.
    ///
    /// Returns `None` if nothing has arrived yet. This method must not block.
    fn poll(&mut self) -> Option<SourceEvent>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// The read error that ended the stream, if any.
    fn error(&self) -> Option<String>;
}
