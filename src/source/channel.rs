//! Channel-based line source.
//!
//! Receives protocol lines pushed from elsewhere in the same process. Useful
//! when embedding the meter display in another program.

use tokio::sync::mpsc;

use super::{LineSource, SourceEvent};

/// A line source fed through an unbounded channel.
///
/// The stream closes once every sender has been dropped.
///
/// # Example
///
/// ```
/// use vumeter::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("jobs");
/// tx.send("[\"build\", \"test\"]".to_string()).unwrap();
/// tx.send("0.5 0.1".to_string()).unwrap();
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::UnboundedReceiver<String>,
    description: String,
    closed: bool,
}

impl ChannelSource {
    /// Create a new channel source from a receiver.
    pub fn new(receiver: mpsc::UnboundedReceiver<String>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            closed: false,
        }
    }

    /// Create a channel pair. Returns (sender, source).
    pub fn create(source_description: &str) -> (mpsc::UnboundedSender<String>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx, source_description))
    }
}

impl LineSource for ChannelSource {
    fn poll(&mut self) -> Option<SourceEvent> {
        if self.closed {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(line) => Some(SourceEvent::Line(line)),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.closed = true;
                Some(SourceEvent::Closed)
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        None
    }
}
