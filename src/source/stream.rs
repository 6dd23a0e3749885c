//! Stream-based line source.
//!
//! Reads newline-delimited lines from an async reader such as stdin, a file
//! or a FIFO.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use super::{LineSource, SourceEvent};

/// Lines buffered between the reader task and the render loop.
const CHANNEL_CAPACITY: usize = 1024;

/// A line source fed by a background reader task.
///
/// Must be created inside a tokio runtime.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use vumeter::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"[\"a\"]\n0.5\n";
/// let source = StreamSource::spawn(Cursor::new(data.to_vec()), "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<String>,
    description: String,
    closed: bool,
    last_error: Arc<Mutex<Option<String>>>,
}

impl StreamSource {
    /// Spawn a background task that reads lines from the given reader.
    ///
    /// Lines are delivered in order. The stream closes at end of input or on
    /// the first read error, which is then reported by [`LineSource::error`].
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let trimmed = line.trim_end_matches(['\n', '\r']).to_string();
                        if tx.send(trimmed).await.is_err() {
                            // Receiver dropped
                            break;
                        }
                    }
                    Err(e) => {
                        if let Ok(mut slot) = error_handle.lock() {
                            *slot = Some(format!("Read error: {}", e));
                        }
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            closed: false,
            last_error,
        }
    }
}

impl LineSource for StreamSource {
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
        self.last_error.lock().ok().and_then(|slot| slot.clone())
    }
}
