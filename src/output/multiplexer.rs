// src/output/multiplexer.rs

//! Line-oriented merge of child process streams.
//!
//! Each stream is read by its own Tokio task. A line is only written once
//! its terminating newline has been read (or the stream has ended), and the
//! whole `<label> <line>\n` record is written under the sink lock, so lines
//! from different processes never interleave mid-line. Lines of one stream
//! keep their order; there is no ordering across streams.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::palette::Label;

/// Shared destination for all process output.
#[derive(Clone)]
pub struct OutputSink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSink").finish_non_exhaustive()
    }
}

impl OutputSink {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Write one complete, labelled line.
    pub fn write_line(&self, label: &Label, line: &str) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("output sink lock poisoned"))?;
        writeln!(guard, "{label} {line}")?;
        guard.flush()
    }
}

/// Spawn a task that copies `stream` into `sink` line by line.
///
/// The task ends when the stream reaches EOF or fails to read.
pub fn attach_stream<R>(sink: OutputSink, label: Label, stream: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(trim_line_ending(&buf));
                    if let Err(e) = sink.write_line(&label, &line) {
                        warn!(process = %label.name(), error = %e, "failed to write output line");
                        break;
                    }
                }
                Err(e) => {
                    debug!(process = %label.name(), error = %e, "stream read failed");
                    break;
                }
            }
        }
    })
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
