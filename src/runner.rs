//! Line-oriented frame input: each line holds one frame as a JSON array of
//! detections.

use crossbeam_channel::{bounded, select, Receiver};
use std::io::{self, BufRead};
use std::thread;
use tracing::{debug, warn};

use crate::detection::Detection;
use crate::error::Error;
use crate::frame::Frame;
use crate::processor::{FrameProcessor, FrameReport};

const LINE_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    /// Lines that were not a valid detections array.
    pub skipped: u64,
}

/// Feeds every line into `processor` until `lines` ends.
///
/// Blank lines are ignored and malformed lines are logged and skipped. A
/// read error, a processing error or an error from `on_frame` ends the run.
pub fn count_lines<I, F>(
    processor: &mut FrameProcessor,
    lines: I,
    mut on_frame: F,
) -> Result<RunStats, Error>
where
    I: IntoIterator<Item = io::Result<String>>,
    F: FnMut(&Frame, &FrameReport) -> Result<(), Error>,
{
    let mut stats = RunStats::default();

    for (idx, line) in lines.into_iter().enumerate() {
        let lineno = idx as u64 + 1;
        let line = line?;

        if line.trim().is_empty() {
            continue;
        }

        let detections: Vec<Detection> = match serde_json::from_str(&line) {
            Ok(dets) => dets,
            Err(err) => {
                warn!(line = lineno, error = %err, "skipping malformed frame");
                stats.skipped += 1;
                continue;
            }
        };

        let frame = Frame::new(lineno, detections);
        let report = processor
            .process_frame(&frame)
            .map_err(|err| Error::Frame {
                line: lineno,
                source: Box::new(err),
            })?;

        debug!(
            line = frame.index,
            detections = frame.detections.len(),
            crossings = report.crossings.len(),
            "frame processed"
        );

        stats.frames += 1;
        on_frame(&frame, &report)?;
    }

    Ok(stats)
}

/// Input lines that stop as soon as `stop` disconnects, even while the
/// underlying reader is blocked waiting for more data.
pub struct FrameLines {
    lines: Receiver<io::Result<String>>,
    stop: Receiver<()>,
}

impl FrameLines {
    pub fn new(lines: Receiver<io::Result<String>>, stop: Receiver<()>) -> Self {
        Self { lines, stop }
    }

    /// Reads `reader` on a background thread.
    pub fn spawn<R>(reader: R, stop: Receiver<()>) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = bounded(LINE_BUFFER);

        thread::spawn(move || {
            for line in reader.lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        Self::new(rx, stop)
    }
}

impl Iterator for FrameLines {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        select! {
            recv(self.lines) -> line => line.ok(),
            recv(self.stop) -> _ => None,
        }
    }
}
