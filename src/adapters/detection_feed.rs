//! JSON-lines detection feed.
//!
//! Stands in for the camera + detector on the host: each input line is one
//! frame, a JSON array of detections as the detector reports them.
//!
//! ```text
//! [{"label":"bottle","confidence":0.91,"box":[12,40,180,300]}]
//! []
//! [{"label":"apple","confidence":0.66,"box":[0,0,50,50]},{"label":"book","confidence":0.8,"box":[60,0,200,90]}]
//! ```
//!
//! A blank line is a frame with no detections.  A line that does not
//! parse is reported as [`DetectionError::Malformed`] so the pipeline skips
//! just that frame.

use std::io::BufRead;

use log::debug;

use crate::app::ports::DetectionSource;
use crate::detection::Detection;
use crate::error::DetectionError;

pub struct JsonLinesFeed<R> {
    reader: R,
    line: String,
    line_no: u64,
}

impl<R: BufRead> JsonLinesFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> DetectionSource for JsonLinesFeed<R> {
    fn next_frame(&mut self) -> Result<Option<Vec<Detection>>, DetectionError> {
        self.line.clear();
        let n = self
            .reader
            .read_line(&mut self.line)
            .map_err(|_| DetectionError::Io)?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        let text = self.line.trim();
        if text.is_empty() {
            return Ok(Some(Vec::new()));
        }
        serde_json::from_str(text).map(Some).map_err(|e| {
            debug!("feed: line {} rejected: {}", self.line_no, e);
            DetectionError::Malformed
        })
    }
}
