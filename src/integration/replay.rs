//! Replay of recorded detector output.
//!
//! A recording stands in for both the decoder and the detector: it knows the
//! frame rate and frame count of the original video and, for any frame
//! number, the raw detections (or the failure) the detector produced there.
//!
//! ```json
//! {
//!   "fps": 30,
//!   "frame_count": 12,
//!   "frames": {
//!     "5":  { "detections": [{ "class": "car", "confidence": 0.9, "bbox": [0, 0, 10, 10] }] },
//!     "10": { "error": "inference timed out" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::tracker::Detection;

use super::{DetectionSource, VideoSource};

/// Detector output recorded for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    #[serde(default)]
    pub detections: Vec<Detection>,
    /// When set, the detector failed on this frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub fps: u32,
    pub frame_count: u64,
    /// Keyed by 1-based frame number; absent frames had no detections
    #[serde(default)]
    pub frames: BTreeMap<u64, RecordedFrame>,
}

impl Recording {
    /// Load a recording from a JSON file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let recording: Recording = serde_json::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            fps = recording.fps,
            frame_count = recording.frame_count,
            "loaded recording"
        );
        Ok(recording)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Split into a frame source and the matching detector.
    pub fn into_replay(self) -> (ReplaySource, ReplayDetector) {
        let source = ReplaySource {
            fps: self.fps,
            frame_count: self.frame_count,
            read: 0,
        };
        let detector = ReplayDetector {
            frames: self.frames,
        };
        (source, detector)
    }
}

/// Placeholder frame carrying only its position in the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayFrame {
    pub number: u64,
}

#[derive(Debug, Clone)]
pub struct ReplaySource {
    fps: u32,
    frame_count: u64,
    read: u64,
}

impl VideoSource for ReplaySource {
    type Frame = ReplayFrame;
    type Error = Infallible;

    fn fps(&self) -> u32 {
        self.fps
    }

    fn next_frame(&mut self) -> std::result::Result<Option<ReplayFrame>, Infallible> {
        if self.read >= self.frame_count {
            return Ok(None);
        }
        self.read += 1;
        Ok(Some(ReplayFrame { number: self.read }))
    }
}

/// Failure replayed from a recording.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("recorded detector failure: {0}")]
pub struct RecordedFailure(pub String);

#[derive(Debug, Clone, Default)]
pub struct ReplayDetector {
    frames: BTreeMap<u64, RecordedFrame>,
}

impl DetectionSource<ReplayFrame> for ReplayDetector {
    type Error = RecordedFailure;

    fn detect(&mut self, frame: &ReplayFrame) -> std::result::Result<Vec<Detection>, Self::Error> {
        match self.frames.get(&frame.number) {
            Some(RecordedFrame {
                error: Some(msg), ..
            }) => Err(RecordedFailure(msg.clone())),
            Some(recorded) => Ok(recorded.detections.clone()),
            None => Ok(Vec::new()),
        }
    }
}
