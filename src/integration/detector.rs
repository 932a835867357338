//! Traits for the frame source, the detection backend and frame encoding.

use std::convert::Infallible;
use std::fmt::Display;

use crate::tracker::Detection;

/// Forward-only, finite sequence of decoded frames.
///
/// Opening the underlying media is the implementor's concern and happens
/// before the source is handed to a pipeline.
pub trait VideoSource {
    /// Decoded frame type handed to the detector.
    type Frame;
    /// Error type for read failures.
    type Error: Display;

    /// Nominal frame rate of the video.
    fn fps(&self) -> u32;

    /// Read the next frame, or `Ok(None)` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>, Self::Error>;
}

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection model to the tracker.
/// Results may contain any class label; the pipeline filters them down to
/// the vehicle vocabulary.
///
/// # Example
///
/// ```ignore
/// use vehicle_track::{Detection, DetectionSource};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource<RgbFrame> for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &RgbFrame) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource<F: ?Sized> {
    /// Error type for detection failures.
    type Error: Display;

    /// Run inference on one frame and return its detections.
    fn detect(&mut self, frame: &F) -> Result<Vec<Detection>, Self::Error>;
}

/// Encodes a sampled frame for transport alongside its results.
pub trait FrameEncoder<F: ?Sized> {
    type Error: Display;

    fn encode(&mut self, frame: &F) -> Result<String, Self::Error>;
}

/// Type-level default for pipelines built without an encoder.
///
/// Such pipelines hold no encoder at all, so `encode` is never reached and
/// their results carry no frame data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEncoder;

impl<F: ?Sized> FrameEncoder<F> for NoEncoder {
    type Error = Infallible;

    fn encode(&mut self, _frame: &F) -> Result<String, Self::Error> {
        Ok(String::new())
    }
}
