//! TrackerPipeline for combining frame sampling, detection and tracking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Error, FrameError, Result};
use crate::tracker::{TrackedDetection, TrackerConfig, VehicleTracker};

use super::filter::filter_vehicles;
use super::report::{FrameResult, VideoReport};
use super::{DetectionSource, FrameEncoder, NoEncoder, VideoSource};

/// Configuration for the TrackerPipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Only every `stride`-th frame is sent to the detector
    pub stride: u64,
    /// Detections at or below this confidence are discarded
    pub min_confidence: f32,
    /// Log progress every this many frames read; 0 disables it
    pub progress_interval: u64,
    pub tracker: TrackerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stride: 5,
            min_confidence: 0.3,
            progress_interval: 100,
            tracker: TrackerConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stride == 0 {
            return Err(Error::InvalidConfig("stride must be at least 1".to_string()));
        }
        if !self.min_confidence.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "min_confidence must be finite, got {}",
                self.min_confidence
            )));
        }
        self.tracker.validate()
    }

    /// Whether the 1-based `frame_number` goes to the detector.
    #[inline]
    pub fn is_sampled(&self, frame_number: u64) -> bool {
        frame_number % self.stride == 0
    }
}

/// Drives a video through sampling, detection and tracking.
///
/// The detector and encoder are reused across calls to [`process`], but
/// every call gets a fresh Track Table and identity counter, so results
/// from one video never leak into the next.
///
/// [`process`]: TrackerPipeline::process
pub struct TrackerPipeline<D, E = NoEncoder> {
    detector: D,
    encoder: Option<E>,
    config: PipelineConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl<D> TrackerPipeline<D> {
    /// Create a new pipeline with the given detector and config.
    pub fn new(detector: D, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            detector,
            encoder: None,
            config,
            cancel: None,
        })
    }

    /// Create a new pipeline with the default configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self {
            detector,
            encoder: None,
            config: PipelineConfig::default(),
            cancel: None,
        }
    }
}

impl<D, E> TrackerPipeline<D, E> {
    /// Attach an encoder whose output is stored as each result's frame data.
    pub fn with_encoder<E2>(self, encoder: E2) -> TrackerPipeline<D, E2> {
        TrackerPipeline {
            detector: self.detector,
            encoder: Some(encoder),
            config: self.config,
            cancel: self.cancel,
        }
    }

    /// Stop the run at the next sampled frame once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Run one video to completion.
    ///
    /// Frames are numbered from 1. A failure on a sampled frame is logged and
    /// that frame is left out of the report. A read error on the very first
    /// frame aborts the run; a later one ends it early with the results so
    /// far and the error kept in [`VideoReport::source_error`]. Cancellation
    /// always aborts.
    pub fn process<S>(&mut self, mut source: S) -> Result<VideoReport>
    where
        S: VideoSource,
        D: DetectionSource<S::Frame>,
        E: FrameEncoder<S::Frame>,
    {
        let fps = source.fps();
        info!(fps, stride = self.config.stride, "processing video");

        let mut tracker = VehicleTracker::new(self.config.tracker.clone());
        let mut report = VideoReport {
            fps,
            ..VideoReport::default()
        };
        let mut frame_number = 0;

        loop {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) if frame_number == 0 => return Err(Error::Source(e.to_string())),
                Err(e) => {
                    warn!(after_frame = frame_number, error = %e, "frame source failed, ending run");
                    report.source_error = Some(e.to_string());
                    break;
                }
            };
            frame_number += 1;

            if self.config.is_sampled(frame_number) {
                if self.is_cancelled() {
                    info!(frame_number, "run cancelled");
                    return Err(Error::Cancelled { frame_number });
                }

                match self.process_frame(&mut tracker, &frame) {
                    Ok((vehicles, frame_data)) => {
                        debug!(frame_number, vehicles = vehicles.len(), "processed frame");
                        report.detections.push(FrameResult {
                            frame_number,
                            vehicles,
                            frame_data,
                        });
                    }
                    Err(e) => {
                        warn!(frame_number, error = %e, "skipping frame");
                        report.skipped_frames.push(frame_number);
                    }
                }
            }

            if self.config.progress_interval > 0 && frame_number % self.config.progress_interval == 0 {
                debug!(frames = frame_number, "progress");
            }
        }

        report.frames_read = frame_number;
        info!(
            frames_read = frame_number,
            sampled = report.detections.len() + report.skipped_frames.len(),
            skipped = report.skipped_frames.len(),
            identities = tracker.identities_issued(),
            "video processing completed"
        );
        Ok(report)
    }

    /// Detect, filter and encode before touching the tracker, so a failed
    /// frame leaves the Track Table as it was.
    fn process_frame<F>(
        &mut self,
        tracker: &mut VehicleTracker,
        frame: &F,
    ) -> std::result::Result<(Vec<TrackedDetection>, Option<String>), FrameError>
    where
        D: DetectionSource<F>,
        E: FrameEncoder<F>,
    {
        let detections = self
            .detector
            .detect(frame)
            .map_err(|e| FrameError::Detector(e.to_string()))?;
        let vehicles = filter_vehicles(detections, self.config.min_confidence)?;

        let frame_data = match self.encoder.as_mut() {
            Some(encoder) => Some(
                encoder
                    .encode(frame)
                    .map_err(|e| FrameError::Encoder(e.to_string()))?,
            ),
            None => None,
        };

        Ok((tracker.update(vehicles), frame_data))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
