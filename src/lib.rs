//! Vehicle identity tracking over sampled video frames.
//!
//! Every `stride`-th frame of a video is passed to an external detector; the
//! resulting vehicle detections are matched to the previous sampled frame's
//! tracks by greedy IoU so each physical vehicle keeps a stable identity.
//!
//! ```ignore
//! use vehicle_track::{PipelineConfig, Recording, TrackerPipeline};
//!
//! let (source, detector) = Recording::open("recording.json")?.into_replay();
//! let mut pipeline = TrackerPipeline::new(detector, PipelineConfig::default())?;
//! let report = pipeline.process(source)?;
//! println!("{} vehicles", report.counts().unique_vehicles);
//! ```

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{Error, FrameError, Result};
pub use integration::{
    DetectionBuilder, DetectionSource, FrameEncoder, FrameResult, PipelineConfig, Recording,
    TrackerPipeline, VehicleCounts, VideoReport, VideoSource,
};
pub use tracker::{
    BBox, ClaimPolicy, Detection, TrackedDetection, TrackerConfig, VehicleClass, VehicleDetection,
    VehicleTracker, associate,
};
