//! Integration module for driving a video through detection and tracking.
//!
//! This module provides the traits a decoder and a detection backend
//! implement, the sampling pipeline that ties them to the tracker, and the
//! result stream it produces.

mod builder;
mod detector;
mod filter;
mod pipeline;
mod replay;
mod report;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, FrameEncoder, NoEncoder, VideoSource};
pub use filter::filter_vehicles;
pub use pipeline::{PipelineConfig, TrackerPipeline};
pub use replay::{RecordedFailure, RecordedFrame, Recording, ReplayDetector, ReplayFrame, ReplaySource};
pub use report::{FrameResult, VehicleCounts, VideoReport};
