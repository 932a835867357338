//! Result stream emitted by the pipeline.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::tracker::{TrackedDetection, VehicleClass};

/// Tracked vehicles for one sampled frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    #[serde(rename = "frame")]
    pub frame_number: u64,
    pub vehicles: Vec<TrackedDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_data: Option<String>,
}

/// Outcome of one video-processing run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoReport {
    /// Nominal frame rate reported by the source
    pub fps: u32,
    /// Total frames pulled from the source, sampled or not
    pub frames_read: u64,
    pub detections: Vec<FrameResult>,
    /// Sampled frames dropped after a per-frame failure
    pub skipped_frames: Vec<u64>,
    /// Read error that ended the video early, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
}

impl VideoReport {
    /// True when no vehicle was tracked in any frame.
    pub fn is_empty(&self) -> bool {
        self.detections.iter().all(|f| f.vehicles.is_empty())
    }

    /// Fold every emitted detection into per-class counts.
    pub fn counts(&self) -> VehicleCounts {
        let mut vehicle_counts = BTreeMap::new();
        let mut ids = BTreeSet::new();
        let mut total_vehicles = 0;

        for vehicle in self.detections.iter().flat_map(|f| &f.vehicles) {
            *vehicle_counts.entry(vehicle.class).or_insert(0) += 1;
            ids.insert(vehicle.id);
            total_vehicles += 1;
        }

        VehicleCounts {
            total_vehicles,
            vehicle_counts,
            unique_vehicles: ids.len(),
        }
    }
}

/// Per-class histogram over a report.
///
/// `total_vehicles` counts detections across all frames, so a car seen in
/// three sampled frames contributes three. `unique_vehicles` counts
/// identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VehicleCounts {
    pub total_vehicles: usize,
    pub vehicle_counts: BTreeMap<VehicleClass, usize>,
    pub unique_vehicles: usize,
}
