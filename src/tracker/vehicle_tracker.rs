//! Frame association and the per-run vehicle tracker.

use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::tracker::detection::{TrackedDetection, VehicleDetection};
use crate::tracker::matching::{self, AssignmentResult, ClaimPolicy};
use crate::tracker::rect::{BBox, iou_batch};
use crate::tracker::track_table::{TrackEntry, TrackIdGenerator, TrackTable};

/// Configuration for the VehicleTracker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Overlap a detection must strictly exceed to continue a track
    pub iou_threshold: f32,
    pub claim_policy: ClaimPolicy,
    /// Sampled frames an unclaimed track survives before it is dropped
    pub max_missed_frames: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.3,
            claim_policy: ClaimPolicy::Shared,
            max_missed_frames: 0,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(Error::InvalidConfig(format!(
                "iou_threshold must be within [0, 1], got {}",
                self.iou_threshold
            )));
        }
        Ok(())
    }
}

/// Associate one frame's detections with the current Track Table.
///
/// Each detection, in input order, takes the identity of its best
/// overlapping track or a fresh identity from `ids`. The returned table holds
/// every identity seen this frame with its fresh box, plus unclaimed tracks
/// still inside their grace period.
///
/// Tracks are scanned in ascending identity order and only a strictly
/// greater overlap displaces the current best, so on an exact tie the
/// oldest track wins.
pub fn associate(
    detections: Vec<VehicleDetection>,
    tracks: &TrackTable,
    ids: &mut TrackIdGenerator,
    config: &TrackerConfig,
) -> (Vec<TrackedDetection>, TrackTable) {
    let track_list: Vec<(u64, TrackEntry)> = tracks.iter().map(|(id, e)| (id, *e)).collect();
    let track_boxes: Vec<BBox> = track_list.iter().map(|(_, e)| e.bbox).collect();
    let det_boxes: Vec<BBox> = detections.iter().map(|d| d.bbox).collect();

    let ious = iou_batch(&det_boxes, &track_boxes);
    let AssignmentResult {
        matches,
        unmatched_tracks,
        ..
    } = matching::greedy_assignment(&ious, config.iou_threshold, config.claim_policy);

    let mut matched_track = vec![None; detections.len()];
    for (idet, itrack) in matches {
        matched_track[idet] = Some(itrack);
    }

    let mut updated = TrackTable::new();
    let mut tracked = Vec::with_capacity(detections.len());

    for (idet, (det, track)) in detections.into_iter().zip(matched_track).enumerate() {
        let id = match track {
            Some(itrack) => {
                let id = track_list[itrack].0;
                trace!(id, iou = ious[[idet, itrack]], "continued track");
                id
            }
            None => {
                let id = ids.next_id();
                trace!(id, class = %det.class, "new track");
                id
            }
        };
        updated.insert(id, TrackEntry::new(det.bbox));
        tracked.push(TrackedDetection::new(det, id));
    }

    for itrack in unmatched_tracks {
        let (id, entry) = track_list[itrack];
        if entry.missed_frames < config.max_missed_frames {
            updated.insert(
                id,
                TrackEntry {
                    bbox: entry.bbox,
                    missed_frames: entry.missed_frames + 1,
                },
            );
        } else {
            trace!(id, "dropped track");
        }
    }

    (tracked, updated)
}

/// Stateful tracker owning the Track Table and identity counter of one run.
#[derive(Debug, Clone)]
pub struct VehicleTracker {
    tracks: TrackTable,
    ids: TrackIdGenerator,
    frame_count: u64,
    config: TrackerConfig,
}

impl Default for VehicleTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl VehicleTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracks: TrackTable::new(),
            ids: TrackIdGenerator::new(),
            frame_count: 0,
            config,
        }
    }

    /// Track one sampled frame's detections.
    pub fn update(&mut self, detections: Vec<VehicleDetection>) -> Vec<TrackedDetection> {
        self.frame_count += 1;
        let num_dets = detections.len();

        let (tracked, tracks) = associate(detections, &self.tracks, &mut self.ids, &self.config);
        self.tracks = tracks;

        debug!(
            frame = self.frame_count,
            detections = num_dets,
            tracks = self.tracks.len(),
            next_id = self.ids.peek(),
            "associated frame"
        );
        tracked
    }

    pub fn tracks(&self) -> &TrackTable {
        &self.tracks
    }

    /// Number of identities handed out so far.
    pub fn identities_issued(&self) -> u64 {
        self.ids.issued()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}
