//! Greedy nearest-overlap matching between detections and tracks.

use ndarray::Array2;
use serde::Deserialize;

/// Whether a track may be claimed by more than one detection per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimPolicy {
    /// Every detection searches every track; several detections may claim
    /// the same track in one frame.
    #[default]
    Shared,
    /// A track claimed earlier in the frame is invisible to later detections.
    Exclusive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentResult {
    /// `(detection, track)` index pairs, in detection order
    pub matches: Vec<(usize, usize)>,
    pub unmatched_detections: Vec<usize>,
    pub unmatched_tracks: Vec<usize>,
}

/// Assign each detection (row) to its best overlapping track (column).
///
/// Rows are visited in order. For each row the column with the strictly
/// greatest overlap wins, so on ties the lowest column index is kept. A
/// match is accepted only when that overlap is strictly above `thresh`.
pub fn greedy_assignment(ious: &Array2<f32>, thresh: f32, policy: ClaimPolicy) -> AssignmentResult {
    let (num_dets, num_tracks) = ious.dim();

    let mut matches = Vec::new();
    let mut unmatched_detections = Vec::new();
    let mut claimed = vec![false; num_tracks];

    for (idet, row) in ious.outer_iter().enumerate() {
        let mut best: Option<(usize, f32)> = None;
        for (itrack, &iou) in row.iter().enumerate() {
            if policy == ClaimPolicy::Exclusive && claimed[itrack] {
                continue;
            }
            let best_iou = best.map_or(0.0, |(_, v)| v);
            if iou > best_iou {
                best = Some((itrack, iou));
            }
        }

        match best {
            Some((itrack, iou)) if iou > thresh => {
                claimed[itrack] = true;
                matches.push((idet, itrack));
            }
            _ => unmatched_detections.push(idet),
        }
    }

    debug_assert_eq!(matches.len() + unmatched_detections.len(), num_dets);

    let unmatched_tracks = claimed
        .iter()
        .enumerate()
        .filter_map(|(i, &c)| if c { None } else { Some(i) })
        .collect();

    AssignmentResult {
        matches,
        unmatched_detections,
        unmatched_tracks,
    }
}
