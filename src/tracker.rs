mod detection;
mod matching;
mod rect;
mod track_table;
mod vehicle_tracker;

pub use detection::{Detection, TrackedDetection, UnknownClass, VehicleClass, VehicleDetection};
pub use matching::{AssignmentResult, ClaimPolicy, greedy_assignment};
pub use rect::{BBox, iou_batch};
pub use track_table::{TrackEntry, TrackIdGenerator, TrackTable};
pub use vehicle_tracker::{TrackerConfig, VehicleTracker, associate};
