//! Vehicle vocabulary and confidence filter applied before association.

use crate::error::FrameError;
use crate::tracker::{Detection, VehicleClass, VehicleDetection};

/// Keep detections whose label is a vehicle class and whose confidence is
/// strictly above `min_confidence`.
///
/// Boxes are truncated to whole pixels here, so matching, the Track Table
/// and the emitted results all see the same coordinates. Non-finite boxes or
/// scores make the whole frame malformed.
pub fn filter_vehicles(
    detections: Vec<Detection>,
    min_confidence: f32,
) -> Result<Vec<VehicleDetection>, FrameError> {
    let mut vehicles = Vec::with_capacity(detections.len());
    for (index, det) in detections.into_iter().enumerate() {
        if !det.confidence.is_finite() {
            return Err(FrameError::MalformedDetection {
                index,
                reason: format!("confidence is {}", det.confidence),
            });
        }
        if !det.bbox.is_finite() {
            return Err(FrameError::MalformedDetection {
                index,
                reason: format!("box is {:?}", det.bbox.to_tlbr()),
            });
        }

        let Ok(class) = det.class.parse::<VehicleClass>() else {
            continue;
        };
        if det.confidence > min_confidence {
            vehicles.push(VehicleDetection::new(class, det.confidence, det.bbox.truncated()));
        }
    }
    Ok(vehicles)
}
