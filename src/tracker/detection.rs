//! Detection types consumed and produced by the tracker.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::tracker::rect::BBox;

/// Raw detector output for one object: free-form class label, confidence and box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class label as reported by the detector
    pub class: String,
    /// Detection confidence score
    pub confidence: f32,
    /// Bounding box in TLBR format
    pub bbox: BBox,
}

impl Detection {
    pub fn new(class: impl Into<String>, confidence: f32, bbox: BBox) -> Self {
        Self {
            class: class.into(),
            confidence,
            bbox,
        }
    }
}

/// Recognized vehicle vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Car,
    Truck,
    Bus,
    Motorcycle,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Car,
        VehicleClass::Truck,
        VehicleClass::Bus,
        VehicleClass::Motorcycle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Car => "car",
            VehicleClass::Truck => "truck",
            VehicleClass::Bus => "bus",
            VehicleClass::Motorcycle => "motorcycle",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label is outside the vehicle vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a vehicle class: {0:?}")]
pub struct UnknownClass(pub String);

impl FromStr for VehicleClass {
    type Err = UnknownClass;

    /// Labels must match exactly; no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleClass::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| UnknownClass(s.to_string()))
    }
}

/// A detection that passed the vehicle filter and is ready for association.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleDetection {
    pub class: VehicleClass,
    pub confidence: f32,
    pub bbox: BBox,
}

impl VehicleDetection {
    pub fn new(class: VehicleClass, confidence: f32, bbox: BBox) -> Self {
        Self {
            class,
            confidence,
            bbox,
        }
    }
}

/// A vehicle detection with its assigned track identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackedDetection {
    pub class: VehicleClass,
    pub confidence: f32,
    #[serde(serialize_with = "serialize_pixels")]
    pub bbox: BBox,
    pub id: u64,
}

impl TrackedDetection {
    pub fn new(detection: VehicleDetection, id: u64) -> Self {
        Self {
            class: detection.class,
            confidence: detection.confidence,
            bbox: detection.bbox,
            id,
        }
    }
}

fn serialize_pixels<S: Serializer>(bbox: &BBox, serializer: S) -> Result<S::Ok, S::Error> {
    bbox.to_pixels().serialize(serializer)
}
