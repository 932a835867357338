use vehicle_track::tracker::{TrackIdGenerator, TrackTable};
use vehicle_track::{
    BBox, ClaimPolicy, Detection, DetectionSource, Error, PipelineConfig, Recording, TrackerConfig,
    TrackerPipeline, VehicleClass, VehicleDetection, VehicleTracker, VideoSource, associate,
};

fn car(x1: f32, y1: f32, x2: f32, y2: f32) -> VehicleDetection {
    VehicleDetection::new(VehicleClass::Car, 0.9, BBox::new(x1, y1, x2, y2))
}

#[test]
fn test_overlap_properties() {
    let boxes = [
        BBox::new(0.0, 0.0, 10.0, 10.0),
        BBox::new(5.0, 5.0, 25.0, 15.0),
        BBox::new(100.0, 100.0, 110.0, 110.0),
        BBox::new(-4.0, 2.0, 3.0, 30.0),
        BBox::new(7.0, 7.0, 7.0, 7.0),
    ];
    for a in &boxes {
        for b in &boxes {
            let iou = a.iou(b);
            assert!((0.0..=1.0).contains(&iou));
            assert_eq!(iou, b.iou(a));
        }
        if a.area() > 0.0 {
            assert!((a.iou(a) - 1.0).abs() < 1e-6);
        }
    }
    assert_eq!(boxes[0].iou(&boxes[2]), 0.0);
}

#[test]
fn test_first_frame_assigns_distinct_identities() {
    let mut tracker = VehicleTracker::default();
    let tracked = tracker.update(vec![
        car(0.0, 0.0, 10.0, 10.0),
        car(100.0, 100.0, 110.0, 110.0),
    ]);
    assert_eq!(tracked.len(), 2);
    assert_eq!(tracked[0].id, 1);
    assert_eq!(tracked[1].id, 2);
}

#[test]
fn test_basic_tracking() {
    let mut tracker = VehicleTracker::new(TrackerConfig::default());

    // Frame 1: One detection
    let tracks1 = tracker.update(vec![car(0.0, 0.0, 10.0, 10.0)]);
    assert_eq!(tracks1.len(), 1);
    assert_eq!(tracks1[0].id, 1);

    // Frame 2: Same vehicle moved slightly (IoU ~0.68)
    let tracks2 = tracker.update(vec![car(1.0, 1.0, 11.0, 11.0)]);
    assert_eq!(tracks2.len(), 1);
    assert_eq!(tracks2[0].id, 1);

    // Frame 3: Jumped far away, no overlap with any track
    let tracks3 = tracker.update(vec![car(50.0, 50.0, 60.0, 60.0)]);
    assert_eq!(tracks3.len(), 1);
    assert_eq!(tracks3[0].id, 2);

    // Track 1 went unclaimed and is gone.
    assert!(!tracker.tracks().contains(1));
    assert!(tracker.tracks().contains(2));
}

#[test]
fn test_identities_never_reused() {
    let mut tracker = VehicleTracker::default();
    let mut seen = Vec::new();
    for step in 0..6 {
        // Each frame's vehicles are far from the last frame's.
        let offset = step as f32 * 200.0;
        let tracked = tracker.update(vec![
            car(offset, 0.0, offset + 10.0, 10.0),
            car(offset, 100.0, offset + 10.0, 110.0),
        ]);
        for t in tracked {
            assert!(!seen.contains(&t.id));
            if let Some(last) = seen.last() {
                assert!(t.id > *last);
            }
            seen.push(t.id);
        }
    }
    assert_eq!(seen.len(), 12);
    assert_eq!(tracker.identities_issued(), 12);
}

#[test]
fn test_associate_function_contract() {
    let mut ids = TrackIdGenerator::new();
    let (first, table) = associate(
        vec![car(0.0, 0.0, 10.0, 10.0)],
        &TrackTable::new(),
        &mut ids,
        &TrackerConfig::default(),
    );
    assert_eq!(first[0].id, 1);

    let (second, table) = associate(
        vec![car(1.0, 1.0, 11.0, 11.0), car(50.0, 50.0, 60.0, 60.0)],
        &table,
        &mut ids,
        &TrackerConfig::default(),
    );
    assert_eq!(second[0].id, 1);
    assert_eq!(second[1].id, 2);
    assert_eq!(table.len(), 2);
    assert_eq!(ids.peek(), 3);
}

#[test]
fn test_claim_policies_differ_on_competing_detections() {
    // Two vehicles drive side by side into the area of a single track.
    let frames = [
        vec![car(0.0, 0.0, 20.0, 10.0)],
        vec![car(0.0, 0.0, 10.0, 10.0), car(10.0, 0.0, 20.0, 10.0)],
    ];

    let mut shared = VehicleTracker::new(TrackerConfig::default());
    shared.update(frames[0].clone());
    let ids: Vec<u64> = shared.update(frames[1].clone()).iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 1]);
    assert_eq!(shared.tracks().len(), 1);

    let mut exclusive = VehicleTracker::new(TrackerConfig {
        claim_policy: ClaimPolicy::Exclusive,
        ..TrackerConfig::default()
    });
    exclusive.update(frames[0].clone());
    let ids: Vec<u64> = exclusive.update(frames[1].clone()).iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(exclusive.tracks().len(), 2);
}

const RECORDING: &str = r#"{
    "fps": 30,
    "frame_count": 22,
    "frames": {
        "5":  { "detections": [
            { "class": "car", "confidence": 0.9, "bbox": [0, 0, 10, 10] },
            { "class": "person", "confidence": 0.95, "bbox": [40, 40, 45, 60] },
            { "class": "truck", "confidence": 0.25, "bbox": [200, 200, 260, 240] }
        ] },
        "10": { "error": "inference timed out" },
        "15": { "detections": [
            { "class": "car", "confidence": 0.8, "bbox": [1, 1, 11, 11] },
            { "class": "bus", "confidence": 0.7, "bbox": [300, 100, 400, 180] }
        ] },
        "20": { "detections": [
            { "class": "car", "confidence": 0.85, "bbox": [2, 2, 12, 12] },
            { "class": "bus", "confidence": 0.75, "bbox": [305, 100, 405, 180] }
        ] }
    }
}"#;

#[test]
fn test_replay_pipeline_end_to_end() {
    let (source, detector) = Recording::from_json(RECORDING).unwrap().into_replay();
    let mut pipeline = TrackerPipeline::new(detector, PipelineConfig::default()).unwrap();
    let report = pipeline.process(source).unwrap();

    assert_eq!(report.fps, 30);
    assert_eq!(report.frames_read, 22);
    assert_eq!(report.skipped_frames, vec![10]);

    let frames: Vec<u64> = report.detections.iter().map(|f| f.frame_number).collect();
    assert_eq!(frames, vec![5, 15, 20]);

    // Only the car survives filtering on frame 5.
    assert_eq!(report.detections[0].vehicles.len(), 1);
    assert_eq!(report.detections[0].vehicles[0].id, 1);

    // Frame 10 failed, so frame 15 is associated against frame 5's table.
    let ids: Vec<u64> = report.detections[1].vehicles.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![1, 2]);
    let ids: Vec<u64> = report.detections[2].vehicles.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![1, 2]);

    let counts = report.counts();
    assert_eq!(counts.total_vehicles, 5);
    assert_eq!(counts.unique_vehicles, 2);
    assert_eq!(counts.vehicle_counts[&VehicleClass::Car], 3);
    assert_eq!(counts.vehicle_counts[&VehicleClass::Bus], 2);
}

#[test]
fn test_report_json_shape() {
    let (source, detector) = Recording::from_json(RECORDING).unwrap().into_replay();
    let report = TrackerPipeline::with_default_config(detector)
        .process(source)
        .unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["fps"], 30);
    assert_eq!(value["detections"][0]["frame"], 5);
    let vehicle = &value["detections"][0]["vehicles"][0];
    assert_eq!(vehicle["class"], "car");
    assert_eq!(vehicle["bbox"], serde_json::json!([0, 0, 10, 10]));
    assert_eq!(vehicle["id"], 1);
    assert!((vehicle["confidence"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    assert_eq!(value["skipped_frames"], serde_json::json!([10]));
}

struct FailingSource {
    served: u32,
    fail_after: u32,
}

impl VideoSource for FailingSource {
    type Frame = ();
    type Error = String;

    fn fps(&self) -> u32 {
        25
    }

    fn next_frame(&mut self) -> Result<Option<()>, String> {
        if self.served == self.fail_after {
            return Err("corrupt packet".to_string());
        }
        self.served += 1;
        Ok(Some(()))
    }
}

/// Reports one stationary car on every frame it is asked about.
struct ParkedCarDetector;

impl DetectionSource<()> for ParkedCarDetector {
    type Error = String;

    fn detect(&mut self, _frame: &()) -> Result<Vec<Detection>, String> {
        Ok(vec![Detection::new("car", 0.9, BBox::new(0.0, 0.0, 10.0, 10.0))])
    }
}

#[test]
fn test_source_failure_before_first_frame_is_fatal() {
    let mut pipeline = TrackerPipeline::with_default_config(ParkedCarDetector);
    let err = pipeline
        .process(FailingSource {
            served: 0,
            fail_after: 0,
        })
        .unwrap_err();
    assert!(matches!(err, Error::Source(msg) if msg == "corrupt packet"));
}

#[test]
fn test_source_failure_midstream_ends_run_early() {
    let mut pipeline = TrackerPipeline::with_default_config(ParkedCarDetector);
    let report = pipeline
        .process(FailingSource {
            served: 0,
            fail_after: 12,
        })
        .unwrap();

    assert_eq!(report.fps, 25);
    assert_eq!(report.frames_read, 12);
    let frames: Vec<u64> = report.detections.iter().map(|f| f.frame_number).collect();
    assert_eq!(frames, vec![5, 10]);
    assert_eq!(report.source_error.as_deref(), Some("corrupt packet"));
    assert_eq!(report.counts().unique_vehicles, 1);
}

#[test]
fn test_matching_uses_pixel_boxes() {
    // 3.9 truncates to 3, leaving an overlap of exactly 0.3 with the first
    // box, which does not clear the strict threshold.
    let recording = r#"{
        "fps": 30,
        "frame_count": 10,
        "frames": {
            "5":  { "detections": [{ "class": "car", "confidence": 0.9, "bbox": [0, 0, 10, 10] }] },
            "10": { "detections": [{ "class": "car", "confidence": 0.9, "bbox": [0, 0, 3.9, 10] }] }
        }
    }"#;
    let (source, detector) = Recording::from_json(recording).unwrap().into_replay();
    let report = TrackerPipeline::with_default_config(detector)
        .process(source)
        .unwrap();

    let second = &report.detections[1].vehicles[0];
    assert_eq!(second.bbox, BBox::new(0.0, 0.0, 3.0, 10.0));
    assert_eq!(report.detections[0].vehicles[0].id, 1);
    assert_eq!(second.id, 2);
}
