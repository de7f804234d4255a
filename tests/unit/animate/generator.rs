use super::*;
use crate::foundation::core::{Canvas, GeoBounds};
use crate::geo::boundary::BoundaryLayer;
use crate::geo::projection::Projection;
use crate::render::backend::FrameRGBA;
use crate::render::cpu::CpuBackend;
use crate::scene::layer::Scene;
use crate::scene::style::MapStyle;
use crate::tracks::point::{Cell, TrackPoint};

struct CountingBackend {
    calls: usize,
    fail_on: Option<String>,
}

impl CountingBackend {
    fn new() -> Self {
        Self {
            calls: 0,
            fail_on: None,
        }
    }
}

impl RenderBackend for CountingBackend {
    fn render_scene(&mut self, scene: &Scene) -> VoyageResult<FrameRGBA> {
        self.calls += 1;
        if self.fail_on.as_deref() == Some(scene.title.as_str()) {
            return Err(VoyageError::capture("surface lost"));
        }
        Ok(FrameRGBA {
            width: 1,
            height: 1,
            data: vec![scene.stats().segments as u8, 0, 0, 255],
            premultiplied: true,
        })
    }
}

fn pt(line: u64, lon: f64, trip: &str, year: i32, nation: &str) -> TrackPoint {
    TrackPoint {
        line,
        lon: Cell::Value(lon),
        lat: Cell::Value(20.0),
        trip: trip.to_string(),
        subpath: format!("{trip}.1"),
        year: Cell::Value(year),
        nation: nation.to_string(),
    }
}

fn table() -> TrackTable {
    TrackTable::new(vec![
        pt(2, -40.0, "1", 1793, "Spanish"),
        pt(3, -41.0, "1", 1793, "Spanish"),
        pt(4, -20.0, "2", 1791, "British"),
        pt(5, -21.0, "2", 1791, "British"),
        pt(6, -30.0, "3", 1792, "Dutch"),
        pt(7, -31.0, "4", 1791, "Spanish"),
    ])
}

fn composer() -> StaticComposer {
    let projection = Projection::fit(
        GeoBounds::new(-60.0, 0.0, 0.0, 40.0).unwrap(),
        Canvas {
            width: 120,
            height: 80,
        },
        4.0,
    )
    .unwrap();
    StaticComposer::new(
        projection,
        MapStyle::default(),
        &BoundaryLayer::default(),
        Vec::new(),
    )
    .unwrap()
}

#[test]
fn one_frame_per_distinct_year_in_ascending_order() {
    let t = table();
    let mut be = CountingBackend::new();
    let mut generator = FrameSequenceGenerator::new(GeneratorOpts::default());
    let seq = generator.run(&t, &composer(), &mut be).unwrap();

    assert_eq!(seq.len(), 3);
    let titles: Vec<_> = seq.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, vec!["1791", "1792", "1793"]);
    let segments: Vec<_> = seq.iter().map(|f| f.stats.segments).collect();
    assert_eq!(segments, vec![2, 1, 1]);
    assert_eq!(seq.frames()[2].index, 2);
    assert_eq!(be.calls, 3);
    assert_eq!(generator.state(), GeneratorState::Done);
}

#[test]
fn first_appearance_order_is_opt_in() {
    let t = table();
    let mut generator = FrameSequenceGenerator::new(GeneratorOpts {
        order: KeyOrder::FirstAppearance,
        ..GeneratorOpts::default()
    });
    let seq = generator
        .run(&t, &composer(), &mut CountingBackend::new())
        .unwrap();
    let keys: Vec<_> = seq.iter().map(|f| f.key.clone()).collect();
    assert_eq!(
        keys,
        vec![
            GroupKey::Year(1793),
            GroupKey::Year(1791),
            GroupKey::Year(1792)
        ]
    );
}

#[test]
fn grouping_by_nation_sorts_lexicographically() {
    let t = table();
    let mut generator = FrameSequenceGenerator::new(GeneratorOpts {
        group_by: GroupBy::Nation,
        ..GeneratorOpts::default()
    });
    let seq = generator
        .run(&t, &composer(), &mut CountingBackend::new())
        .unwrap();
    let titles: Vec<_> = seq.iter().map(|f| f.title.clone()).collect();
    assert_eq!(titles, vec!["British", "Dutch", "Spanish"]);
    assert_eq!(seq.get(&GroupKey::Nation("Spanish".into())).unwrap().stats.segments, 2);
}

#[test]
fn absent_key_yields_empty_frame() {
    let t = table();
    let mut generator = FrameSequenceGenerator::new(GeneratorOpts {
        keys: Some(vec![GroupKey::Year(1791), GroupKey::Year(1800)]),
        ..GeneratorOpts::default()
    });
    let seq = generator
        .run(&t, &composer(), &mut CountingBackend::new())
        .unwrap();
    assert_eq!(seq.len(), 2);
    assert_eq!(seq.frames()[1].title, "1800");
    assert_eq!(seq.frames()[1].stats.segments, 0);
}

#[test]
fn reset_clears_captured_frames() {
    let t = table();
    let mut generator = FrameSequenceGenerator::new(GeneratorOpts::default());
    generator
        .run(&t, &composer(), &mut CountingBackend::new())
        .unwrap();
    assert_eq!(generator.sequence().len(), 3);

    generator.reset();
    assert_eq!(generator.sequence().len(), 0);
    assert_eq!(generator.state(), GeneratorState::Idle);
}

#[test]
fn run_requires_idle_state() {
    let t = table();
    let mut generator = FrameSequenceGenerator::new(GeneratorOpts::default());
    generator
        .run(&t, &composer(), &mut CountingBackend::new())
        .unwrap();
    let err = generator
        .run(&t, &composer(), &mut CountingBackend::new())
        .unwrap_err();
    assert_eq!(err.stage(), "validation");
    assert_eq!(generator.sequence().len(), 3);
}

#[test]
fn malformed_coordinate_aborts_whole_run() {
    let mut rows = table().points().to_vec();
    rows[4].lon = Cell::Malformed("n/a".to_string());
    let t = TrackTable::new(rows);

    let mut generator = FrameSequenceGenerator::new(GeneratorOpts::default());
    let err = generator
        .run(&t, &composer(), &mut CountingBackend::new())
        .unwrap_err();
    assert_eq!(err.stage(), "compose");
    let msg = err.to_string();
    assert!(msg.contains("1792"), "{msg}");
    assert!(msg.contains("line 6"), "{msg}");
    assert!(generator.sequence().is_empty());
    assert_eq!(generator.state(), GeneratorState::Done);
}

#[test]
fn skip_policy_drops_only_the_failing_frame() {
    let mut rows = table().points().to_vec();
    rows[4].lon = Cell::Malformed("n/a".to_string());
    let t = TrackTable::new(rows);

    let mut generator = FrameSequenceGenerator::new(GeneratorOpts {
        policy: FailurePolicy::SkipFrame,
        ..GeneratorOpts::default()
    });
    let seq = generator
        .run(&t, &composer(), &mut CountingBackend::new())
        .unwrap();
    let titles: Vec<_> = seq.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, vec!["1791", "1793"]);
    assert_eq!(seq.frames()[1].index, 1);
    assert_eq!(seq.skipped().len(), 1);
    assert_eq!(seq.skipped()[0].key, GroupKey::Year(1792));
    assert_eq!(seq.skipped()[0].stage, "compose");
}

#[test]
fn capture_failure_names_its_stage() {
    let t = table();
    let mut be = CountingBackend::new();
    be.fail_on = Some("1792".to_string());
    let mut generator = FrameSequenceGenerator::new(GeneratorOpts::default());
    let err = generator.run(&t, &composer(), &mut be).unwrap_err();
    assert_eq!(err.stage(), "capture");
    assert!(err.to_string().contains("frame 1 (1792)"));
}

#[test]
fn undefined_year_fails_the_run() {
    let mut rows = table().points().to_vec();
    rows[0].year = Cell::Malformed(String::new());
    let t = TrackTable::new(rows);
    let mut generator = FrameSequenceGenerator::new(GeneratorOpts {
        policy: FailurePolicy::SkipFrame,
        ..GeneratorOpts::default()
    });
    let err = generator
        .run(&t, &composer(), &mut CountingBackend::new())
        .unwrap_err();
    assert_eq!(err.stage(), "compose");
}

#[test]
fn cpu_runs_are_deterministic() {
    let t = table();
    let c = composer();

    let mut a = FrameSequenceGenerator::new(GeneratorOpts::default());
    let mut be = CpuBackend::new(None);
    a.run(&t, &c, &mut be).unwrap();

    let mut b = FrameSequenceGenerator::new(GeneratorOpts::default());
    b.run(&t, &c, &mut CpuBackend::new(None)).unwrap();

    let fa: Vec<_> = a.sequence().iter().map(|f| f.frame.fingerprint()).collect();
    let fb: Vec<_> = b.sequence().iter().map(|f| f.frame.fingerprint()).collect();
    assert_eq!(fa, fb);
    assert_ne!(fa[0], fa[1]);
    assert_eq!(a.sequence().frames()[0].frame, b.sequence().frames()[0].frame);
}

#[test]
fn into_sequence_returns_captured_frames() {
    let mut g = FrameSequenceGenerator::new(GeneratorOpts::default());
    g.run(&table(), &composer(), &mut CountingBackend::new())
        .unwrap();
    let seq = g.into_sequence();
    let keys: Vec<_> = seq.iter().map(|f| f.key.clone()).collect();
    assert_eq!(
        keys,
        vec![GroupKey::Year(1791), GroupKey::Year(1792), GroupKey::Year(1793)]
    );
}
