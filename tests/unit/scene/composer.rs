use super::*;
use crate::foundation::core::{Canvas, GeoBounds};
use crate::geo::boundary::Polygon;
use crate::foundation::core::GeoPoint;
use crate::tracks::point::{Cell, TrackPoint};
use crate::tracks::table::{GroupBy, GroupKey, TrackTable};

fn pt(line: u64, lon: f64, trip: &str, sub: &str, year: i32, nation: &str) -> TrackPoint {
    TrackPoint {
        line,
        lon: Cell::Value(lon),
        lat: Cell::Value(10.0),
        trip: trip.to_string(),
        subpath: sub.to_string(),
        year: Cell::Value(year),
        nation: nation.to_string(),
    }
}

fn composer() -> StaticComposer {
    let projection = Projection::fit(
        GeoBounds::new(-80.0, 20.0, -10.0, 60.0).unwrap(),
        Canvas {
            width: 400,
            height: 300,
        },
        10.0,
    )
    .unwrap();
    let land = BoundaryLayer::new(vec![Polygon {
        rings: vec![vec![
            GeoPoint::new(-10.0, 35.0),
            GeoPoint::new(0.0, 35.0),
            GeoPoint::new(0.0, 45.0),
            GeoPoint::new(-10.0, 35.0),
        ]],
    }]);
    StaticComposer::new(projection, MapStyle::default(), &land, Vec::new()).unwrap()
}

fn table() -> TrackTable {
    TrackTable::new(vec![
        pt(2, -10.0, "7", "7.1", 1791, "Spanish"),
        pt(3, -11.0, "7", "7.1", 1791, "Spanish"),
        pt(4, -30.0, "9", "9.1", 1791, "British"),
        pt(5, -12.0, "7", "7.1", 1791, "Spanish"),
        pt(6, -40.0, "7", "7.2", 1792, "Spanish"),
    ])
}

#[test]
fn groups_points_by_path_in_first_appearance_order() {
    let t = table();
    let view = t.filter(GroupBy::Year, &GroupKey::Year(1791)).unwrap();
    let scene = composer().compose(&view, "1791").unwrap();

    let segs: Vec<_> = scene.route_segments().collect();
    assert_eq!(segs.len(), 2);
    assert_eq!(segs[0].subpath, "7.1");
    assert_eq!(
        segs[0].points.iter().map(|p| p.lon).collect::<Vec<_>>(),
        vec![-10.0, -11.0, -12.0]
    );
    assert_eq!(segs[1].subpath, "9.1");
    assert_eq!(segs[1].points.len(), 1);
    assert_eq!(scene.stats().points, 4);
}

#[test]
fn colors_routes_by_nation() {
    let t = table();
    let view = t.filter(GroupBy::Year, &GroupKey::Year(1791)).unwrap();
    let c = composer();
    let scene = c.compose(&view, "1791").unwrap();
    let segs: Vec<_> = scene.route_segments().collect();
    assert_eq!(segs[0].color, c.style().route_color("Spanish"));
    assert_eq!(segs[1].color, c.style().route_color("British"));
}

#[test]
fn layer_order_is_fixed() {
    let t = table();
    let scene = composer().compose(&t.view_all(), "all").unwrap();
    let kinds: Vec<_> = scene.layers.iter().map(Layer::kind).collect();
    assert_eq!(kinds, vec!["panel", "graticule", "land", "routes", "title"]);
    assert_eq!(scene.title, "all");
}

#[test]
fn empty_view_gives_scene_without_routes() {
    let t = table();
    let view = t.filter(GroupBy::Year, &GroupKey::Year(1900)).unwrap();
    let scene = composer().compose(&view, "1900").unwrap();
    assert_eq!(scene.stats().segments, 0);
    assert!(scene.layers.iter().any(|l| l.kind() == "land"));
}

#[test]
fn malformed_longitude_names_its_line() {
    let mut bad = pt(9, 0.0, "1", "1.1", 1791, "Dutch");
    bad.lon = Cell::Malformed("abc".to_string());
    let t = TrackTable::new(vec![bad]);
    let err = composer().compose(&t.view_all(), "x").unwrap_err();
    assert_eq!(err.stage(), "compose");
    assert!(err.to_string().contains("line 9"));
}

#[test]
fn compose_is_repeatable() {
    let t = table();
    let c = composer();
    let a = c.compose(&t.view_all(), "t").unwrap();
    let b = c.compose(&t.view_all(), "t").unwrap();
    assert_eq!(a, b);
}

#[test]
fn title_prefix_is_applied() {
    let mut style = MapStyle::default();
    style.title_prefix = "Year ".to_string();
    let c = StaticComposer::new(
        *composer().projection(),
        style,
        &BoundaryLayer::default(),
        Vec::new(),
    )
    .unwrap();
    assert_eq!(c.title_for("1791"), "Year 1791");
}
