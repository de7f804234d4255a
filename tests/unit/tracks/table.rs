use super::*;
use crate::tracks::point::Cell;

fn pt(line: u64, year: i32, nation: &str, trip: &str) -> TrackPoint {
    TrackPoint {
        line,
        lon: Cell::Value(line as f64),
        lat: Cell::Value(0.0),
        trip: trip.to_string(),
        subpath: format!("{trip}.1"),
        year: Cell::Value(year),
        nation: nation.to_string(),
    }
}

fn table() -> TrackTable {
    TrackTable::new(vec![
        pt(2, 1793, "Spanish", "1"),
        pt(3, 1791, "British", "2"),
        pt(4, 1793, "Spanish", "1"),
        pt(5, 1792, "Dutch", "3"),
        pt(6, 1791, "Spanish", "4"),
    ])
}

#[test]
fn distinct_years_sorted_by_default() {
    let keys = table()
        .distinct_keys(GroupBy::Year, KeyOrder::default())
        .unwrap();
    assert_eq!(
        keys,
        vec![
            GroupKey::Year(1791),
            GroupKey::Year(1792),
            GroupKey::Year(1793)
        ]
    );
}

#[test]
fn distinct_years_first_appearance_keeps_discovery_order() {
    let keys = table()
        .distinct_keys(GroupBy::Year, KeyOrder::FirstAppearance)
        .unwrap();
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
fn distinct_nations_sorted_lexicographically() {
    let keys = table()
        .distinct_keys(GroupBy::Nation, KeyOrder::Sorted)
        .unwrap();
    let names: Vec<String> = keys.iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["British", "Dutch", "Spanish"]);
}

#[test]
fn filter_preserves_stored_order() {
    let t = table();
    let view = t.filter(GroupBy::Year, &GroupKey::Year(1791)).unwrap();
    let lines: Vec<u64> = view.points().iter().map(|p| p.line).collect();
    assert_eq!(lines, vec![3, 6]);
}

#[test]
fn filter_on_absent_key_is_empty() {
    let t = table();
    let view = t.filter(GroupBy::Year, &GroupKey::Year(1700)).unwrap();
    assert!(view.is_empty());
}

#[test]
fn undefined_year_fails_key_extraction() {
    let mut points = table().points().to_vec();
    points[1].year = Cell::Malformed(String::new());
    let t = TrackTable::new(points);
    let err = t
        .distinct_keys(GroupBy::Year, KeyOrder::Sorted)
        .unwrap_err();
    assert_eq!(err.stage(), "compose");
    assert!(err.to_string().contains("line 3"));
}

#[test]
fn group_key_parse_and_display() {
    assert_eq!(
        GroupKey::parse(GroupBy::Year, " 1791 ").unwrap(),
        GroupKey::Year(1791)
    );
    assert!(GroupKey::parse(GroupBy::Year, "x").is_err());
    assert_eq!(
        GroupKey::parse(GroupBy::Nation, "Dutch")
            .unwrap()
            .to_string(),
        "Dutch"
    );
    assert_eq!(GroupKey::Year(1792).to_string(), "1792");
}
