use std::io::Cursor;

use super::*;
use crate::foundation::core::GeoPoint;

const CSV: &str = "\
long,lat,group,group.regroup,year,nation
-5.2,36.1,1,1.1,1791,Spanish
-9.8,38.7,1,1.1,1791,Spanish
-60.1,14.2,2,2.1,1792,British
";

#[test]
fn loads_rows_in_stored_order() {
    let table = load_tracks_reader(Cursor::new(CSV)).unwrap();
    assert_eq!(table.len(), 3);

    let p = &table.points()[0];
    assert_eq!(p.line, 2);
    assert_eq!(p.position().unwrap(), GeoPoint::new(-5.2, 36.1));
    assert_eq!(p.path_key(), ("1", "1.1"));
    assert_eq!(p.year().unwrap(), 1791);
    assert_eq!(p.nation, "Spanish");

    assert_eq!(table.points()[2].line, 4);
}

#[test]
fn accepts_column_aliases() {
    let csv = "lon,latitude,trip,subpath,year,nationality\n1,2,a,b,1800,Dutch\n";
    let table = load_tracks_reader(Cursor::new(csv)).unwrap();
    assert_eq!(table.points()[0].position().unwrap(), GeoPoint::new(1.0, 2.0));
    assert_eq!(table.points()[0].nation, "Dutch");
}

#[test]
fn malformed_coordinate_is_kept_until_used() {
    let csv = "long,lat,group,group.regroup,year,nation\nabc,2,1,1.1,1791,Spanish\n";
    let table = load_tracks_reader(Cursor::new(csv)).unwrap();
    let p = &table.points()[0];
    assert_eq!(p.lon, Cell::Malformed("abc".to_string()));

    let err = p.position().unwrap_err();
    assert_eq!(err.stage(), "compose");
    assert!(err.to_string().contains("line 2"));
    assert!(err.to_string().contains("abc"));
}

#[test]
fn missing_column_fails_load() {
    let csv = "long,lat,group,year,nation\n1,2,1,1791,Spanish\n";
    let err = load_tracks_reader(Cursor::new(csv)).unwrap_err();
    assert_eq!(err.stage(), "load");
}

#[test]
fn missing_file_fails_load() {
    let err = load_tracks_csv(Path::new("target/definitely/missing.csv")).unwrap_err();
    assert_eq!(err.stage(), "load");
    assert!(err.to_string().contains("missing.csv"));
}
