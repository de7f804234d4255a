use super::*;

const COLLECTION: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "name": "Iberia" },
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[-9.0, 36.0], [3.0, 36.0], [3.0, 43.5], [-9.0, 43.5], [-9.0, 36.0]]]
      }
    },
    {
      "type": "Feature",
      "properties": {},
      "geometry": {
        "type": "MultiPolygon",
        "coordinates": [
          [[[-61.0, 14.0], [-60.8, 14.0], [-60.8, 14.2], [-61.0, 14.0]]],
          [[[-62.0, 16.0], [-61.5, 16.0], [-61.5, 16.5], [-62.0, 16.0]]]
        ]
      }
    },
    {
      "type": "Feature",
      "properties": {},
      "geometry": { "type": "Point", "coordinates": [0.0, 0.0] }
    },
    { "type": "Feature", "properties": {}, "geometry": null }
  ]
}"#;

#[test]
fn collects_polygons_and_multipolygons() {
    let layer = BoundaryLayer::from_geojson_slice(COLLECTION.as_bytes()).unwrap();
    assert_eq!(layer.polygons().len(), 3);
    assert_eq!(layer.polygons()[0].rings[0].len(), 5);

    let b = layer.bounds().unwrap();
    assert_eq!(b.min_lon, -62.0);
    assert_eq!(b.max_lon, 3.0);
    assert_eq!(b.min_lat, 14.0);
    assert_eq!(b.max_lat, 43.5);
}

#[test]
fn bare_geometry_is_accepted() {
    let json = r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}"#;
    let layer = BoundaryLayer::from_geojson_slice(json.as_bytes()).unwrap();
    assert_eq!(layer.polygons().len(), 1);
}

#[test]
fn polygon_path_closes_every_ring() {
    let poly = Polygon {
        rings: vec![
            vec![
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(4.0, 0.0),
                GeoPoint::new(4.0, 4.0),
            ],
            vec![
                GeoPoint::new(1.0, 1.0),
                GeoPoint::new(2.0, 1.0),
                GeoPoint::new(2.0, 2.0),
            ],
        ],
    };
    let path = poly.to_path();
    let closes = path
        .elements()
        .iter()
        .filter(|el| matches!(el, kurbo::PathEl::ClosePath))
        .count();
    assert_eq!(closes, 2);
}

#[test]
fn invalid_json_is_a_load_error() {
    let err = BoundaryLayer::from_geojson_slice(b"{not json").unwrap_err();
    assert_eq!(err.stage(), "load");

    let short = r#"{"type":"Polygon","coordinates":[[[0]]]}"#;
    let err = BoundaryLayer::from_geojson_slice(short.as_bytes()).unwrap_err();
    assert_eq!(err.stage(), "load");
}
