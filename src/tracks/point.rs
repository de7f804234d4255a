use crate::foundation::core::GeoPoint;
use crate::foundation::error::{VoyageError, VoyageResult};

/// A numeric cell as read from the track table.
///
/// Loading is lenient: a cell that does not parse keeps its raw text so the failure can be
/// reported (with its source line) when a scene actually needs the value.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell<T> {
    /// Parsed value.
    Value(T),
    /// Empty or unparseable text, kept verbatim.
    Malformed(String),
}

impl<T: Copy> Cell<T> {
    /// Return the parsed value, if any.
    pub fn value(&self) -> Option<T> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Malformed(_) => None,
        }
    }
}

impl<T: std::str::FromStr> Cell<T> {
    pub(crate) fn parse(raw: &str) -> Self {
        match raw.trim().parse::<T>() {
            Ok(v) => Self::Value(v),
            Err(_) => Self::Malformed(raw.to_string()),
        }
    }
}

/// One recorded position along a ship's course.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackPoint {
    /// 1-based line in the source file (header is line 1).
    pub line: u64,
    /// Longitude in degrees.
    pub lon: Cell<f64>,
    /// Latitude in degrees.
    pub lat: Cell<f64>,
    /// Trip identifier (`group`).
    pub trip: String,
    /// Sub-path identifier (`group.regroup`).
    pub subpath: String,
    /// Year of the observation.
    pub year: Cell<i32>,
    /// Nationality of the ship.
    pub nation: String,
}

impl TrackPoint {
    /// Parsed position, or a compose error naming the offending line.
    pub fn position(&self) -> VoyageResult<GeoPoint> {
        let lon = self.coordinate("longitude", &self.lon)?;
        let lat = self.coordinate("latitude", &self.lat)?;
        Ok(GeoPoint::new(lon, lat))
    }

    /// Parsed year, or a compose error naming the offending line.
    pub fn year(&self) -> VoyageResult<i32> {
        match &self.year {
            Cell::Value(y) => Ok(*y),
            Cell::Malformed(raw) => Err(VoyageError::compose(format!(
                "line {}: undefined year {raw:?}",
                self.line
            ))),
        }
    }

    /// Key of the continuous path segment this point belongs to.
    pub fn path_key(&self) -> (&str, &str) {
        (&self.trip, &self.subpath)
    }

    fn coordinate(&self, what: &str, cell: &Cell<f64>) -> VoyageResult<f64> {
        match cell {
            Cell::Value(v) if v.is_finite() => Ok(*v),
            Cell::Value(v) => Err(VoyageError::compose(format!(
                "line {}: non-finite {what} {v}",
                self.line
            ))),
            Cell::Malformed(raw) => Err(VoyageError::compose(format!(
                "line {}: non-numeric {what} {raw:?}",
                self.line
            ))),
        }
    }
}
