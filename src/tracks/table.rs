use std::collections::HashSet;
use std::fmt;

use crate::foundation::error::{VoyageError, VoyageResult};
use crate::tracks::point::TrackPoint;

/// Attribute used to partition the table into animation frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// One frame per year (numeric order).
    #[default]
    Year,
    /// One frame per nationality (lexicographic order).
    Nation,
}

/// Order in which distinct grouping values are visited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOrder {
    /// Natural order of the attribute (ascending years).
    #[default]
    Sorted,
    /// Order of first appearance in the source table.
    FirstAppearance,
}

/// One distinct value of a [`GroupBy`] attribute.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    /// A year.
    Year(i32),
    /// A nationality.
    Nation(String),
}

impl GroupKey {
    /// Parse `s` as a key of attribute `by`.
    pub fn parse(by: GroupBy, s: &str) -> VoyageResult<Self> {
        match by {
            GroupBy::Year => s
                .trim()
                .parse::<i32>()
                .map(Self::Year)
                .map_err(|_| VoyageError::validation(format!("invalid year {s:?}"))),
            GroupBy::Nation => {
                let t = s.trim();
                if t.is_empty() {
                    return Err(VoyageError::validation("nation must be non-empty"));
                }
                Ok(Self::Nation(t.to_string()))
            }
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(y) => write!(f, "{y}"),
            Self::Nation(n) => f.write_str(n),
        }
    }
}

/// The immutable track-point table, read once at startup.
#[derive(Clone, Debug, Default)]
pub struct TrackTable {
    points: Vec<TrackPoint>,
}

impl TrackTable {
    /// Wrap already-loaded points. Stored order is preserved.
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }

    /// All points in stored order.
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return `true` when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Unfiltered view over every row.
    pub fn view_all(&self) -> TrackView<'_> {
        TrackView {
            points: self.points.iter().collect(),
        }
    }

    /// Key of `p` under attribute `by`, failing on undefined values.
    pub fn key_of(p: &TrackPoint, by: GroupBy) -> VoyageResult<GroupKey> {
        match by {
            GroupBy::Year => p.year().map(GroupKey::Year),
            GroupBy::Nation => {
                let n = p.nation.trim();
                if n.is_empty() {
                    return Err(VoyageError::compose(format!(
                        "line {}: undefined nation",
                        p.line
                    )));
                }
                Ok(GroupKey::Nation(n.to_string()))
            }
        }
    }

    /// Distinct values of `by`, in the requested order.
    pub fn distinct_keys(&self, by: GroupBy, order: KeyOrder) -> VoyageResult<Vec<GroupKey>> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for p in &self.points {
            let k = Self::key_of(p, by)?;
            if seen.insert(k.clone()) {
                keys.push(k);
            }
        }
        if order == KeyOrder::Sorted {
            keys.sort();
        }
        Ok(keys)
    }

    /// Read-only view of the rows whose `by` attribute equals `key`.
    ///
    /// A key absent from the table yields an empty view.
    pub fn filter(&self, by: GroupBy, key: &GroupKey) -> VoyageResult<TrackView<'_>> {
        let mut points = Vec::new();
        for p in &self.points {
            if &Self::key_of(p, by)? == key {
                points.push(p);
            }
        }
        Ok(TrackView { points })
    }
}

/// Borrowed subset of a [`TrackTable`], in stored order.
#[derive(Clone, Debug, Default)]
pub struct TrackView<'a> {
    points: Vec<&'a TrackPoint>,
}

impl<'a> TrackView<'a> {
    /// Points in stored order.
    pub fn points(&self) -> &[&'a TrackPoint] {
        &self.points
    }

    /// Number of rows in the view.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return `true` when the view selects no rows.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tracks/table.rs"]
mod tests;
