//! Points of interest in canonical order.

use crate::error::MapError;
use crate::geom::{Point, Range};

/// Role of a point of interest in a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoiKind {
    Start,
    Event,
    Goal,
}

/// A labelled map location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Poi {
    pub label: char,
    pub pos: Point,
    pub kind: PoiKind,
}

/// The start, every event, and the goal, in canonical order
/// `[start, events sorted by label..., goal]`.
///
/// Labels are unique across all entries. Index 0 is always the start and the
/// last index is always the goal; the matrix and route stages rely on this.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<Poi>", into = "Vec<Poi>")
)]
pub struct Waypoints {
    pois: Vec<Poi>,
}

impl Waypoints {
    /// Build the canonical list. Event order in the input does not matter.
    pub fn new<I>(start: (char, Point), goal: (char, Point), events: I) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = (char, Point)>,
    {
        let mut evs: Vec<(char, Point)> = events.into_iter().collect();
        evs.sort_by_key(|&(label, _)| label);

        let mut pois = Vec::with_capacity(evs.len() + 2);
        pois.push(Poi {
            label: start.0,
            pos: start.1,
            kind: PoiKind::Start,
        });
        pois.extend(evs.into_iter().map(|(label, pos)| Poi {
            label,
            pos,
            kind: PoiKind::Event,
        }));
        pois.push(Poi {
            label: goal.0,
            pos: goal.1,
            kind: PoiKind::Goal,
        });

        let mut seen: Vec<char> = pois.iter().map(|p| p.label).collect();
        seen.sort_unstable();
        if let Some(w) = seen.windows(2).find(|w| w[0] == w[1]) {
            return Err(MapError::DuplicateLabel(w[0]));
        }
        Ok(Self { pois })
    }

    /// All points of interest in canonical order.
    #[inline]
    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    /// Number of points of interest, start and goal included.
    #[inline]
    pub fn len(&self) -> usize {
        self.pois.len()
    }

    /// Always `false`: a waypoint set holds at least its start and goal.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    /// Labels in canonical order.
    pub fn labels(&self) -> Vec<char> {
        self.pois.iter().map(|p| p.label).collect()
    }

    /// Positions in canonical order.
    pub fn positions(&self) -> Vec<Point> {
        self.pois.iter().map(|p| p.pos).collect()
    }

    /// The start entry.
    #[inline]
    pub fn start(&self) -> &Poi {
        &self.pois[0]
    }

    /// The goal entry.
    #[inline]
    pub fn goal(&self) -> &Poi {
        &self.pois[self.pois.len() - 1]
    }

    /// The events, sorted by label.
    #[inline]
    pub fn events(&self) -> &[Poi] {
        &self.pois[1..self.pois.len() - 1]
    }

    /// Canonical index of `label`.
    pub fn index_of(&self, label: char) -> Option<usize> {
        self.pois.iter().position(|p| p.label == label)
    }

    /// Entry carrying `label`.
    pub fn get(&self, label: char) -> Option<&Poi> {
        self.pois.iter().find(|p| p.label == label)
    }

    /// Fail if any point lies outside `bounds`.
    pub fn check_bounds(&self, bounds: Range) -> Result<(), MapError> {
        match self.pois.iter().find(|p| !bounds.contains(p.pos)) {
            Some(p) => Err(MapError::OutOfBounds {
                label: p.label,
                pos: p.pos,
            }),
            None => Ok(()),
        }
    }
}

impl TryFrom<Vec<Poi>> for Waypoints {
    type Error = MapError;

    /// Re-validate a stored list: one start first, one goal last, events in
    /// between. Events are re-sorted and labels re-checked.
    fn try_from(pois: Vec<Poi>) -> Result<Self, MapError> {
        let [first, inner @ .., last] = pois.as_slice() else {
            return Err(MapError::WaypointOrder);
        };
        if first.kind != PoiKind::Start
            || last.kind != PoiKind::Goal
            || inner.iter().any(|p| p.kind != PoiKind::Event)
        {
            return Err(MapError::WaypointOrder);
        }
        Self::new(
            (first.label, first.pos),
            (last.label, last.pos),
            inner.iter().map(|p| (p.label, p.pos)),
        )
    }
}

impl From<Waypoints> for Vec<Poi> {
    fn from(w: Waypoints) -> Self {
        w.pois
    }
}
