//! Text map parsing.
//!
//! A map is one text line per grid row. Every character is a terrain symbol;
//! the start, goal and event markers are ordinary symbols whose first
//! occurrence also records a point of interest.

use std::collections::BTreeMap;

use crate::error::MapError;
use crate::geom::Point;
use crate::poi::Waypoints;
use crate::terrain::{TerrainCosts, TerrainGrid, TerrainModel};

/// Event markers recognized by default.
pub const DEFAULT_EVENT_SYMBOLS: &str = "1234567890BCEGHJ";

/// Which symbols mark points of interest, and how raw characters are
/// normalized before use.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MapSymbols {
    pub start: char,
    pub goal: char,
    pub events: Vec<char>,
    /// `(raw, normalized)` replacements applied to every character.
    pub aliases: Vec<(char, char)>,
    /// Symbol used to pad short rows. Should be impassable.
    pub filler: char,
}

impl Default for MapSymbols {
    fn default() -> Self {
        Self {
            start: 'i',
            goal: 'Z',
            events: DEFAULT_EVENT_SYMBOLS.chars().collect(),
            aliases: vec![('I', 'i'), ('f', 'F')],
            filler: '#',
        }
    }
}

impl MapSymbols {
    #[inline]
    fn normalize(&self, ch: char) -> char {
        self.aliases
            .iter()
            .find(|&&(raw, _)| raw == ch)
            .map_or(ch, |&(_, norm)| norm)
    }
}

/// A parsed map: terrain plus the located points of interest.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldMap {
    pub terrain: TerrainGrid,
    pub start: Point,
    pub goal: Point,
    pub events: BTreeMap<char, Point>,
    pub start_label: char,
    pub goal_label: char,
}

impl WorldMap {
    /// Parse a text map.
    ///
    /// Only the first occurrence of each marker counts; later duplicates are
    /// plain terrain.
    pub fn parse(text: &str, symbols: &MapSymbols) -> Result<Self, MapError> {
        let rows: Vec<String> = text
            .lines()
            .map(|line| line.chars().map(|c| symbols.normalize(c)).collect())
            .collect();
        if rows.iter().all(|r| r.is_empty()) {
            return Err(MapError::EmptyMap);
        }
        let terrain = TerrainGrid::from_rows(&rows, symbols.filler);

        let mut start = None;
        let mut goal = None;
        let mut events = BTreeMap::new();
        for (p, ch) in terrain.iter() {
            if ch == symbols.start {
                start.get_or_insert(p);
            } else if ch == symbols.goal {
                goal.get_or_insert(p);
            } else if symbols.events.contains(&ch) {
                events.entry(ch).or_insert(p);
            }
        }

        Ok(Self {
            start: start.ok_or(MapError::MissingStart(symbols.start))?,
            goal: goal.ok_or(MapError::MissingGoal(symbols.goal))?,
            terrain,
            events,
            start_label: symbols.start,
            goal_label: symbols.goal,
        })
    }

    /// The points of interest in canonical order.
    pub fn waypoints(&self) -> Result<Waypoints, MapError> {
        Waypoints::new(
            (self.start_label, self.start),
            (self.goal_label, self.goal),
            self.events.iter().map(|(&l, &p)| (l, p)),
        )
    }

    /// `base` extended so that every marker on this map can be entered.
    ///
    /// Markers keep an explicit price from `base`; the rest cost
    /// [`MARKER_COST`](crate::terrain::MARKER_COST).
    pub fn marker_costs(&self, base: &TerrainCosts) -> TerrainCosts {
        let markers = [self.start_label, self.goal_label];
        base.clone()
            .with_markers(markers.into_iter().chain(self.events.keys().copied()))
    }

    /// A cost view of this map under `costs`.
    pub fn model<'a>(&'a self, costs: &'a TerrainCosts) -> TerrainModel<'a> {
        TerrainModel::new(&self.terrain, costs)
    }
}
