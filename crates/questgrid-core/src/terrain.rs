//! Terrain symbols, their traversal costs, and the combined [`TerrainModel`].
//!
//! A cell's cost is charged when a walker *enters* it. Symbols missing from
//! the [`TerrainCosts`] table are impassable.

use std::collections::BTreeMap;

use crate::error::MapError;
use crate::geom::{Point, Range};
use crate::map::DEFAULT_EVENT_SYMBOLS;

// ---------------------------------------------------------------------------
// TerrainCosts
// ---------------------------------------------------------------------------

/// Entry cost of a start, goal or event cell the table does not price.
pub const MARKER_COST: i32 = 1;

/// Mapping from terrain symbol to a non-negative entry cost.
///
/// Negative costs are rejected on insertion, so every table that exists is
/// safe to search with.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "BTreeMap<char, i32>", into = "BTreeMap<char, i32>")
)]
pub struct TerrainCosts {
    costs: BTreeMap<char, i32>,
}

impl TerrainCosts {
    /// An empty table: every symbol is impassable.
    pub fn new() -> Self {
        Self {
            costs: BTreeMap::new(),
        }
    }

    /// Set the cost of `symbol` (builder).
    pub fn with(mut self, symbol: char, cost: i32) -> Result<Self, MapError> {
        self.set(symbol, cost)?;
        Ok(self)
    }

    /// Set the cost of `symbol`, replacing any previous value.
    pub fn set(&mut self, symbol: char, cost: i32) -> Result<(), MapError> {
        if cost < 0 {
            return Err(MapError::NegativeCost { symbol, cost });
        }
        self.costs.insert(symbol, cost);
        Ok(())
    }

    /// Entry cost of `symbol`, or `None` if it cannot be entered.
    #[inline]
    pub fn cost(&self, symbol: char) -> Option<i32> {
        self.costs.get(&symbol).copied()
    }

    /// Price every symbol in `markers` at [`MARKER_COST`], keeping any cost
    /// the table already holds for it.
    pub fn with_markers<I>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        for m in markers {
            self.costs.entry(m).or_insert(MARKER_COST);
        }
        self
    }

    /// Cheapest entry cost in the table. `None` if nothing is passable.
    pub fn min_cost(&self) -> Option<i32> {
        self.costs.values().copied().min()
    }

    /// Iterate `(symbol, cost)` pairs in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (char, i32)> + '_ {
        self.costs.iter().map(|(&s, &c)| (s, c))
    }
}

impl Default for TerrainCosts {
    /// The stock table: mountain, water, snow, lava, forest, desert, rock,
    /// open ground, and the start/goal/event markers at cost 1. `#` walls are
    /// left out and so are impassable.
    fn default() -> Self {
        let costs = BTreeMap::from([
            ('M', 50),
            ('A', 20),
            ('N', 15),
            ('L', 15),
            ('F', 10),
            ('D', 8),
            ('R', 5),
            ('.', 1),
        ]);
        Self { costs }.with_markers(['i', 'Z'].into_iter().chain(DEFAULT_EVENT_SYMBOLS.chars()))
    }
}

impl TryFrom<BTreeMap<char, i32>> for TerrainCosts {
    type Error = MapError;

    fn try_from(costs: BTreeMap<char, i32>) -> Result<Self, MapError> {
        if let Some((&symbol, &cost)) = costs.iter().find(|(_, c)| **c < 0) {
            return Err(MapError::NegativeCost { symbol, cost });
        }
        Ok(Self { costs })
    }
}

impl From<TerrainCosts> for BTreeMap<char, i32> {
    fn from(t: TerrainCosts) -> Self {
        t.costs
    }
}

// ---------------------------------------------------------------------------
// TerrainGrid
// ---------------------------------------------------------------------------

/// A rectangular, row-major grid of terrain symbols.
///
/// Unlike a display grid this one owns its storage outright: it is built once
/// per map and only read afterwards, so it can be shared across threads.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainGrid {
    cells: Vec<char>,
    width: i32,
    height: i32,
}

impl TerrainGrid {
    /// Create a `width` × `height` grid filled with `fill`.
    pub fn new(width: i32, height: i32, fill: char) -> Self {
        let w = width.max(0);
        let h = height.max(0);
        Self {
            cells: vec![fill; (w as usize) * (h as usize)],
            width: w,
            height: h,
        }
    }

    /// Build a grid from text rows. Rows shorter than the widest one are
    /// padded on the right with `filler`.
    pub fn from_rows<I, S>(rows: I, filler: char) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows: Vec<Vec<char>> = rows
            .into_iter()
            .map(|r| r.as_ref().chars().collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut cells = Vec::with_capacity(width * rows.len());
        for row in &rows {
            cells.extend_from_slice(row);
            cells.extend(std::iter::repeat_n(filler, width - row.len()));
        }
        Self {
            cells,
            width: width as i32,
            height: rows.len() as i32,
        }
    }

    /// The bounding range of the grid, anchored at the origin.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::with_size(self.width, self.height)
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height {
            Some((p.y as usize) * (self.width as usize) + (p.x as usize))
        } else {
            None
        }
    }

    /// Symbol at `p`, or `None` outside the grid.
    #[inline]
    pub fn at(&self, p: Point) -> Option<char> {
        self.index(p).map(|i| self.cells[i])
    }

    /// Overwrite the symbol at `p`. No-op outside the grid.
    pub fn set(&mut self, p: Point, symbol: char) {
        if let Some(i) = self.index(p) {
            self.cells[i] = symbol;
        }
    }

    /// Row-major iterator over `(Point, symbol)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Point, char)> + '_ {
        self.bounds().iter().zip(self.cells.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// TerrainModel
// ---------------------------------------------------------------------------

/// Read-only view answering "what does it cost to enter this cell?".
#[derive(Clone, Copy, Debug)]
pub struct TerrainModel<'a> {
    grid: &'a TerrainGrid,
    costs: &'a TerrainCosts,
}

impl<'a> TerrainModel<'a> {
    /// Combine a grid with a cost table.
    pub fn new(grid: &'a TerrainGrid, costs: &'a TerrainCosts) -> Self {
        Self { grid, costs }
    }

    /// Entry cost of the cell at `p`; `None` if it is impassable or outside
    /// the grid.
    #[inline]
    pub fn cost_at(&self, p: Point) -> Option<i32> {
        self.grid.at(p).and_then(|s| self.costs.cost(s))
    }

    /// The grid bounds.
    #[inline]
    pub fn bounds(&self) -> Range {
        self.grid.bounds()
    }

    /// Lower bound on the cost of a single step, used to scale distance
    /// heuristics.
    #[inline]
    pub fn min_step_cost(&self) -> i32 {
        self.costs.min_cost().unwrap_or(0)
    }
}
