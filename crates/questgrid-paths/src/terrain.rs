use questgrid_core::{Point, TerrainModel};

use crate::space::UNREACHABLE;
use crate::traits::{AstarPather, Pather, WeightedPather};

/// Four-directional pather over a [`TerrainModel`].
///
/// A move costs the entry cost of the destination cell; impassable cells are
/// never offered as neighbours. The heuristic is the Manhattan distance
/// scaled by the cheapest terrain in the cost table, which keeps it
/// admissible and consistent even when a zero-cost terrain exists.
#[derive(Clone, Copy, Debug)]
pub struct TerrainPather<'a> {
    model: TerrainModel<'a>,
    floor: i32,
}

impl<'a> TerrainPather<'a> {
    pub fn new(model: TerrainModel<'a>) -> Self {
        Self {
            floor: model.min_step_cost(),
            model,
        }
    }
}

impl Pather for TerrainPather<'_> {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        for n in p.neighbors_4() {
            if self.model.cost_at(n).is_some() {
                buf.push(n);
            }
        }
    }
}

impl WeightedPather for TerrainPather<'_> {
    fn cost(&self, _from: Point, to: Point) -> i32 {
        self.model.cost_at(to).unwrap_or(UNREACHABLE)
    }
}

impl AstarPather for TerrainPather<'_> {
    fn estimate(&self, from: Point, to: Point) -> i32 {
        from.manhattan(to).saturating_mul(self.floor)
    }
}
