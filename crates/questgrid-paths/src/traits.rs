use questgrid_core::Point;

/// Anything that can list the cells one move away from a cell.
pub trait Pather {
    /// Append the cells reachable in one step from `p` into `buf`. The caller
    /// clears `buf` before calling.
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>);
}

/// Pather with weighted edges.
pub trait WeightedPather: Pather {
    /// Cost of stepping from `from` into adjacent `to`. Must be ≥ 0; searches
    /// abort with [`PathError::NegativeCost`](crate::PathError::NegativeCost)
    /// otherwise.
    fn cost(&self, from: Point, to: Point) -> i32;
}

/// Full A* pather with an admissible heuristic.
pub trait AstarPather: WeightedPather {
    /// Heuristic estimate of the cost from `from` to `to`.
    /// Must never overestimate the true cost (admissible).
    fn estimate(&self, from: Point, to: Point) -> i32;
}
