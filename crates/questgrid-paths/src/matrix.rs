//! All-pairs distances over a waypoint set.

use questgrid_core::{Point, Range, Waypoints};

use crate::error::PathError;
use crate::space::{SearchSpace, UNREACHABLE};
use crate::traits::AstarPather;

/// Square origin × destination cost table over labelled points.
///
/// Entry `(i, j)` is the cheapest cost from label `i` to label `j`, or
/// [`UNREACHABLE`]. The diagonal is zero. Rows are computed independently, so
/// the table is only symmetric when the underlying costs are.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawMatrix", into = "RawMatrix")
)]
pub struct DistanceMatrix {
    labels: Vec<char>,
    dist: Vec<i32>,
}

/// Stored form of a [`DistanceMatrix`], checked on the way back in.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawMatrix {
    labels: Vec<char>,
    dist: Vec<i32>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawMatrix> for DistanceMatrix {
    type Error = PathError;

    fn try_from(raw: RawMatrix) -> Result<Self, PathError> {
        let n = raw.labels.len();
        if n.checked_mul(n) != Some(raw.dist.len()) {
            return Err(PathError::MatrixLength {
                labels: n,
                found: raw.dist.len(),
            });
        }
        Ok(Self {
            labels: raw.labels,
            dist: raw.dist,
        })
    }
}

#[cfg(feature = "serde")]
impl From<DistanceMatrix> for RawMatrix {
    fn from(m: DistanceMatrix) -> Self {
        Self {
            labels: m.labels,
            dist: m.dist,
        }
    }
}

impl DistanceMatrix {
    /// A matrix with a zero diagonal and every other entry unreachable.
    pub fn unreachable(labels: Vec<char>) -> Self {
        let n = labels.len();
        let mut dist = vec![UNREACHABLE; n * n];
        for i in 0..n {
            dist[i * n + i] = 0;
        }
        Self { labels, dist }
    }

    /// Build from explicit rows. Diagonal entries are taken as given.
    pub fn from_rows(labels: Vec<char>, rows: Vec<Vec<i32>>) -> Result<Self, PathError> {
        let n = labels.len();
        if rows.len() != n {
            return Err(PathError::MatrixShape {
                expected: n,
                found: rows.len(),
            });
        }
        let mut dist = Vec::with_capacity(n * n);
        for row in rows {
            if row.len() != n {
                return Err(PathError::MatrixShape {
                    expected: n,
                    found: row.len(),
                });
            }
            dist.extend(row);
        }
        Ok(Self { labels, dist })
    }

    /// Number of labels (rows / columns).
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the matrix has no labels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in row order.
    #[inline]
    pub fn labels(&self) -> &[char] {
        &self.labels
    }

    /// Entry `(i, j)`; [`UNREACHABLE`] when no path exists.
    ///
    /// # Panics
    ///
    /// If `i` or `j` is out of bounds.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> i32 {
        self.dist[i * self.len() + j]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, d: i32) {
        let n = self.len();
        self.dist[i * n + j] = d;
    }

    /// Row `i`.
    #[inline]
    pub fn row(&self, i: usize) -> &[i32] {
        let n = self.len();
        &self.dist[i * n..(i + 1) * n]
    }

    /// Cost between two labels, `None` if either label is unknown or the
    /// pair is unreachable.
    pub fn cost(&self, from: char, to: char) -> Option<i32> {
        let i = self.labels.iter().position(|&l| l == from)?;
        let j = self.labels.iter().position(|&l| l == to)?;
        Some(self.get(i, j)).filter(|&d| d != UNREACHABLE)
    }

    /// Whether `(i, j) == (j, i)` for every pair.
    pub fn is_symmetric(&self) -> bool {
        let n = self.len();
        (0..n).all(|i| (i + 1..n).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

/// Fill one row: a single multi-target search from waypoint `i`.
fn matrix_row<P: AstarPather>(
    space: &mut SearchSpace,
    pather: &P,
    i: usize,
    positions: &[Point],
) -> Result<Vec<i32>, PathError> {
    let targets: Vec<Point> = positions
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(_, &p)| p)
        .collect();
    let found = space.multi_target_costs(pather, positions[i], &targets)?;

    let row = positions
        .iter()
        .enumerate()
        .map(|(j, &p)| {
            if j == i {
                0
            } else {
                found
                    .iter()
                    .find(|n| n.pos == p)
                    .map_or(UNREACHABLE, |n| n.cost)
            }
        })
        .collect();
    log::debug!(
        "matrix row {i}: {} of {} targets reached, {} nodes expanded",
        found.len(),
        targets.len(),
        space.last_stats().expanded
    );
    Ok(row)
}

/// Build the distance matrix over `waypoints` in their canonical order.
///
/// One multi-target search runs per waypoint. With the `parallel` feature the
/// rows are spread over a rayon pool, each worker with its own
/// [`SearchSpace`]; every individual search stays sequential.
pub fn build_distance_matrix<P: AstarPather + Sync>(
    waypoints: &Waypoints,
    pather: &P,
    bounds: Range,
) -> Result<DistanceMatrix, PathError> {
    let positions = waypoints.positions();
    let n = positions.len();

    #[cfg(feature = "parallel")]
    let rows: Vec<Vec<i32>> = {
        use rayon::prelude::*;
        (0..n)
            .into_par_iter()
            .map_init(
                || SearchSpace::new(bounds),
                |space, i| matrix_row(space, pather, i, &positions),
            )
            .collect::<Result<_, _>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Vec<i32>> = {
        let mut space = SearchSpace::new(bounds);
        (0..n)
            .map(|i| matrix_row(&mut space, pather, i, &positions))
            .collect::<Result<_, _>>()?
    };

    let mut matrix = DistanceMatrix::unreachable(waypoints.labels());
    for (i, row) in rows.into_iter().enumerate() {
        for (j, d) in row.into_iter().enumerate() {
            matrix.set(i, j, d);
        }
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TerrainPather;
    use crate::astar::tests::brute_force_cost;
    use questgrid_core::{MapSymbols, TerrainCosts, WorldMap};

    const MAP: &str = "\
i....M....
.###.M.#..
..1..A.#2.
.#####.#..
....F...#Z
.3..F.....";

    fn build(map: &WorldMap, costs: &TerrainCosts) -> DistanceMatrix {
        let pather = TerrainPather::new(map.model(costs));
        build_distance_matrix(&map.waypoints().unwrap(), &pather, map.terrain.bounds()).unwrap()
    }

    #[test]
    fn matrix_matches_pairwise_searches() {
        let map = WorldMap::parse(MAP, &MapSymbols::default()).unwrap();
        let costs = TerrainCosts::default();
        let m = build(&map, &costs);
        let wp = map.waypoints().unwrap();
        assert_eq!(m.labels(), &['i', '1', '2', '3', 'Z']);

        let model = map.model(&costs);
        for (i, a) in wp.pois().iter().enumerate() {
            assert_eq!(m.get(i, i), 0);
            for (j, b) in wp.pois().iter().enumerate() {
                if i != j {
                    assert_eq!(m.get(i, j), brute_force_cost(&model, a.pos, b.pos));
                }
            }
        }
    }

    #[test]
    fn symmetric_when_entry_costs_are_uniform() {
        let map = WorldMap::parse(MAP, &MapSymbols::default()).unwrap();
        // Every passable terrain costs the same, so both directions match.
        let mut costs = TerrainCosts::new();
        for (sym, _) in TerrainCosts::default().iter() {
            costs.set(sym, 3).unwrap();
        }
        let m = build(&map, &costs);
        assert!(m.is_symmetric());
        for i in 0..m.len() {
            assert_eq!(m.get(i, i), 0);
        }
    }

    #[test]
    fn walled_off_goal_is_unreachable() {
        let map = WorldMap::parse("i.1#Z", &MapSymbols::default()).unwrap();
        let costs = TerrainCosts::default();
        let m = build(&map, &costs);
        assert_eq!(m.cost('i', '1'), Some(2));
        assert_eq!(m.cost('i', 'Z'), None);
        assert_eq!(m.get(2, 0), UNREACHABLE);
        assert_eq!(m.row(2), &[UNREACHABLE, UNREACHABLE, 0]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_rows_match_one_search_space() {
        let map = WorldMap::parse(MAP, &MapSymbols::default()).unwrap();
        let costs = TerrainCosts::default();
        let pather = TerrainPather::new(map.model(&costs));
        let wp = map.waypoints().unwrap();
        let positions = wp.positions();

        let mut space = SearchSpace::new(map.terrain.bounds());
        let rows: Vec<Vec<i32>> = (0..positions.len())
            .map(|i| matrix_row(&mut space, &pather, i, &positions).unwrap())
            .collect();
        let expected = DistanceMatrix::from_rows(wp.labels(), rows).unwrap();

        for _ in 0..4 {
            assert_eq!(build(&map, &costs), expected);
        }
    }

    #[test]
    fn from_rows_checks_shape() {
        assert!(DistanceMatrix::from_rows(vec!['a', 'b'], vec![vec![0, 1]]).is_err());
        assert!(DistanceMatrix::from_rows(vec!['a', 'b'], vec![vec![0, 1], vec![1]]).is_err());
        let m = DistanceMatrix::from_rows(vec!['a', 'b'], vec![vec![0, 1], vec![2, 0]]).unwrap();
        assert!(!m.is_symmetric());
        assert_eq!(m.cost('b', 'a'), Some(2));
        assert_eq!(m.cost('a', 'q'), None);
    }
}
