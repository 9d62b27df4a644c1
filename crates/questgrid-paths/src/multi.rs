//! One search, many targets.

use std::collections::BinaryHeap;

use questgrid_core::Point;

use crate::error::PathError;
use crate::space::{NodeRef, PathNode, SearchSpace};
use crate::traits::AstarPather;

/// Smallest estimate from `p` to any remaining target; 0 once none remain.
fn nearest_estimate<P: AstarPather>(pather: &P, p: Point, remaining: &[Point]) -> i32 {
    remaining
        .iter()
        .map(|&t| pather.estimate(p, t))
        .min()
        .unwrap_or(0)
}

impl SearchSpace {
    /// Cheapest costs from `source` to each of `targets`, from a single
    /// search.
    ///
    /// The heuristic is the smallest estimate to any target not yet settled.
    /// A target is settled, and dropped from that minimum, when it is popped
    /// from the open heap. The search stops once every target is settled or
    /// the frontier runs dry; targets never reached are absent from the
    /// result. Results come back in settling order.
    ///
    /// A node whose cost improves after it was expanded is reopened. Heap
    /// keys pushed under an older, smaller heuristic may be stale, and
    /// reopening keeps the settled costs exact regardless.
    pub fn multi_target_costs<P: AstarPather>(
        &mut self,
        pather: &P,
        source: Point,
        targets: &[Point],
    ) -> Result<Vec<PathNode>, PathError> {
        let mut found = Vec::with_capacity(targets.len());

        let mut remaining: Vec<Point> = targets
            .iter()
            .copied()
            .filter(|&t| self.rng.contains(t))
            .collect();
        remaining.sort_unstable();
        remaining.dedup();

        let Some(start_idx) = self.idx(source) else {
            return Ok(found);
        };
        if remaining.is_empty() {
            return Ok(found);
        }

        let cur_gen = self.begin();
        self.relax(start_idx, 0, usize::MAX, cur_gen);

        let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();
        open.push(NodeRef {
            idx: start_idx,
            f: nearest_estimate(pather, source, &remaining),
        });
        self.stats.pushed += 1;

        let mut nbuf = std::mem::take(&mut self.nbuf);

        let outcome: Result<(), PathError> = 'search: loop {
            let Some(current) = open.pop() else {
                break 'search Ok(());
            };

            let ci = current.idx;
            if self.nodes[ci].generation != cur_gen || !self.nodes[ci].open {
                continue;
            }
            self.nodes[ci].open = false;
            self.stats.expanded += 1;

            let current_g = self.nodes[ci].g;
            let current_point = self.point(ci);

            if let Some(k) = remaining.iter().position(|&t| t == current_point) {
                remaining.swap_remove(k);
                found.push(PathNode {
                    pos: current_point,
                    cost: current_g,
                });
                if remaining.is_empty() {
                    break 'search Ok(());
                }
            }

            nbuf.clear();
            pather.neighbors(current_point, &mut nbuf);

            for &np in nbuf.iter() {
                let Some(ni) = self.idx(np) else {
                    continue;
                };
                let step = pather.cost(current_point, np);
                if step < 0 {
                    break 'search Err(PathError::NegativeCost {
                        from: current_point,
                        to: np,
                        cost: step,
                    });
                }
                let Some(tentative_g) = current_g.checked_add(step) else {
                    break 'search Err(PathError::CostOverflow(np));
                };

                if self.relax(ni, tentative_g, ci, cur_gen) {
                    let h = nearest_estimate(pather, np, &remaining);
                    open.push(NodeRef {
                        idx: ni,
                        f: tentative_g.saturating_add(h),
                    });
                    self.stats.pushed += 1;
                }
            }
        };

        self.nbuf = nbuf;
        outcome?;

        log::trace!(
            "multi-target from {source}: settled {}/{} targets, expanded {}",
            found.len(),
            found.len() + remaining.len(),
            self.stats.expanded
        );

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astar::tests::{GraphPather, brute_force_cost};
    use crate::space::UNREACHABLE;
    use crate::TerrainPather;
    use questgrid_core::{Range, TerrainCosts, TerrainGrid, TerrainModel};

    fn cost_of(found: &[PathNode], p: Point) -> i32 {
        found
            .iter()
            .find(|n| n.pos == p)
            .map_or(UNREACHABLE, |n| n.cost)
    }

    #[test]
    fn settles_every_target() {
        let g = TerrainGrid::from_rows(
            [
                "..F..", //
                ".#M#.", //
                ".....",
            ],
            '#',
        );
        let costs = TerrainCosts::default();
        let model = TerrainModel::new(&g, &costs);
        let pather = TerrainPather::new(model);
        let mut sp = SearchSpace::new(g.bounds());
        let src = Point::new(0, 0);
        let targets = [Point::new(4, 0), Point::new(2, 1), Point::new(2, 2)];
        let found = sp.multi_target_costs(&pather, src, &targets).unwrap();
        assert_eq!(found.len(), 3);
        for t in targets {
            assert_eq!(cost_of(&found, t), brute_force_cost(&model, src, t));
        }
    }

    #[test]
    fn unreachable_targets_are_absent() {
        let a = Point::new(0, 0);
        let b = Point::new(1, 0);
        let c = Point::new(2, 0);
        let d = Point::new(3, 0);
        let pather = GraphPather {
            edges: vec![(a, b, 1), (c, d, 1)],
        };
        let mut sp = SearchSpace::new(Range::with_size(4, 1));
        let found = sp.multi_target_costs(&pather, a, &[b, d]).unwrap();
        assert_eq!(found, vec![PathNode { pos: b, cost: 1 }]);

        let none = sp.multi_target_costs(&pather, a, &[d]).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn source_as_target_costs_zero() {
        let g = TerrainGrid::new(3, 3, 'F');
        let costs = TerrainCosts::default();
        let pather = TerrainPather::new(TerrainModel::new(&g, &costs));
        let mut sp = SearchSpace::new(g.bounds());
        let p = Point::new(1, 1);
        let found = sp
            .multi_target_costs(&pather, p, &[p, Point::new(2, 1)])
            .unwrap();
        assert_eq!(cost_of(&found, p), 0);
        assert_eq!(cost_of(&found, Point::new(2, 1)), 10);
    }

    #[test]
    fn duplicate_and_out_of_range_targets() {
        let g = TerrainGrid::new(3, 1, '.');
        let costs = TerrainCosts::default();
        let pather = TerrainPather::new(TerrainModel::new(&g, &costs));
        let mut sp = SearchSpace::new(g.bounds());
        let t = Point::new(2, 0);
        let found = sp
            .multi_target_costs(&pather, Point::new(0, 0), &[t, t, Point::new(7, 7)])
            .unwrap();
        assert_eq!(found, vec![PathNode { pos: t, cost: 2 }]);
    }

    /// A single-target run agrees with A* for every pair on every 3x3 map
    /// over {open, forest, wall}.
    #[test]
    fn single_target_agrees_with_astar() {
        let symbols = ['.', 'F', '#'];
        let costs = TerrainCosts::default();
        let rng = Range::with_size(3, 3);
        let mut sp = SearchSpace::new(rng);
        for code in (0..3usize.pow(9)).step_by(7) {
            let mut g = TerrainGrid::new(3, 3, '.');
            let mut c = code;
            for p in rng.iter() {
                g.set(p, symbols[c % 3]);
                c /= 3;
            }
            let pather = TerrainPather::new(TerrainModel::new(&g, &costs));
            for from in rng.iter() {
                for to in rng.iter() {
                    let astar = sp.astar_path(&pather, from, to).unwrap().cost;
                    let multi = sp.multi_target_costs(&pather, from, &[to]).unwrap();
                    assert_eq!(cost_of(&multi, to), astar, "map {code} {from}->{to}");
                }
            }
        }
    }

    /// Targets spread in opposite directions, so the heuristic target
    /// switches mid-search and stale keys are in the heap.
    #[test]
    fn opposite_targets_with_costly_middle() {
        let g = TerrainGrid::from_rows(
            [
                "MMMMMMMMM", //
                "....i....", //
                "MMMM.MMMM",
            ],
            '#',
        );
        let costs = TerrainCosts::default();
        let model = TerrainModel::new(&g, &costs);
        let pather = TerrainPather::new(model);
        let mut sp = SearchSpace::new(g.bounds());
        let src = Point::new(4, 1);
        let targets = [Point::new(0, 0), Point::new(8, 2), Point::new(4, 2)];
        let found = sp.multi_target_costs(&pather, src, &targets).unwrap();
        for t in targets {
            assert_eq!(cost_of(&found, t), brute_force_cost(&model, src, t));
        }
        assert!(sp.last_stats().expanded > 0);
    }
}
