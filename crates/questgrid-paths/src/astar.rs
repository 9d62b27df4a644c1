use std::collections::BinaryHeap;

use questgrid_core::Point;

use crate::error::PathError;
use crate::space::{NodeRef, SearchSpace, UNREACHABLE};
use crate::traits::AstarPather;

/// Result of a single-target search.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathOutcome {
    /// Sum of entry costs along `path`, or [`UNREACHABLE`].
    pub cost: i32,
    /// Cells from source to destination inclusive; empty when unreachable.
    pub path: Vec<Point>,
}

impl PathOutcome {
    /// The "no path" outcome.
    pub fn unreachable() -> Self {
        Self {
            cost: UNREACHABLE,
            path: Vec::new(),
        }
    }

    /// Whether a path was found.
    #[inline]
    pub fn is_reachable(&self) -> bool {
        self.cost != UNREACHABLE
    }

    /// Number of moves along the path.
    #[inline]
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

impl SearchSpace {
    /// Compute a cheapest path from `from` to `to` using A*.
    ///
    /// Costs are charged on entering a cell, so the source contributes
    /// nothing. Returns [`PathOutcome::unreachable`] when no path exists or
    /// either endpoint is outside the range.
    pub fn astar_path<P: AstarPather>(
        &mut self,
        pather: &P,
        from: Point,
        to: Point,
    ) -> Result<PathOutcome, PathError> {
        let (Some(start_idx), Some(goal_idx)) = (self.idx(from), self.idx(to)) else {
            return Ok(PathOutcome::unreachable());
        };

        let cur_gen = self.begin();

        if start_idx == goal_idx {
            return Ok(PathOutcome {
                cost: 0,
                path: vec![from],
            });
        }

        self.relax(start_idx, 0, usize::MAX, cur_gen);
        let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();
        open.push(NodeRef {
            idx: start_idx,
            f: pather.estimate(from, to),
        });
        self.stats.pushed += 1;

        let mut nbuf = std::mem::take(&mut self.nbuf);

        let found: Result<bool, PathError> = 'search: loop {
            let Some(current) = open.pop() else {
                break 'search Ok(false);
            };

            let ci = current.idx;

            // Skip stale entries.
            if self.nodes[ci].generation != cur_gen || !self.nodes[ci].open {
                continue;
            }

            if ci == goal_idx {
                break 'search Ok(true);
            }

            self.nodes[ci].open = false;
            self.stats.expanded += 1;
            let current_g = self.nodes[ci].g;
            let current_point = self.point(ci);

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
                    let f = tentative_g.saturating_add(pather.estimate(np, to));
                    open.push(NodeRef { idx: ni, f });
                    self.stats.pushed += 1;
                }
            }
        };

        self.nbuf = nbuf;

        log::trace!(
            "astar {from} -> {to}: expanded {} pushed {}",
            self.stats.expanded,
            self.stats.pushed
        );

        if !found? {
            return Ok(PathOutcome::unreachable());
        }

        Ok(PathOutcome {
            cost: self.nodes[goal_idx].g,
            path: self.trace(goal_idx),
        })
    }
}
