//! Exact open-path route planning (Held–Karp).
//!
//! The start and goal are fixed; the events in between are permuted. State
//! `(mask, j)` holds the cheapest cost of leaving the start, visiting exactly
//! the events in `mask`, and standing on event `j ∈ mask`. Values and
//! predecessors live in two flat tables of `2^k × k` entries.

use questgrid_paths::{DistanceMatrix, UNREACHABLE};

use crate::error::PlanError;

/// Largest number of intermediate events the planner accepts.
pub const MAX_ROUTE_EVENTS: usize = 18;

/// Cost sentinel of a route that does not exist.
pub const NO_ROUTE: i64 = i64::MAX;

const NO_PARENT: u8 = u8::MAX;

/// An ordered visit of every point of interest.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Sum of matrix entries along `order`, or [`NO_ROUTE`].
    pub cost: i64,
    /// Labels from start to goal; empty when no route exists.
    pub order: Vec<char>,
}

impl Route {
    /// The "no route" result.
    pub fn none() -> Self {
        Self {
            cost: NO_ROUTE,
            order: Vec::new(),
        }
    }

    /// Whether a route was found.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.cost != NO_ROUTE
    }

    /// The intermediate labels, start and goal stripped.
    pub fn events(&self) -> &[char] {
        match self.order.len() {
            0..=2 => &[],
            n => &self.order[1..n - 1],
        }
    }

    /// Re-add the matrix entries along `order`. `None` if a label is unknown
    /// or a leg is unreachable.
    pub fn realized_cost(&self, matrix: &DistanceMatrix) -> Option<i64> {
        let index = |l: char| matrix.labels().iter().position(|&x| x == l);
        self.order.windows(2).try_fold(0i64, |acc, w| {
            let d = matrix.get(index(w[0])?, index(w[1])?);
            (d != UNREACHABLE).then(|| acc + i64::from(d))
        })
    }
}

/// Cheapest path from the matrix's first label to its last, visiting every
/// label in between exactly once.
///
/// Returns [`Route::none`] when an event cannot be reached from the start,
/// cannot reach the goal, or no finite ordering exists.
pub fn solve_route(matrix: &DistanceMatrix) -> Result<Route, PlanError> {
    let n = matrix.len();
    if n < 2 {
        return Err(PlanError::MissingEndpoints(n));
    }
    let k = n - 2;
    if k > MAX_ROUTE_EVENTS {
        return Err(PlanError::TooManyEvents {
            count: k,
            max: MAX_ROUTE_EVENTS,
        });
    }

    let labels = matrix.labels();
    let start = 0;
    let goal = n - 1;
    let dist = |a: usize, b: usize| -> Option<i64> {
        let d = matrix.get(a, b);
        (d != UNREACHABLE).then_some(i64::from(d))
    };

    if k == 0 {
        return Ok(match dist(start, goal) {
            Some(cost) => Route {
                cost,
                order: vec![labels[start], labels[goal]],
            },
            None => Route::none(),
        });
    }

    // Every event must be reachable from the start and reach the goal.
    for e in 1..=k {
        if dist(start, e).is_none() || dist(e, goal).is_none() {
            log::debug!("route precheck: event '{}' cut off", labels[e]);
            return Ok(Route::none());
        }
    }

    let size = 1usize << k;
    let mut dp = vec![NO_ROUTE; size * k];
    let mut parent = vec![NO_PARENT; size * k];

    for j in 0..k {
        if let Some(d) = dist(start, 1 + j) {
            dp[(1 << j) * k + j] = d;
        }
    }

    for mask in 1..size {
        for j in 0..k {
            if mask & (1 << j) == 0 {
                continue;
            }
            let prev = mask ^ (1 << j);
            if prev == 0 {
                continue;
            }
            let mut best = NO_ROUTE;
            let mut best_p = NO_PARENT;
            for p in 0..k {
                if prev & (1 << p) == 0 {
                    continue;
                }
                let c_prev = dp[prev * k + p];
                if c_prev == NO_ROUTE {
                    continue;
                }
                let Some(step) = dist(1 + p, 1 + j) else {
                    continue;
                };
                let c = c_prev + step;
                if c < best {
                    best = c;
                    best_p = p as u8;
                }
            }
            dp[mask * k + j] = best;
            parent[mask * k + j] = best_p;
        }
    }

    let full = size - 1;
    let mut best = NO_ROUTE;
    let mut last = None;
    for j in 0..k {
        let c = dp[full * k + j];
        if c == NO_ROUTE {
            continue;
        }
        let Some(close) = dist(1 + j, goal) else {
            continue;
        };
        if c + close < best {
            best = c + close;
            last = Some(j);
        }
    }

    let Some(mut j) = last else {
        log::debug!("route: no finite ordering over {k} events");
        return Ok(Route::none());
    };

    let mut events = Vec::with_capacity(k);
    let mut mask = full;
    loop {
        events.push(labels[1 + j]);
        let p = parent[mask * k + j];
        mask ^= 1 << j;
        if p == NO_PARENT {
            break;
        }
        j = usize::from(p);
    }
    events.reverse();

    let mut order = Vec::with_capacity(n);
    order.push(labels[start]);
    order.extend(events);
    order.push(labels[goal]);

    log::debug!("route over {k} events: cost {best}, {size} subsets");
    Ok(Route { cost: best, order })
}
