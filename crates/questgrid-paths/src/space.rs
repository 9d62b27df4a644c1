use questgrid_core::{Point, Range};

/// A position with an associated cost, returned from multi-target queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathNode {
    pub pos: Point,
    pub cost: i32,
}

/// Sentinel cost meaning "unreachable".
pub const UNREACHABLE: i32 = i32::MAX;

/// Counters for the most recent search run through a [`SearchSpace`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped and expanded (finalized).
    pub expanded: usize,
    /// Entries pushed onto the open heap, stale ones included.
    pub pushed: usize,
}

// ---------------------------------------------------------------------------
// Internal node for priority-queue searches
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub(crate) struct Node {
    pub(crate) g: i32,
    pub(crate) parent: usize,
    pub(crate) generation: u32,
    pub(crate) open: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: UNREACHABLE,
            parent: usize::MAX,
            generation: 0,
            open: false,
        }
    }
}

/// Reference into the node array, ordered by `f` for use in `BinaryHeap`.
#[derive(Clone, Copy, Eq, PartialEq)]
pub(crate) struct NodeRef {
    pub(crate) idx: usize,
    pub(crate) f: i32,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest f first.
        other.f.cmp(&self.f)
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// SearchSpace
// ---------------------------------------------------------------------------

/// Reusable scratch state for searches on one grid rectangle.
///
/// Node records are stamped with a generation counter. Each search bumps the
/// counter, which invalidates every record left by earlier searches without
/// touching the array, so the open/closed bookkeeping of one call never leaks
/// into the next.
pub struct SearchSpace {
    pub(crate) rng: Range,
    pub(crate) width: usize,
    pub(crate) nodes: Vec<Node>,
    pub(crate) generation: u32,
    pub(crate) stats: SearchStats,
    // shared scratch buffer for neighbor queries
    pub(crate) nbuf: Vec<Point>,
}

impl SearchSpace {
    /// Create a search space covering `rng`.
    pub fn new(rng: Range) -> Self {
        Self {
            rng,
            width: rng.width().max(0) as usize,
            nodes: vec![Node::default(); rng.len()],
            generation: 0,
            stats: SearchStats::default(),
            nbuf: Vec::with_capacity(4),
        }
    }

    /// The grid rectangle being searched.
    #[inline]
    pub fn range(&self) -> Range {
        self.rng
    }

    /// Statistics of the last completed search.
    #[inline]
    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Start a new search: returns the fresh generation stamp.
    pub(crate) fn begin(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: old stamps could collide, wipe them.
            for n in self.nodes.iter_mut() {
                n.generation = 0;
            }
            self.generation = 1;
        }
        self.stats = SearchStats::default();
        self.generation
    }

    /// Current best `g` of node `i` in generation `cur_gen`.
    #[cfg(test)]
    pub(crate) fn g_of(&self, i: usize, cur_gen: u32) -> i32 {
        let n = &self.nodes[i];
        if n.generation == cur_gen { n.g } else { UNREACHABLE }
    }

    /// Record a tentative `g` for node `i` if it improves on the current one.
    /// Returns `true` when the node was updated and must be pushed.
    #[inline]
    pub(crate) fn relax(&mut self, i: usize, g: i32, parent: usize, cur_gen: u32) -> bool {
        let n = &mut self.nodes[i];
        if n.generation == cur_gen && g >= n.g {
            return false;
        }
        n.generation = cur_gen;
        n.g = g;
        n.parent = parent;
        n.open = true;
        true
    }

    /// Walk parent links back from `goal`, returning the path source-first.
    pub(crate) fn trace(&self, goal: usize) -> Vec<Point> {
        let mut path = Vec::new();
        let mut ci = goal;
        while ci != usize::MAX {
            path.push(self.point(ci));
            ci = self.nodes[ci].parent;
        }
        path.reverse();
        path
    }

    // -----------------------------------------------------------------------
    // Coordinate helpers
    // -----------------------------------------------------------------------

    /// Convert a `Point` to a flat index. Returns `None` if out of range.
    #[inline]
    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        if !self.rng.contains(p) {
            return None;
        }
        let x = (p.x - self.rng.min.x) as usize;
        let y = (p.y - self.rng.min.y) as usize;
        Some(y * self.width + x)
    }

    /// Convert a flat index back to a `Point`.
    #[inline]
    pub(crate) fn point(&self, idx: usize) -> Point {
        let x = (idx % self.width) as i32 + self.rng.min.x;
        let y = (idx / self.width) as i32 + self.rng.min.y;
        Point::new(x, y)
    }
}
