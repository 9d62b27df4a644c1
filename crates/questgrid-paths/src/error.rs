use questgrid_core::Point;
use thiserror::Error;

/// Fatal search input errors. Unreachable targets are not errors; they are
/// reported through [`UNREACHABLE`](crate::UNREACHABLE).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("negative step cost {cost} from {from} to {to}")]
    NegativeCost { from: Point, to: Point, cost: i32 },
    #[error("accumulated path cost overflowed entering {0}")]
    CostOverflow(Point),
    #[error("distance matrix must be {expected}x{expected}, found a dimension of {found}")]
    MatrixShape { expected: usize, found: usize },
    #[error("distance matrix over {labels} labels needs {labels}x{labels} entries, found {found}")]
    MatrixLength { labels: usize, found: usize },
}
