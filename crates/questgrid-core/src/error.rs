//! Errors raised while building maps, cost tables and waypoint sets.

use thiserror::Error;

use crate::geom::Point;

/// Malformed map input. Every variant is fatal for the run that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("terrain '{symbol}' has negative cost {cost}")]
    NegativeCost { symbol: char, cost: i32 },
    #[error("map has no rows")]
    EmptyMap,
    #[error("map has no start cell '{0}'")]
    MissingStart(char),
    #[error("map has no goal cell '{0}'")]
    MissingGoal(char),
    #[error("label '{0}' names more than one point of interest")]
    DuplicateLabel(char),
    #[error("waypoints must run start, events, goal")]
    WaypointOrder,
    #[error("point of interest '{label}' at {pos} lies outside the map")]
    OutOfBounds { label: char, pos: Point },
}
