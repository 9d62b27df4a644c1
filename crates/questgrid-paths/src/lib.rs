//! Shortest-path searches over terrain grids.
//!
//! - **A\*** single-target search ([`SearchSpace::astar_path`])
//! - **Multi-target** search finishing once every target is settled
//!   ([`SearchSpace::multi_target_costs`])
//! - **Distance matrices** over a set of waypoints ([`build_distance_matrix`])
//!
//! Searches run through [`SearchSpace`], which owns and reuses its node
//! arrays so that repeated queries on one grid allocate nothing after the
//! first call.
//!
//! # Trait hierarchy
//!
//! | Trait | Required for |
//! |---|---|
//! | [`Pather`] | neighbour enumeration |
//! | [`WeightedPather`] : [`Pather`] | step costs |
//! | [`AstarPather`] : [`WeightedPather`] | A*, multi-target search, matrices |
//!
//! [`TerrainPather`] implements all three for a
//! [`TerrainModel`](questgrid_core::TerrainModel).

mod astar;
mod error;
mod matrix;
mod multi;
mod space;
mod terrain;
mod traits;

pub use astar::PathOutcome;
pub use error::PathError;
pub use matrix::{DistanceMatrix, build_distance_matrix};
pub use space::{PathNode, SearchSpace, SearchStats, UNREACHABLE};
pub use terrain::TerrainPather;
pub use traits::{AstarPather, Pather, WeightedPather};
