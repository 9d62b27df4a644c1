//! **questgrid-core**: grid geometry, terrain costs and points of interest.
//!
//! This crate holds the read-only inputs of the planning pipeline: the
//! terrain grid and its cost table ([`TerrainModel`]), the canonical list of
//! points of interest ([`Waypoints`]) and a parser turning a text map into
//! both ([`WorldMap`]).

pub mod error;
pub mod geom;
pub mod map;
pub mod poi;
pub mod terrain;

pub use error::MapError;
pub use geom::{Point, Range};
pub use map::{MapSymbols, WorldMap};
pub use poi::{Poi, PoiKind, Waypoints};
pub use terrain::{MARKER_COST, TerrainCosts, TerrainGrid, TerrainModel};
