use questgrid_core::MapError;
use questgrid_paths::PathError;
use thiserror::Error;

/// Booster allocation input errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocError {
    #[error("no boosters configured")]
    NoBoosters,
    #[error("{count} boosters configured, at most {max} are supported")]
    TooManyBoosters { count: usize, max: usize },
    #[error("booster '{name}' has invalid power {power}")]
    InvalidPower { name: String, power: f64 },
    #[error("event '{0}' has no configured difficulty")]
    MissingDifficulty(char),
    #[error("event '{label}' has invalid difficulty {value}")]
    InvalidDifficulty { label: char, value: f64 },
    #[error("booster caps need {states} usage states, at most {max} are supported")]
    StateSpaceTooLarge { states: usize, max: usize },
    #[error("booster caps {caps:?} give more usage states than fit in memory")]
    StateSpaceOverflow { caps: Vec<u32> },
    #[error("{tasks} events cannot be served by boosters with {capacity} total uses")]
    Infeasible { tasks: usize, capacity: u32 },
}

/// Errors from the planning stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Allocation(#[from] AllocError),
    #[error("a route needs a start and a goal, got {0} points")]
    MissingEndpoints(usize),
    #[error("{count} events exceed the exact route planner limit of {max}")]
    TooManyEvents { count: usize, max: usize },
    #[error("no route visits every event and reaches the goal")]
    NoRoute,
}
