//! Route planning and booster allocation.
//!
//! The two exact dynamic programs downstream of the distance matrix:
//!
//! - [`solve_route`]: Held–Karp over subsets of events, fixed start and goal.
//! - [`solve_allocation`]: booster assignment over a usage-vector state
//!   table, with one booster kept a use short of its cap.
//!
//! [`plan_expedition`] chains map → matrix → route → allocation.

mod allocation;
mod config;
mod error;
mod pipeline;
mod route;

pub use allocation::{
    Allocation, AllocationPolicy, Booster, EventAllocation, MAX_BOOSTERS, MAX_USAGE_STATES,
    solve_allocation,
};
pub use config::{PlanConfig, default_boosters, default_difficulties};
pub use error::{AllocError, PlanError};
pub use pipeline::{Expedition, plan_expedition};
pub use route::{MAX_ROUTE_EVENTS, NO_ROUTE, Route, solve_route};
