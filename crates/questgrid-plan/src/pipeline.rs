use questgrid_core::{Waypoints, WorldMap};
use questgrid_paths::{DistanceMatrix, TerrainPather, build_distance_matrix};

use crate::allocation::{Allocation, solve_allocation};
use crate::config::PlanConfig;
use crate::error::PlanError;
use crate::route::{Route, solve_route};

/// A complete plan: where to go, in which order, and with which boosters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expedition {
    pub waypoints: Waypoints,
    pub matrix: DistanceMatrix,
    pub route: Route,
    pub allocation: Allocation,
    /// Terrain cost of walking the route.
    pub travel_cost: i64,
    /// Time spent on events.
    pub event_time: f64,
    /// `travel_cost + event_time`.
    pub total_cost: f64,
}

/// Run every stage on `map`: distance matrix, route, booster allocation.
pub fn plan_expedition(map: &WorldMap, config: &PlanConfig) -> Result<Expedition, PlanError> {
    let waypoints = map.waypoints()?;
    let bounds = map.terrain.bounds();
    waypoints.check_bounds(bounds)?;

    let costs = map.marker_costs(&config.terrain);
    let pather = TerrainPather::new(map.model(&costs));
    let matrix = build_distance_matrix(&waypoints, &pather, bounds)?;
    log::info!(
        "distance matrix ready: {} points on a {}x{} map",
        matrix.len(),
        bounds.width(),
        bounds.height()
    );

    let route = solve_route(&matrix)?;
    if !route.is_feasible() {
        return Err(PlanError::NoRoute);
    }
    log::info!("route found: cost {}, {} events", route.cost, route.events().len());

    let allocation = solve_allocation(
        route.events(),
        &config.difficulties,
        &config.boosters,
        config.policy,
    )?;
    log::info!("boosters allocated: event time {:.4}", allocation.total_time);

    let travel_cost = route.cost;
    let event_time = allocation.total_time;
    Ok(Expedition {
        waypoints,
        matrix,
        route,
        allocation,
        travel_cost,
        event_time,
        total_cost: travel_cost as f64 + event_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{AllocationPolicy, Booster};
    use crate::error::AllocError;
    use approx::assert_relative_eq;
    use questgrid_core::{MapSymbols, TerrainCosts};

    fn parse(text: &str) -> WorldMap {
        WorldMap::parse(text, &MapSymbols::default()).unwrap()
    }

    #[test]
    fn plans_a_small_map() {
        let map = parse(
            "\
i..1.
.##M.
2...Z",
        );
        let cfg = PlanConfig::default();
        let exp = plan_expedition(&map, &cfg).unwrap();

        assert_eq!(exp.matrix.labels(), &['i', '1', '2', 'Z']);
        assert_eq!(exp.route.order.first(), Some(&'i'));
        assert_eq!(exp.route.order.last(), Some(&'Z'));
        assert_eq!(exp.route.realized_cost(&exp.matrix), Some(exp.travel_cost));
        assert_eq!(exp.allocation.events.len(), 2);
        assert_relative_eq!(exp.total_cost, exp.travel_cost as f64 + exp.event_time);
    }

    #[test]
    fn route_order_on_a_corridor() {
        // Walking 1 then 2 is the only way that does not double back.
        let map = parse("i.1.2.Z");
        let exp = plan_expedition(&map, &PlanConfig::default()).unwrap();
        assert_eq!(exp.route.order, vec!['i', '1', '2', 'Z']);
        assert_eq!(exp.travel_cost, 6);
        assert_relative_eq!(exp.event_time, exp.allocation.total_time);
    }

    #[test]
    fn no_events_still_reaches_goal() {
        let map = parse("i..Z");
        let exp = plan_expedition(&map, &PlanConfig::default()).unwrap();
        assert_eq!(exp.route.order, vec!['i', 'Z']);
        assert_eq!(exp.travel_cost, 3);
        assert_eq!(exp.event_time, 0.0);
    }

    #[test]
    fn walled_event_means_no_route() {
        let map = parse("i.#1\n..##\n...Z");
        assert_eq!(
            plan_expedition(&map, &PlanConfig::default()),
            Err(PlanError::NoRoute)
        );
    }

    #[test]
    fn custom_event_symbol_is_walkable() {
        let symbols = MapSymbols {
            events: vec!['X'],
            ..MapSymbols::default()
        };
        let map = WorldMap::parse("i.X.Z", &symbols).unwrap();
        let cfg = PlanConfig {
            symbols,
            difficulties: [('X', 40.0)].into_iter().collect(),
            ..PlanConfig::default()
        };
        let exp = plan_expedition(&map, &cfg).unwrap();
        assert_eq!(exp.route.order, vec!['i', 'X', 'Z']);
        assert_eq!(exp.travel_cost, 4);
    }

    #[test]
    fn partial_terrain_table_keeps_markers_open() {
        let map = parse("i.1.Z");
        let cfg = PlanConfig {
            terrain: TerrainCosts::new()
                .with('.', 1)
                .unwrap()
                .with('M', 50)
                .unwrap(),
            ..PlanConfig::default()
        };
        let exp = plan_expedition(&map, &cfg).unwrap();
        assert_eq!(exp.route.order, vec!['i', '1', 'Z']);
        assert_eq!(exp.travel_cost, 4);
    }

    #[test]
    fn explicit_marker_price_is_kept() {
        let map = parse("i.1.Z");
        let cfg = PlanConfig {
            terrain: TerrainCosts::default().with('1', 9).unwrap(),
            ..PlanConfig::default()
        };
        let exp = plan_expedition(&map, &cfg).unwrap();
        assert_eq!(exp.travel_cost, 12);
    }

    #[test]
    fn allocation_errors_surface() {
        let map = parse("i1234Z");
        let cfg = PlanConfig {
            boosters: vec![Booster::new("lone", 1.0, 3)],
            policy: AllocationPolicy::KeepOneIntact,
            ..PlanConfig::default()
        };
        assert_eq!(
            plan_expedition(&map, &cfg),
            Err(PlanError::Allocation(AllocError::Infeasible {
                tasks: 4,
                capacity: 2
            }))
        );
    }
}
