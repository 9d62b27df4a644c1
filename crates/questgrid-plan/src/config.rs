use std::collections::BTreeMap;

use questgrid_core::{MapSymbols, TerrainCosts};

use crate::allocation::{AllocationPolicy, Booster};

/// Everything [`plan_expedition`](crate::plan_expedition) needs besides the
/// map itself.
///
/// Missing fields fall back to the stock tables when deserialized.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlanConfig {
    pub terrain: TerrainCosts,
    pub symbols: MapSymbols,
    /// Difficulty per event label.
    pub difficulties: BTreeMap<char, f64>,
    pub boosters: Vec<Booster>,
    pub policy: AllocationPolicy,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainCosts::default(),
            symbols: MapSymbols::default(),
            difficulties: default_difficulties(),
            boosters: default_boosters(),
            policy: AllocationPolicy::default(),
        }
    }
}

/// Stock difficulty for each of the sixteen default event markers.
pub fn default_difficulties() -> BTreeMap<char, f64> {
    BTreeMap::from([
        ('1', 55.0),
        ('2', 60.0),
        ('3', 65.0),
        ('4', 70.0),
        ('5', 75.0),
        ('6', 90.0),
        ('7', 95.0),
        ('8', 120.0),
        ('9', 125.0),
        ('0', 130.0),
        ('B', 135.0),
        ('C', 150.0),
        ('E', 155.0),
        ('G', 160.0),
        ('H', 170.0),
        ('J', 180.0),
    ])
}

/// The stock pool: five boosters with five uses each.
pub fn default_boosters() -> Vec<Booster> {
    [
        ("Godrick", 1.6),
        ("Radahn", 1.4),
        ("Morgott", 1.3),
        ("Malenia", 1.2),
        ("Rykard", 1.0),
    ]
    .into_iter()
    .map(|(name, power)| Booster::new(name, power, 5))
    .collect()
}
