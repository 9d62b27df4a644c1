//! Booster allocation.
//!
//! Each event on the route is served by a non-empty subset of boosters and
//! takes `difficulty / Σ power` time. A booster has a limited number of uses.
//! The inner DP walks the events in order over the table of usage vectors
//! `0 ≤ u_b ≤ cap_b`, encoded mixed-radix, keeping the cheapest time per
//! state. Under [`AllocationPolicy::KeepOneIntact`] an outer loop lowers each
//! booster's cap by one in turn and keeps the best run, so the winning usage
//! ends with one booster a single use short.

use std::collections::BTreeMap;

use crate::error::AllocError;

/// Most boosters a pool may hold. Subsets are enumerated as bitmasks.
pub const MAX_BOOSTERS: usize = 8;

/// Most usage vectors the state table may hold.
pub const MAX_USAGE_STATES: usize = 1 << 18;

const NO_PREV: u32 = u32::MAX;

/// A limited-use multiplier applied to events.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Booster {
    pub name: String,
    pub power: f64,
    pub uses: u32,
}

impl Booster {
    pub fn new(name: impl Into<String>, power: f64, uses: u32) -> Self {
        Self {
            name: name.into(),
            power,
            uses,
        }
    }
}

/// How many booster uses the allocation may spend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AllocationPolicy {
    /// Leave exactly one booster a single use short of its cap.
    #[default]
    KeepOneIntact,
    /// Every use is available.
    UseAll,
}

/// Boosters assigned to one event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventAllocation {
    pub label: char,
    pub difficulty: f64,
    /// Indices into the booster pool, ascending.
    pub boosters: Vec<usize>,
    /// Sum of the selected powers.
    pub power: f64,
    /// `difficulty / power`.
    pub time: f64,
}

/// Result of [`solve_allocation`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allocation {
    /// Sum of the per-event times, in event order.
    pub total_time: f64,
    pub events: Vec<EventAllocation>,
    /// Uses spent per booster, in pool order.
    pub usage: Vec<u32>,
    /// The booster left one use short, when the usage has that shape.
    pub kept_intact: Option<usize>,
    /// Exactly one booster ended at `cap - 1` and every other at `cap`.
    pub keep_rule_satisfied: bool,
}

/// Mixed-radix encoding of usage vectors bounded by `caps`.
struct UsageSpace {
    caps: Vec<u32>,
    strides: Vec<usize>,
    len: usize,
}

impl UsageSpace {
    fn new(caps: &[u32]) -> Option<Self> {
        let mut strides = Vec::with_capacity(caps.len());
        let mut len = 1usize;
        for &c in caps {
            strides.push(len);
            len = len.checked_mul(c as usize + 1)?;
        }
        Some(Self {
            caps: caps.to_vec(),
            strides,
            len,
        })
    }

    #[inline]
    fn digit(&self, state: usize, b: usize) -> u32 {
        ((state / self.strides[b]) % (self.caps[b] as usize + 1)) as u32
    }

    /// State after spending one use of every booster in `mask`, if no cap is
    /// exceeded.
    fn step(&self, state: usize, mask: u32) -> Option<usize> {
        let mut next = state;
        for b in 0..self.caps.len() {
            if mask & (1 << b) == 0 {
                continue;
            }
            if self.digit(state, b) >= self.caps[b] {
                return None;
            }
            next += self.strides[b];
        }
        Some(next)
    }

    /// The subset that leads from `prev` to `next`.
    fn mask_between(&self, prev: usize, next: usize) -> u32 {
        (0..self.caps.len())
            .filter(|&b| self.digit(next, b) > self.digit(prev, b))
            .fold(0, |m, b| m | (1 << b))
    }

    fn usage(&self, state: usize) -> Vec<u32> {
        (0..self.caps.len()).map(|b| self.digit(state, b)).collect()
    }
}

/// Best assignment found by one inner run.
struct InnerRun {
    total: f64,
    masks: Vec<u32>,
    usage: Vec<u32>,
}

/// Every non-empty subset with its power, summed in pool order.
fn subset_powers(boosters: &[Booster]) -> Vec<(u32, f64)> {
    (1u32..(1 << boosters.len()))
        .map(|mask| {
            let power = boosters
                .iter()
                .enumerate()
                .filter(|&(b, _)| mask & (1 << b) != 0)
                .map(|(_, bo)| bo.power)
                .sum();
            (mask, power)
        })
        .collect()
}

fn run_inner(
    difficulties: &[f64],
    subsets: &[(u32, f64)],
    caps: &[u32],
) -> Result<Option<InnerRun>, AllocError> {
    let space = UsageSpace::new(caps).ok_or_else(|| AllocError::StateSpaceOverflow {
        caps: caps.to_vec(),
    })?;
    if space.len > MAX_USAGE_STATES {
        return Err(AllocError::StateSpaceTooLarge {
            states: space.len,
            max: MAX_USAGE_STATES,
        });
    }
    let n = difficulties.len();
    let len = space.len;

    let mut cur = vec![f64::INFINITY; len];
    cur[0] = 0.0;
    let mut back = vec![NO_PREV; n * len];

    for (t, &d) in difficulties.iter().enumerate() {
        let mut next = vec![f64::INFINITY; len];
        for (s, &base) in cur.iter().enumerate() {
            if !base.is_finite() {
                continue;
            }
            for &(mask, power) in subsets {
                let Some(ns) = space.step(s, mask) else {
                    continue;
                };
                let c = base + d / power;
                if c < next[ns] {
                    next[ns] = c;
                    back[t * len + ns] = s as u32;
                }
            }
        }
        cur = next;
    }

    let Some((terminal, &total)) = cur
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .min_by(|a, b| a.1.total_cmp(b.1))
    else {
        return Ok(None);
    };

    let mut masks = vec![0; n];
    let mut s = terminal;
    for t in (0..n).rev() {
        let prev = back[t * len + s] as usize;
        masks[t] = space.mask_between(prev, s);
        s = prev;
    }

    log::debug!("allocation over caps {caps:?}: {len} states, best {total:.4}");
    Ok(Some(InnerRun {
        total,
        masks,
        usage: space.usage(terminal),
    }))
}

/// The single booster left at `cap - 1` while every other sits at `cap`.
fn kept_one_short(usage: &[u32], boosters: &[Booster]) -> Option<usize> {
    let mut kept = None;
    for (b, (&u, bo)) in usage.iter().zip(boosters).enumerate() {
        if u == bo.uses {
            continue;
        }
        if kept.is_some() || bo.uses.checked_sub(1) != Some(u) {
            return None;
        }
        kept = Some(b);
    }
    kept
}

fn validate(
    labels: &[char],
    difficulties: &BTreeMap<char, f64>,
    boosters: &[Booster],
) -> Result<Vec<f64>, AllocError> {
    if boosters.is_empty() {
        return Err(AllocError::NoBoosters);
    }
    if boosters.len() > MAX_BOOSTERS {
        return Err(AllocError::TooManyBoosters {
            count: boosters.len(),
            max: MAX_BOOSTERS,
        });
    }
    if let Some(bad) = boosters
        .iter()
        .find(|b| !(b.power.is_finite() && b.power > 0.0))
    {
        return Err(AllocError::InvalidPower {
            name: bad.name.clone(),
            power: bad.power,
        });
    }
    labels
        .iter()
        .map(|&label| {
            let value = *difficulties
                .get(&label)
                .ok_or(AllocError::MissingDifficulty(label))?;
            if value.is_finite() && value > 0.0 {
                Ok(value)
            } else {
                Err(AllocError::InvalidDifficulty { label, value })
            }
        })
        .collect()
}

/// Assign boosters to `labels`, in order, minimizing the total event time.
///
/// Ties between candidate runs go to the booster earliest in the pool.
pub fn solve_allocation(
    labels: &[char],
    difficulties: &BTreeMap<char, f64>,
    boosters: &[Booster],
    policy: AllocationPolicy,
) -> Result<Allocation, AllocError> {
    let diffs = validate(labels, difficulties, boosters)?;
    let caps: Vec<u32> = boosters.iter().map(|b| b.uses).collect();

    if diffs.is_empty() {
        return Ok(Allocation {
            total_time: 0.0,
            events: Vec::new(),
            usage: vec![0; boosters.len()],
            kept_intact: None,
            keep_rule_satisfied: false,
        });
    }

    let subsets = subset_powers(boosters);
    let nominal = caps.iter().fold(0u32, |acc, &c| acc.saturating_add(c));

    let (best, capacity) = match policy {
        AllocationPolicy::UseAll => (run_inner(&diffs, &subsets, &caps)?, nominal),
        AllocationPolicy::KeepOneIntact => {
            let mut best: Option<InnerRun> = None;
            for (k, &cap) in caps.iter().enumerate() {
                if cap == 0 {
                    continue;
                }
                let mut lowered = caps.clone();
                lowered[k] -= 1;
                let Some(run) = run_inner(&diffs, &subsets, &lowered)? else {
                    continue;
                };
                log::debug!("keeping '{}' short: {:.4}", boosters[k].name, run.total);
                if best.as_ref().is_none_or(|b| run.total < b.total) {
                    best = Some(run);
                }
            }
            (best, nominal.saturating_sub(1))
        }
    };

    let Some(run) = best else {
        return Err(AllocError::Infeasible {
            tasks: diffs.len(),
            capacity,
        });
    };

    let events: Vec<EventAllocation> = labels
        .iter()
        .zip(&diffs)
        .zip(&run.masks)
        .map(|((&label, &difficulty), &mask)| {
            let picked: Vec<usize> = (0..boosters.len())
                .filter(|&b| mask & (1 << b) != 0)
                .collect();
            let power = picked.iter().map(|&b| boosters[b].power).sum::<f64>();
            EventAllocation {
                label,
                difficulty,
                boosters: picked,
                power,
                time: difficulty / power,
            }
        })
        .collect();
    let total_time = events.iter().fold(0.0, |acc, e| acc + e.time);

    let kept_intact = kept_one_short(&run.usage, boosters);
    if policy == AllocationPolicy::KeepOneIntact && kept_intact.is_none() {
        log::warn!(
            "booster usage {:?} does not leave exactly one booster a use short",
            run.usage
        );
    }

    Ok(Allocation {
        total_time,
        events,
        usage: run.usage,
        kept_intact,
        keep_rule_satisfied: kept_intact.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pool(powers: &[f64], uses: u32) -> Vec<Booster> {
        powers
            .iter()
            .enumerate()
            .map(|(i, &p)| Booster::new(format!("b{i}"), p, uses))
            .collect()
    }

    fn table(pairs: &[(char, f64)]) -> BTreeMap<char, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn single_event_takes_every_booster() {
        let boosters = pool(&[1.6, 1.4, 1.3, 1.2, 1.0], 5);
        let d = table(&[('1', 55.0)]);
        let a = solve_allocation(&['1'], &d, &boosters, AllocationPolicy::KeepOneIntact).unwrap();
        assert_eq!(a.events.len(), 1);
        assert_eq!(a.events[0].boosters, vec![0, 1, 2, 3, 4]);
        assert_relative_eq!(a.events[0].power, 6.5, epsilon = 1e-12);
        assert_relative_eq!(a.total_time, 55.0 / 6.5, epsilon = 1e-12);
        assert_eq!(a.usage, vec![1; 5]);
        assert!(!a.keep_rule_satisfied);
        assert_eq!(a.kept_intact, None);
    }

    #[test]
    fn full_default_instance_keeps_one_short() {
        let boosters = pool(&[1.6, 1.4, 1.3, 1.2, 1.0], 5);
        let labels: Vec<char> = "1234567890BCEGHJ".chars().collect();
        let values = [
            55.0, 60.0, 65.0, 70.0, 75.0, 90.0, 95.0, 120.0, 125.0, 130.0, 135.0, 150.0, 155.0,
            160.0, 170.0, 180.0,
        ];
        let d: BTreeMap<char, f64> = labels.iter().copied().zip(values).collect();
        let a = solve_allocation(&labels, &d, &boosters, AllocationPolicy::KeepOneIntact).unwrap();

        let mut sorted = a.usage.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![4, 5, 5, 5, 5]);
        assert!(a.keep_rule_satisfied);
        let kept = a.kept_intact.unwrap();
        assert_eq!(a.usage[kept], 4);

        for e in &a.events {
            assert!(!e.boosters.is_empty());
            assert_relative_eq!(e.time, e.difficulty / e.power);
        }
        let sum: f64 = a.events.iter().map(|e| e.time).sum();
        assert_relative_eq!(a.total_time, sum, max_relative = 1e-12);
        let labels_out: Vec<char> = a.events.iter().map(|e| e.label).collect();
        assert_eq!(labels_out, labels);
    }

    #[test]
    fn swaps_boosters_onto_the_harder_event() {
        let boosters = vec![Booster::new("strong", 2.0, 1), Booster::new("weak", 1.0, 1)];
        let d = table(&[('a', 10.0), ('b', 100.0)]);
        let a = solve_allocation(&['a', 'b'], &d, &boosters, AllocationPolicy::UseAll).unwrap();
        assert_eq!(a.events[0].boosters, vec![1]);
        assert_eq!(a.events[1].boosters, vec![0]);
        assert_relative_eq!(a.total_time, 60.0);
        assert_eq!(a.usage, vec![1, 1]);
        assert!(!a.keep_rule_satisfied);
    }

    /// Exhaustive search over every subset per event, restricted to usage
    /// vectors of the kept-one-short shape.
    fn brute_force_shape(diffs: &[f64], boosters: &[Booster]) -> f64 {
        let m = boosters.len();
        let subsets = subset_powers(boosters);
        let mut best = f64::INFINITY;
        let total = subsets.len().pow(diffs.len() as u32);
        for mut code in 0..total {
            let mut usage = vec![0u32; m];
            let mut time = 0.0;
            for &d in diffs {
                let (mask, power) = subsets[code % subsets.len()];
                code /= subsets.len();
                for (b, u) in usage.iter_mut().enumerate() {
                    if mask & (1 << b) != 0 {
                        *u += 1;
                    }
                }
                time += d / power;
            }
            if kept_one_short(&usage, boosters).is_some() && time < best {
                best = time;
            }
        }
        best
    }

    #[test]
    fn matches_exhaustive_exact_shape_search() {
        let boosters = vec![
            Booster::new("a", 1.5, 2),
            Booster::new("b", 1.2, 2),
            Booster::new("c", 1.0, 2),
        ];
        let d = table(&[('x', 30.0), ('y', 50.0), ('z', 70.0)]);
        let a = solve_allocation(&['x', 'y', 'z'], &d, &boosters, AllocationPolicy::KeepOneIntact)
            .unwrap();
        let expected = brute_force_shape(&[30.0, 50.0, 70.0], &boosters);
        assert_relative_eq!(a.total_time, expected, max_relative = 1e-12);
        assert!(a.keep_rule_satisfied);
        assert_eq!(a.usage.iter().sum::<u32>(), 5);
    }

    #[test]
    fn matches_exhaustive_search_on_uneven_caps() {
        let boosters = vec![
            Booster::new("a", 1.6, 1),
            Booster::new("b", 1.1, 3),
            Booster::new("c", 0.7, 2),
        ];
        let diffs = [40.0, 90.0, 20.0, 65.0];
        let labels = ['p', 'q', 'r', 's'];
        let d: BTreeMap<char, f64> = labels.iter().copied().zip(diffs).collect();
        let a = solve_allocation(&labels, &d, &boosters, AllocationPolicy::KeepOneIntact).unwrap();
        let expected = brute_force_shape(&diffs, &boosters);
        assert_relative_eq!(a.total_time, expected, max_relative = 1e-12);
        assert!(a.keep_rule_satisfied);
        for (u, b) in a.usage.iter().zip(&boosters) {
            assert!(*u <= b.uses);
        }
    }

    #[test]
    fn use_all_saturates_caps() {
        let boosters = pool(&[1.5, 1.2, 1.0], 2);
        let d = table(&[('x', 30.0), ('y', 50.0), ('z', 70.0)]);
        let a = solve_allocation(&['x', 'y', 'z'], &d, &boosters, AllocationPolicy::UseAll).unwrap();
        assert_eq!(a.usage, vec![2, 2, 2]);
        assert!(!a.keep_rule_satisfied);
        assert_eq!(a.kept_intact, None);

        let kept = solve_allocation(&['x', 'y', 'z'], &d, &boosters, AllocationPolicy::KeepOneIntact)
            .unwrap();
        assert!(a.total_time < kept.total_time);
    }

    #[test]
    fn infeasible_when_events_outnumber_uses() {
        let boosters = vec![Booster::new("only", 1.0, 2)];
        let d = table(&[('a', 1.0), ('b', 1.0), ('c', 1.0)]);
        let labels = ['a', 'b', 'c'];
        assert_eq!(
            solve_allocation(&labels, &d, &boosters, AllocationPolicy::KeepOneIntact),
            Err(AllocError::Infeasible {
                tasks: 3,
                capacity: 1
            })
        );
        assert_eq!(
            solve_allocation(&labels, &d, &boosters, AllocationPolicy::UseAll),
            Err(AllocError::Infeasible {
                tasks: 3,
                capacity: 2
            })
        );

        let spent = vec![Booster::new("empty", 1.0, 0)];
        assert!(matches!(
            solve_allocation(&['a'], &d, &spent, AllocationPolicy::KeepOneIntact),
            Err(AllocError::Infeasible { tasks: 1, .. })
        ));
    }

    #[test]
    fn empty_route_costs_nothing() {
        let boosters = pool(&[1.0, 2.0], 3);
        let a = solve_allocation(&[], &BTreeMap::new(), &boosters, AllocationPolicy::default())
            .unwrap();
        assert_eq!(a.total_time, 0.0);
        assert!(a.events.is_empty());
        assert_eq!(a.usage, vec![0, 0]);
        assert!(!a.keep_rule_satisfied);
    }

    #[test]
    fn rejects_invalid_input() {
        let d = table(&[('a', 10.0), ('n', -1.0)]);
        let policy = AllocationPolicy::default();
        assert_eq!(
            solve_allocation(&['a'], &d, &[], policy),
            Err(AllocError::NoBoosters)
        );
        assert!(matches!(
            solve_allocation(&['a'], &d, &pool(&[1.0; 9], 1), policy),
            Err(AllocError::TooManyBoosters { count: 9, max: 8 })
        ));
        assert!(matches!(
            solve_allocation(&['a'], &d, &pool(&[1.0, 0.0], 1), policy),
            Err(AllocError::InvalidPower { .. })
        ));
        assert!(matches!(
            solve_allocation(&['a'], &d, &pool(&[f64::NAN], 1), policy),
            Err(AllocError::InvalidPower { .. })
        ));
        assert_eq!(
            solve_allocation(&['q'], &d, &pool(&[1.0], 2), policy),
            Err(AllocError::MissingDifficulty('q'))
        );
        assert_eq!(
            solve_allocation(&['n'], &d, &pool(&[1.0], 2), policy),
            Err(AllocError::InvalidDifficulty {
                label: 'n',
                value: -1.0
            })
        );
        assert_eq!(
            solve_allocation(&['a'], &d, &pool(&[1.0; 3], 100), AllocationPolicy::UseAll),
            Err(AllocError::StateSpaceTooLarge {
                states: 101 * 101 * 101,
                max: MAX_USAGE_STATES
            })
        );
    }

    #[test]
    fn overflowing_caps_are_reported() {
        let d = table(&[('a', 10.0)]);
        let huge = pool(&[1.0; 8], u32::MAX);
        assert_eq!(
            solve_allocation(&['a'], &d, &huge, AllocationPolicy::UseAll),
            Err(AllocError::StateSpaceOverflow {
                caps: vec![u32::MAX; 8]
            })
        );
    }

    #[test]
    fn usage_space_round_trip() {
        let space = UsageSpace::new(&[2, 0, 3]).unwrap();
        assert_eq!(space.len, 12);
        let s = space.step(0, 0b101).unwrap();
        assert_eq!(space.usage(s), vec![1, 0, 1]);
        assert_eq!(space.step(s, 0b010), None);
        assert_eq!(space.mask_between(0, s), 0b101);
        let s2 = space.step(s, 0b001).unwrap();
        assert_eq!(space.usage(s2), vec![1, 0, 2]);
    }
}
