//! Plain-text rendering of planner results.

use std::fmt;

use questgrid_paths::{DistanceMatrix, UNREACHABLE};
use questgrid_plan::{Booster, Expedition};

/// Human-readable summary of an [`Expedition`].
pub struct PlanReport<'a> {
    pub expedition: &'a Expedition,
    pub boosters: &'a [Booster],
}

impl fmt::Display for PlanReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exp = self.expedition;
        let order: Vec<String> = exp.route.order.iter().map(char::to_string).collect();
        writeln!(f, "route:        {}", order.join(" -> "))?;
        writeln!(f, "travel cost:  {}", exp.travel_cost)?;
        writeln!(f, "event time:   {:.4}", exp.event_time)?;
        writeln!(f, "total:        {:.4}", exp.total_cost)?;

        writeln!(f, "boosters:")?;
        for (b, (booster, used)) in self.boosters.iter().zip(&exp.allocation.usage).enumerate() {
            let mark = if exp.allocation.kept_intact == Some(b) {
                "  (kept one short)"
            } else {
                ""
            };
            writeln!(f, "  {:<10} {used}/{}{mark}", booster.name, booster.uses)?;
        }
        writeln!(
            f,
            "keep rule:    {}",
            if exp.allocation.keep_rule_satisfied {
                "satisfied"
            } else {
                "not satisfied"
            }
        )?;

        if !exp.allocation.events.is_empty() {
            writeln!(f, "events:")?;
        }
        for ev in &exp.allocation.events {
            let names: Vec<&str> = ev
                .boosters
                .iter()
                .filter_map(|&b| self.boosters.get(b))
                .map(|b| b.name.as_str())
                .collect();
            writeln!(
                f,
                "  {}  difficulty {:>6.1}  power {:.2}  time {:>8.4}  [{}]",
                ev.label,
                ev.difficulty,
                ev.power,
                ev.time,
                names.join(", ")
            )?;
        }
        Ok(())
    }
}

/// The distance matrix as an aligned table; `-` marks unreachable pairs.
pub struct MatrixTable<'a>(pub &'a DistanceMatrix);

impl fmt::Display for MatrixTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        let width = (0..m.len())
            .flat_map(|i| m.row(i).iter())
            .filter(|&&d| d != UNREACHABLE)
            .map(|d| d.to_string().len())
            .max()
            .unwrap_or(1);

        write!(f, " ")?;
        for l in m.labels() {
            write!(f, " {l:>width$}")?;
        }
        writeln!(f)?;
        for (i, l) in m.labels().iter().enumerate() {
            write!(f, "{l}")?;
            for &d in m.row(i) {
                if d == UNREACHABLE {
                    write!(f, " {:>width$}", "-")?;
                } else {
                    write!(f, " {d:>width$}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
