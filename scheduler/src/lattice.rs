use z3::ast::{Bool, Int};

use crate::builder::Smt;
use crate::team::{Division, TeamId};

/// The decision-variable lattice for one division: the `grid`, `match_week`,
/// `home_opp_idx` and `away_opp_idx` views, plus the redundant-but-useful coupling between them
/// (asserted in `constraints.rs`). Indexed flat rather than through nested maps, matching an
/// O(T²·W) boolean / O(T·W + T²) integer memory budget per division.
pub struct DivisionLattice<'ctx> {
    division: String,
    team_count: usize,
    weeks: u32,
    /// flat index: h * team_count * weeks + a * weeks + w
    grid: Vec<Bool<'ctx>>,
    /// flat index: h * team_count + a
    match_week: Vec<Int<'ctx>>,
    /// flat index: h * weeks + w
    home_opp_idx: Vec<Int<'ctx>>,
    /// flat index: a * weeks + w
    away_opp_idx: Vec<Int<'ctx>>,
}

impl<'ctx> DivisionLattice<'ctx> {
    pub fn build(smt: &Smt<'ctx>, division: &Division, weeks: u32) -> Self {
        let team_count = division.len();
        let weeks_usize = weeks as usize;
        let division_name = division.name();

        let mut grid = Vec::with_capacity(team_count * team_count * weeks_usize);
        for h in 0..team_count {
            for a in 0..team_count {
                for w in 0..weeks_usize {
                    grid.push(smt.fresh_bool(&format!(
                        "{division_name}/grid[{h},{a},{w}]"
                    )));
                }
            }
        }

        let mut match_week = Vec::with_capacity(team_count * team_count);
        for h in 0..team_count {
            for a in 0..team_count {
                match_week.push(smt.fresh_int(&format!("{division_name}/match_week[{h},{a}]")));
            }
        }

        let mut home_opp_idx = Vec::with_capacity(team_count * weeks_usize);
        for h in 0..team_count {
            for w in 0..weeks_usize {
                home_opp_idx.push(smt.fresh_int(&format!(
                    "{division_name}/home_opp_idx[{h},{w}]"
                )));
            }
        }

        let mut away_opp_idx = Vec::with_capacity(team_count * weeks_usize);
        for a in 0..team_count {
            for w in 0..weeks_usize {
                away_opp_idx.push(smt.fresh_int(&format!(
                    "{division_name}/away_opp_idx[{a},{w}]"
                )));
            }
        }

        Self {
            division: division_name.to_string(),
            team_count,
            weeks,
            grid,
            match_week,
            home_opp_idx,
            away_opp_idx,
        }
    }

    pub fn division_name(&self) -> &str {
        &self.division
    }

    pub const fn team_count(&self) -> usize {
        self.team_count
    }

    pub const fn weeks(&self) -> u32 {
        self.weeks
    }

    pub fn grid(&self, h: TeamId, a: TeamId, w: u32) -> &Bool<'ctx> {
        let (h, a, w) = (h.0 as usize, a.0 as usize, w as usize);
        &self.grid[h * self.team_count * self.weeks as usize + a * self.weeks as usize + w]
    }

    pub fn match_week(&self, h: TeamId, a: TeamId) -> &Int<'ctx> {
        let (h, a) = (h.0 as usize, a.0 as usize);
        &self.match_week[h * self.team_count + a]
    }

    pub fn home_opp_idx(&self, h: TeamId, w: u32) -> &Int<'ctx> {
        let (h, w) = (h.0 as usize, w as usize);
        &self.home_opp_idx[h * self.weeks as usize + w]
    }

    pub fn away_opp_idx(&self, a: TeamId, w: u32) -> &Int<'ctx> {
        let (a, w) = (a.0 as usize, w as usize);
        &self.away_opp_idx[a * self.weeks as usize + w]
    }

    pub fn team_ids(&self) -> impl Iterator<Item = TeamId> {
        (0..self.team_count).map(|i| TeamId(i as u16))
    }

    pub fn week_range(&self) -> impl Iterator<Item = u32> {
        0..self.weeks
    }
}
