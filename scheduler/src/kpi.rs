//! The soft-objective (KPI) builder. Each KPI is an `Int` expression over one division's
//! lattice; the optimizer driver (`solver.rs`) minimizes them in priority order.

use z3::ast::Int;

use crate::builder::Smt;
use crate::lattice::DivisionLattice;
use crate::records::OldFixture;
use crate::team::Division;

/// The three KPI expressions for one division, in the priority order the driver tightens them.
pub struct DivisionKpis<'ctx> {
    pub home_away_imbalance: Int<'ctx>,
    pub away_twice_at_same_club: Int<'ctx>,
    pub repeat_of_old_fixture: Int<'ctx>,
}

impl<'ctx> DivisionKpis<'ctx> {
    /// Priority-ordered `(name, expression)` pairs, matching the driver's tightening order.
    pub fn in_priority_order(&self) -> [(&'static str, &Int<'ctx>); 3] {
        [
            ("home_away_imbalance", &self.home_away_imbalance),
            ("away_twice_at_same_club", &self.away_twice_at_same_club),
            ("repeat_of_old_fixture", &self.repeat_of_old_fixture),
        ]
    }
}

/// K1 — home/away imbalance: `Σ_team |home_games(team) − away_games(team)|`, with an imbalance
/// of exactly one forgiven (an odd number of games in a round robin always leaves one team
/// 1-out, and that's not improvable).
fn k1_home_away_imbalance<'ctx>(smt: &Smt<'ctx>, lattice: &DivisionLattice<'ctx>) -> Int<'ctx> {
    let zero = smt.int_const(0);
    let mut per_team = Vec::new();

    for team in lattice.team_ids() {
        let home_games = smt.sum(&lattice
            .week_range()
            .map(|w| smt.indicator(&smt.le(&zero, lattice.home_opp_idx(team, w))))
            .collect::<Vec<_>>());
        let away_games = smt.sum(&lattice
            .week_range()
            .map(|w| smt.indicator(&smt.le(&zero, lattice.away_opp_idx(team, w))))
            .collect::<Vec<_>>());

        let difference = smt.abs(&smt.sub(&home_games, &away_games));
        let one = smt.int_const(1);
        let forgiven = smt.ite_int(&smt.int_eq(&difference, &one), &zero, &difference);
        per_team.push(forgiven);
    }

    smt.sum(&per_team)
}

/// K2 — same-club teams sent away to the same opponent: for every same-club pair and every
/// potential opponent, 1 if both teams of the pair host that opponent at some point in the
/// season.
fn k2_away_twice_at_same_club<'ctx>(
    smt: &Smt<'ctx>,
    lattice: &DivisionLattice<'ctx>,
    division: &Division,
) -> Int<'ctx> {
    let mut contributions = Vec::new();

    for (team1, team2) in division.same_club_pairs() {
        for opponent in lattice.team_ids() {
            let team1_hosts_opponent = smt.or(&lattice
                .week_range()
                .map(|w| lattice.grid(team1, opponent, w).clone())
                .collect::<Vec<_>>());
            let team2_hosts_opponent = smt.or(&lattice
                .week_range()
                .map(|w| lattice.grid(team2, opponent, w).clone())
                .collect::<Vec<_>>());

            let both = smt.and(&[team1_hosts_opponent, team2_hosts_opponent]);
            contributions.push(smt.indicator(&both));
        }
    }

    smt.sum(&contributions)
}

/// K3 — fixtures repeated verbatim (same home, same away) from a previous season.
fn k3_repeat_of_old_fixture<'ctx>(
    smt: &Smt<'ctx>,
    lattice: &DivisionLattice<'ctx>,
    division: &Division,
    old_fixtures: &[OldFixture],
) -> Int<'ctx> {
    let mut contributions = Vec::new();

    for home in lattice.team_ids() {
        for away in lattice.team_ids() {
            let home_name = division.team(home).name();
            let away_name = division.team(away).name();
            let was_played_before = old_fixtures
                .iter()
                .any(|f| f.home == home_name && f.away == away_name);
            if !was_played_before {
                continue;
            }

            let happens = smt.or(&lattice
                .week_range()
                .map(|w| lattice.grid(home, away, w).clone())
                .collect::<Vec<_>>());
            contributions.push(smt.indicator(&happens));
        }
    }

    smt.sum(&contributions)
}

/// Builds all three KPI expressions for one division, plus the equation binding them to fresh
/// named integer constants.
pub fn build_division_kpis<'ctx>(
    smt: &Smt<'ctx>,
    lattice: &DivisionLattice<'ctx>,
    division: &Division,
    old_fixtures: &[OldFixture],
) -> (DivisionKpis<'ctx>, Vec<z3::ast::Bool<'ctx>>) {
    let home_away_imbalance_expr = k1_home_away_imbalance(smt, lattice);
    let away_twice_at_same_club_expr = k2_away_twice_at_same_club(smt, lattice, division);
    let repeat_of_old_fixture_expr = k3_repeat_of_old_fixture(smt, lattice, division, old_fixtures);

    let division_name = lattice.division_name();
    let home_away_imbalance = smt.fresh_int(&format!("{division_name}/kpi/home_away_imbalance"));
    let away_twice_at_same_club =
        smt.fresh_int(&format!("{division_name}/kpi/away_twice_at_same_club"));
    let repeat_of_old_fixture =
        smt.fresh_int(&format!("{division_name}/kpi/repeat_of_old_fixture"));

    let bindings = vec![
        smt.int_eq(&home_away_imbalance, &home_away_imbalance_expr),
        smt.int_eq(&away_twice_at_same_club, &away_twice_at_same_club_expr),
        smt.int_eq(&repeat_of_old_fixture, &repeat_of_old_fixture_expr),
    ];

    (
        DivisionKpis {
            home_away_imbalance,
            away_twice_at_same_club,
            repeat_of_old_fixture,
        },
        bindings,
    )
}
