//! The hard-constraint builder. Each `cN_*` function corresponds to one lettered
//! constraint and returns the list of boolean terms it contributes; the caller
//! (`solver.rs`) asserts their conjunction.

use z3::ast::Bool;

use crate::builder::Smt;
use crate::catalogue::Catalogue;
use crate::config::ScheduleConfig;
use crate::lattice::DivisionLattice;
use crate::team::{Division, TeamId};

/// C1 — grid/match_week coupling: `grid[h,a,w] ⇔ match_week[h,a] = w`.
fn c1_grid_match_week_coupling<'ctx>(
    smt: &Smt<'ctx>,
    lattice: &DivisionLattice<'ctx>,
) -> Vec<Bool<'ctx>> {
    let mut terms = Vec::new();
    for h in lattice.team_ids() {
        for a in lattice.team_ids() {
            for w in lattice.week_range() {
                let week_int = smt.int_const(i64::from(w));
                let rhs = smt.int_eq(lattice.match_week(h, a), &week_int);
                terms.push(smt.iff(lattice.grid(h, a, w), &rhs));
            }
        }
    }
    terms
}

/// C2 — match_week range: `−1 ≤ match_week[h,a] ≤ W−1`.
fn c2_match_week_range<'ctx>(
    smt: &Smt<'ctx>,
    lattice: &DivisionLattice<'ctx>,
) -> Vec<Bool<'ctx>> {
    let mut terms = Vec::new();
    let lower = smt.int_const(-1);
    let upper = smt.int_const(i64::from(lattice.weeks()) - 1);
    for h in lattice.team_ids() {
        for a in lattice.team_ids() {
            let mw = lattice.match_week(h, a);
            terms.push(smt.le(&lower, mw));
            terms.push(smt.le(mw, &upper));
        }
    }
    terms
}

/// C3 — single orientation: each pair hosted by exactly one side; no self-match, no
/// both-directions.
fn c3_single_orientation<'ctx>(
    smt: &Smt<'ctx>,
    lattice: &DivisionLattice<'ctx>,
) -> Vec<Bool<'ctx>> {
    let mut terms = Vec::new();
    let neg_one = smt.int_const(-1);

    for h in lattice.team_ids() {
        for a in lattice.team_ids() {
            let h_away = smt.int_eq(lattice.match_week(h, a), &neg_one);
            let a_away = smt.int_eq(lattice.match_week(a, h), &neg_one);
            // "no both-directions": at least one side is -1, for every pair including h == a.
            terms.push(smt.or(&[h_away.clone(), a_away.clone()]));

            if h.0 != a.0 {
                // "exactly one side is -1": XOR, i.e. not(iff(..)).
                let both_or_neither = smt.iff(&h_away, &a_away);
                terms.push(smt.not(&both_or_neither));
            }
        }
    }
    terms
}

/// C4 — home_opp_idx coupling: `grid[h,a,w] ⇔ home_opp_idx[h,w] = ia`, with range checks.
fn c4_home_opp_idx_coupling<'ctx>(
    smt: &Smt<'ctx>,
    lattice: &DivisionLattice<'ctx>,
) -> Vec<Bool<'ctx>> {
    let mut terms = Vec::new();
    let lower = smt.int_const(-1);
    let upper = smt.int_const(lattice.team_count() as i64 - 1);

    for h in lattice.team_ids() {
        for w in lattice.week_range() {
            let idx_var = lattice.home_opp_idx(h, w);
            terms.push(smt.le(&lower, idx_var));
            terms.push(smt.le(idx_var, &upper));
            for a in lattice.team_ids() {
                let ia = smt.int_const(i64::from(a.0));
                let rhs = smt.int_eq(idx_var, &ia);
                terms.push(smt.iff(lattice.grid(h, a, w), &rhs));
            }
        }
    }
    terms
}

/// C5 — away_opp_idx coupling, symmetric to C4.
fn c5_away_opp_idx_coupling<'ctx>(
    smt: &Smt<'ctx>,
    lattice: &DivisionLattice<'ctx>,
) -> Vec<Bool<'ctx>> {
    let mut terms = Vec::new();
    let lower = smt.int_const(-1);
    let upper = smt.int_const(lattice.team_count() as i64 - 1);

    for a in lattice.team_ids() {
        for w in lattice.week_range() {
            let idx_var = lattice.away_opp_idx(a, w);
            terms.push(smt.le(&lower, idx_var));
            terms.push(smt.le(idx_var, &upper));
            for h in lattice.team_ids() {
                let ih = smt.int_const(i64::from(h.0));
                let rhs = smt.int_eq(idx_var, &ih);
                terms.push(smt.iff(lattice.grid(h, a, w), &rhs));
            }
        }
    }
    terms
}

/// C6 — each pair played once, redundant with C1–C3 but retained for solver performance.
fn c6_each_pair_played_once<'ctx>(
    smt: &Smt<'ctx>,
    lattice: &DivisionLattice<'ctx>,
) -> Vec<Bool<'ctx>> {
    let mut pairing_happens = Vec::new();
    let mut plays_self = Vec::new();
    let mut plays_both = Vec::new();

    for t1 in lattice.team_ids() {
        for t2 in lattice.team_ids() {
            if t1.0 == t2.0 {
                let weeks_t1t1: Vec<Bool<'ctx>> = lattice
                    .week_range()
                    .map(|w| lattice.grid(t1, t2, w).clone())
                    .collect();
                plays_self.push(smt.or(&weeks_t1t1));
                continue;
            }

            let plays_home: Vec<Bool<'ctx>> = lattice
                .week_range()
                .map(|w| lattice.grid(t1, t2, w).clone())
                .collect();
            let plays_away: Vec<Bool<'ctx>> = lattice
                .week_range()
                .map(|w| lattice.grid(t2, t1, w).clone())
                .collect();

            let mut either = plays_home.clone();
            either.extend(plays_away.clone());
            pairing_happens.push(smt.or(&either));

            let home_ever = smt.or(&plays_home);
            let away_ever = smt.or(&plays_away);
            plays_both.push(smt.and(&[home_ever, away_ever]));
        }
    }

    let mut terms = pairing_happens;
    terms.push(smt.not(&smt.or(&plays_self)));
    terms.push(smt.not(&smt.or(&plays_both)));
    terms
}

/// C7 — at most one fixture per team per week.
fn c7_one_fixture_per_team_per_week<'ctx>(
    smt: &Smt<'ctx>,
    lattice: &DivisionLattice<'ctx>,
) -> Vec<Bool<'ctx>> {
    let mut terms = Vec::new();
    for w in lattice.week_range() {
        for home in lattice.team_ids() {
            for away in lattice.team_ids() {
                let home_other_home = smt.or(&lattice
                    .team_ids()
                    .filter(|opp| opp.0 != away.0)
                    .map(|opp| lattice.grid(home, opp, w).clone())
                    .collect::<Vec<_>>());
                let home_any_away = smt.or(&lattice
                    .team_ids()
                    .map(|opp| lattice.grid(opp, home, w).clone())
                    .collect::<Vec<_>>());
                let away_any_home = smt.or(&lattice
                    .team_ids()
                    .map(|opp| lattice.grid(away, opp, w).clone())
                    .collect::<Vec<_>>());
                let away_other_away = smt.or(&lattice
                    .team_ids()
                    .filter(|opp| opp.0 != home.0)
                    .map(|opp| lattice.grid(opp, away, w).clone())
                    .collect::<Vec<_>>());

                let this_match = lattice.grid(home, away, w);
                let any_other_match_this_week = smt.or(&[
                    home_other_home,
                    home_any_away,
                    away_any_home,
                    away_other_away,
                ]);
                terms.push(smt.implies(this_match, &smt.not(&any_other_match_this_week)));
            }
        }
    }
    terms
}

/// Pure date arithmetic behind C8, kept apart from AST construction so the driver can precompute
/// it for every division in parallel before touching the shared z3 context: `[w][home][next]`
/// is true when `next`'s week-`w+1` home date leaves `home`'s week-`w` opponent too little rest.
pub fn precompute_rest_violations(
    division: &Division,
    catalogue: &Catalogue,
    config: &ScheduleConfig,
) -> Vec<Vec<Vec<bool>>> {
    let team_count = division.len();
    let rest_period = chrono::Duration::days(config.rest_days());
    let home_date = |team: TeamId, week: u32| {
        catalogue
            .home_slot(division, team)
            .home_date(week, config.spread())
    };

    let weeks = if config.weeks() == 0 { 0 } else { config.weeks() - 1 };
    (0..weeks)
        .map(|w| {
            (0..team_count)
                .map(|home_idx| {
                    let this_match_date = home_date(TeamId(home_idx as u16), w);
                    (0..team_count)
                        .map(|next_idx| {
                            let next_match_date = home_date(TeamId(next_idx as u16), w + 1);
                            next_match_date < this_match_date + rest_period
                        })
                        .collect()
                })
                .collect()
        })
        .collect()
}

/// C8 — enough rest between successive matches, driven by a precomputed rest-violation table.
/// Rest gaps are measured in real, `spread`-adjusted calendar days rather than raw week indices,
/// so the same `spread` multiplier used for output dates also governs rest enforcement.
fn c8_enough_rest<'ctx>(
    smt: &Smt<'ctx>,
    lattice: &DivisionLattice<'ctx>,
    rest_violations: &[Vec<Vec<bool>>],
) -> Vec<Bool<'ctx>> {
    let mut terms = Vec::new();

    for (w, too_soon) in rest_violations.iter().enumerate() {
        let w = w as u32;
        for home in lattice.team_ids() {
            // `this_match_date` is fixed to `home`'s week-w date for the whole `away` loop below:
            // both too-soon checks key off `home`, never `away`.
            for away in lattice.team_ids() {
                let mut home_plays_away_too_soon = Vec::new();
                let mut away_plays_away_too_soon = Vec::new();

                for next_team in lattice.team_ids() {
                    if too_soon[home.0 as usize][next_team.0 as usize] {
                        home_plays_away_too_soon.push(lattice.grid(next_team, home, w + 1).clone());
                        away_plays_away_too_soon.push(lattice.grid(next_team, away, w + 1).clone());
                    }
                }

                let away_plays_at_home_too_soon = if too_soon[home.0 as usize][away.0 as usize] {
                    smt.or(&lattice
                        .team_ids()
                        .map(|next_team| lattice.grid(away, next_team, w + 1).clone())
                        .collect::<Vec<_>>())
                } else {
                    smt.bool_const(false)
                };

                let this_match = lattice.grid(home, away, w);
                let mut all_too_soon = home_plays_away_too_soon;
                all_too_soon.extend(away_plays_away_too_soon);
                all_too_soon.push(away_plays_at_home_too_soon);
                let matches_too_soon_after = smt.or(&all_too_soon);

                terms.push(smt.implies(this_match, &smt.not(&matches_too_soon_after)));
            }
        }
    }
    terms
}

/// C9 — same-club pairs play in one of the earliest available weeks, advancing a per-team
/// "earliest allowable week" counter pair by pair.
fn c9_same_club_plays_early<'ctx>(
    smt: &Smt<'ctx>,
    lattice: &DivisionLattice<'ctx>,
    division: &Division,
) -> Vec<Bool<'ctx>> {
    let mut terms = Vec::new();
    let mut earliest_allowable_week = vec![0u32; division.len()];

    for (t1, t2) in division.same_club_pairs() {
        let week = earliest_allowable_week[t1.0 as usize].max(earliest_allowable_week[t2.0 as usize]);
        terms.push(smt.or(&[
            lattice.grid(t1, t2, week).clone(),
            lattice.grid(t2, t1, week).clone(),
        ]));
        earliest_allowable_week[t1.0 as usize] = week + 1;
        earliest_allowable_week[t2.0 as usize] = week + 1;
    }
    terms
}

/// All per-division hard constraints (C1–C9). `rest_violations` is produced ahead of time by
/// [`precompute_rest_violations`] so it can be computed for every division in parallel.
pub fn build_division_constraints<'ctx>(
    smt: &Smt<'ctx>,
    lattice: &DivisionLattice<'ctx>,
    division: &Division,
    rest_violations: &[Vec<Vec<bool>>],
) -> Vec<Bool<'ctx>> {
    let mut terms = Vec::new();
    terms.extend(c1_grid_match_week_coupling(smt, lattice));
    terms.extend(c2_match_week_range(smt, lattice));
    terms.extend(c3_single_orientation(smt, lattice));
    terms.extend(c4_home_opp_idx_coupling(smt, lattice));
    terms.extend(c5_away_opp_idx_coupling(smt, lattice));
    terms.extend(c6_each_pair_played_once(smt, lattice));
    terms.extend(c7_one_fixture_per_team_per_week(smt, lattice));
    terms.extend(c8_enough_rest(smt, lattice, rest_violations));
    terms.extend(c9_same_club_plays_early(smt, lattice, division));
    terms
}

/// C10 — a shared slot's two teams never both host in the same week. Inter-division, so it
/// takes every division's lattice and the catalogue's shared-slot list.
pub fn build_shared_slot_constraints<'ctx>(
    smt: &Smt<'ctx>,
    divisions: &[(&Division, &DivisionLattice<'ctx>)],
    catalogue: &Catalogue,
) -> Vec<Bool<'ctx>> {
    let mut terms = Vec::new();

    let lattice_for = |team_name: &str| -> Option<(&Division, &DivisionLattice<'ctx>, TeamId)> {
        divisions.iter().find_map(|(division, lattice)| {
            division
                .team_id(team_name)
                .map(|id| (*division, *lattice, id))
        })
    };

    for (_, team1_name, team2_name) in catalogue.shared_slots() {
        let Some((_, lattice1, team1)) = lattice_for(team1_name) else {
            continue;
        };
        let Some((_, lattice2, team2)) = lattice_for(team2_name) else {
            continue;
        };

        let weeks = lattice1.weeks().min(lattice2.weeks());
        for w in 0..weeks {
            let team1_at_home = smt.or(&lattice1
                .team_ids()
                .map(|opp| lattice1.grid(team1, opp, w).clone())
                .collect::<Vec<_>>());
            let team2_at_home = smt.or(&lattice2
                .team_ids()
                .map(|opp| lattice2.grid(team2, opp, w).clone())
                .collect::<Vec<_>>());

            terms.push(smt.not(&smt.and(&[team1_at_home, team2_at_home])));
        }
    }
    terms
}
