//! The optimizer driver: builds one shared [`z3::Solver`], asserts every division's hard
//! constraints plus the cross-division shared-slot constraint, confirms the hard problem is
//! satisfiable, then lexicographically tightens the three KPIs via push/pop before
//! extracting a concrete schedule from the model.

use std::collections::HashMap;

use rayon::prelude::*;
use z3::{Config, Context, SatResult, Solver};

use crate::builder::Smt;
use crate::catalogue::Catalogue;
use crate::config::ScheduleConfig;
use crate::constraints;
use crate::error::{Result, SchedulerError};
use crate::kpi::{self, DivisionKpis};
use crate::lattice::DivisionLattice;
use crate::schedule::{
    DivisionKpiResult, DivisionSchedule, ScheduledMatch, Schedule, TighteningOutcome,
};
use crate::team::Division;

/// Hard cutoff on how many times the driver will back off a KPI bound before giving up on that
/// division for that KPI.
const TIGHTENING_ATTEMPTS: u32 = 50;

const KPI_PRIORITY: [&str; 3] = [
    "home_away_imbalance",
    "away_twice_at_same_club",
    "repeat_of_old_fixture",
];

/// Builds a complete, KPI-tightened schedule for every division in `catalogue`.
pub fn schedule(catalogue: &Catalogue, config: &ScheduleConfig) -> Result<Schedule> {
    log::info!(
        "scheduling {} division(s) over {} week(s)",
        catalogue.divisions().len(),
        config.weeks()
    );

    // Pure date arithmetic, independent per division and independent of the z3 context — the
    // only stage of the pipeline actually safe to fan out with rayon.
    let rest_violations: HashMap<&str, Vec<Vec<Vec<bool>>>> = catalogue
        .divisions()
        .par_iter()
        .map(|division| {
            (
                division.name(),
                constraints::precompute_rest_violations(division, catalogue, config),
            )
        })
        .collect();

    let z3_config = Config::new();
    let ctx = Context::new(&z3_config);
    let smt = Smt::new(&ctx);
    let solver = Solver::new(&ctx);

    let mut lattices: Vec<(&Division, DivisionLattice<'_>)> = Vec::new();
    let mut kpis_by_division: Vec<(String, DivisionKpis<'_>)> = Vec::new();
    let mut first_unsat_division: Option<String> = None;

    for division in catalogue.divisions() {
        let lattice = DivisionLattice::build(&smt, division, config.weeks());
        let division_rest_violations = rest_violations
            .get(division.name())
            .expect("precomputed for every division above");

        for term in
            constraints::build_division_constraints(&smt, &lattice, division, division_rest_violations)
        {
            solver.assert(&term);
        }

        let (division_kpis, bindings) =
            kpi::build_division_kpis(&smt, &lattice, division, catalogue.old_fixtures());
        for binding in &bindings {
            solver.assert(binding);
        }

        let provisional = solver.check();
        log::debug!("provisional check for {}: {:?}", division.name(), provisional);
        if provisional != SatResult::Sat && first_unsat_division.is_none() {
            first_unsat_division = Some(division.name().to_string());
        }

        lattices.push((division, lattice));
        kpis_by_division.push((division.name().to_string(), division_kpis));
    }

    let lattice_refs: Vec<(&Division, &DivisionLattice<'_>)> =
        lattices.iter().map(|(d, l)| (*d, l)).collect();
    for term in constraints::build_shared_slot_constraints(&smt, &lattice_refs, catalogue) {
        solver.assert(&term);
    }

    log::info!("checking shared-slot constraints: {:?}", solver.check());
    if solver.check() != SatResult::Sat {
        // A division whose own constraints were already unsat before the shared-slot
        // constraints were even asserted is reliably to blame: every division's lattice
        // uses fully disjoint solver variables until this point, so a conjunction of
        // independent constraint sets is unsat iff at least one of them is.
        let division = first_unsat_division
            .unwrap_or_else(|| "<all divisions, after shared-slot constraints>".to_string());
        return Err(SchedulerError::ModelUnsat { division });
    }

    let tightening_outcomes = tighten_kpis(&smt, &solver, &kpis_by_division);

    let model = solver
        .get_model()
        .expect("solver.check() returned Sat immediately above");

    let mut divisions_out = Vec::new();
    for ((division, lattice), (_, division_kpis)) in lattices.iter().zip(kpis_by_division.iter()) {
        divisions_out.push(extract_division(
            *division,
            lattice,
            division_kpis,
            &model,
            catalogue,
            config,
        )?);
    }

    Ok(Schedule {
        divisions: divisions_out,
        tightening_outcomes,
    })
}

/// The expression for one named KPI, out of the priority-ordered triple.
fn kpi_expr<'a, 'ctx>(kpis: &'a DivisionKpis<'ctx>, name: &str) -> &'a z3::ast::Int<'ctx> {
    kpis.in_priority_order()
        .into_iter()
        .find(|(kpi_name, _)| *kpi_name == name)
        .expect("name drawn from KPI_PRIORITY")
        .1
}

/// Lexicographically tightens each KPI (in priority order), trying every division at once first
/// and falling back to per-division bisection-by-increment when that's unsat.
fn tighten_kpis<'ctx>(
    smt: &Smt<'ctx>,
    solver: &Solver<'ctx>,
    kpis_by_division: &[(String, DivisionKpis<'ctx>)],
) -> Vec<TighteningOutcome> {
    let mut outcomes = Vec::new();

    for kpi_name in KPI_PRIORITY {
        solver.push();
        let all_under_one: Vec<z3::ast::Bool<'ctx>> = kpis_by_division
            .iter()
            .map(|(_, kpis)| smt.lt(kpi_expr(kpis, kpi_name), &smt.int_const(1)))
            .collect();
        solver.assert(&smt.and(&all_under_one));

        if solver.check() == SatResult::Sat {
            log::info!("all divisions achieved {kpi_name} < 1");
            for (division_name, _) in kpis_by_division {
                outcomes.push(TighteningOutcome::Tightened {
                    kpi: kpi_name,
                    division: division_name.clone(),
                    limit: 1,
                });
            }
            continue;
        }
        log::debug!("{kpi_name} < 1 infeasible across all divisions at once, trying per-division");
        solver.pop(1);

        for (division_name, kpis) in kpis_by_division {
            let expr = kpi_expr(kpis, kpi_name);
            let mut kpi_limit = 1i64;
            let mut achieved = false;

            for _ in 0..TIGHTENING_ATTEMPTS {
                solver.push();
                solver.assert(&smt.lt(expr, &smt.int_const(kpi_limit)));
                if solver.check() == SatResult::Sat {
                    achieved = true;
                    break;
                }
                solver.pop(1);
                kpi_limit += 1;
            }

            if achieved {
                log::info!("{division_name}: {kpi_name} < {kpi_limit}");
                outcomes.push(TighteningOutcome::Tightened {
                    kpi: kpi_name,
                    division: division_name.clone(),
                    limit: kpi_limit,
                });
            } else {
                log::warn!(
                    "{division_name}: {kpi_name} tightening exhausted {TIGHTENING_ATTEMPTS} attempts, \
                     keeping whatever the solver last proved sat"
                );
                outcomes.push(TighteningOutcome::TimedOut {
                    kpi: kpi_name,
                    division: division_name.clone(),
                    limit: kpi_limit,
                });
            }
        }
    }

    outcomes
}

/// Reads the concrete fixture list and KPI values for one division out of the model, checking
/// the extraction invariant that every pair appears in the result exactly once.
fn extract_division(
    division: &Division,
    lattice: &DivisionLattice<'_>,
    kpis: &DivisionKpis<'_>,
    model: &z3::Model<'_>,
    catalogue: &Catalogue,
    config: &ScheduleConfig,
) -> Result<DivisionSchedule> {
    let mut matches = Vec::new();
    let mut pair_seen = HashMap::new();

    for home in lattice.team_ids() {
        for away in lattice.team_ids() {
            if home.0 == away.0 {
                continue;
            }
            for w in lattice.week_range() {
                let plays = model
                    .eval(lattice.grid(home, away, w), true)
                    .and_then(|b| b.as_bool())
                    .unwrap_or(false);
                if !plays {
                    continue;
                }

                let home_team = division.team(home);
                let away_team = division.team(away);
                let slot = catalogue.home_slot(division, home);
                matches.push(ScheduledMatch {
                    home: home_team.name().to_string(),
                    away: away_team.name().to_string(),
                    date: slot.home_date(w, config.spread()),
                    time: slot.time(),
                });

                let pair_key = (home.0.min(away.0), home.0.max(away.0));
                *pair_seen.entry(pair_key).or_insert(0u32) += 1;
            }
        }
    }

    for i in 0..division.len() as u16 {
        for j in (i + 1)..division.len() as u16 {
            let count = pair_seen.get(&(i, j)).copied().unwrap_or(0);
            if count != 1 {
                return Err(SchedulerError::ExtractionInvariant {
                    division: division.name().to_string(),
                    home: division.team(crate::team::TeamId(i)).name().to_string(),
                    away: division.team(crate::team::TeamId(j)).name().to_string(),
                });
            }
        }
    }

    let kpi_result = DivisionKpiResult {
        home_away_imbalance: eval_int(model, &kpis.home_away_imbalance),
        away_twice_at_same_club: eval_int(model, &kpis.away_twice_at_same_club),
        repeat_of_old_fixture: eval_int(model, &kpis.repeat_of_old_fixture),
    };

    Ok(DivisionSchedule {
        division: division.name().to_string(),
        matches,
        kpis: kpi_result,
    })
}

fn eval_int(model: &z3::Model<'_>, value: &z3::ast::Int<'_>) -> i64 {
    model.eval(value, true).and_then(|v| v.as_i64()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchedulerError;
    use crate::normalize::normalize;
    use crate::records::{FixtureRow, OldFixtureRow, SlotRow};
    use chrono::NaiveDate;

    /// Surfaces the driver's `log::info!`/`log::debug!` tightening trace under `cargo test --
    /// --nocapture` with `RUST_LOG=debug`; a no-op otherwise since `try_init` only installs once.
    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn fixture(draw: &str, team_1: &str, team_2: &str) -> FixtureRow {
        FixtureRow {
            date: None,
            time: None,
            league_type: "LEAGUE".into(),
            event: "EVENT".into(),
            draw: draw.into(),
            nr: "1".into(),
            team_1: team_1.into(),
            team_2: team_2.into(),
            court: None,
            location: None,
        }
    }

    fn slot(date: &str, time: &str, court: &str, team_1: &str, team_2: Option<&str>) -> SlotRow {
        SlotRow {
            date: date.into(),
            time: time.into(),
            court: court.into(),
            team_1: team_1.into(),
            team_2: team_2.map(str::to_string),
        }
    }

    fn round_robin_fixtures(draw: &str, teams: &[&str]) -> Vec<FixtureRow> {
        let mut rows = Vec::new();
        for i in 0..teams.len() {
            for j in (i + 1)..teams.len() {
                rows.push(fixture(draw, teams[i], teams[j]));
            }
        }
        rows
    }

    /// Scenario A: one same-club pair, forced by C9 into week 0 regardless of which side hosts.
    #[test]
    fn scenario_a_trivial_same_club_pair() {
        init_logging();
        let fixtures = vec![fixture("DIVISION", "Club X 1", "Club X 2")];
        let slots = vec![
            slot("01/01/2024", "10:00", "1", "Club X 1", None),
            slot("08/01/2024", "10:00", "2", "Club X 2", None),
        ];
        let catalogue = normalize(&fixtures, &slots, &[]).unwrap();
        let config = ScheduleConfig::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 2, 5, 1);

        let result = schedule(&catalogue, &config).unwrap();
        assert_eq!(result.divisions.len(), 1);
        let matches = &result.divisions[0].matches;
        assert_eq!(matches.len(), 1);

        let week_zero_dates = [
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
        ];
        assert!(week_zero_dates.contains(&matches[0].date));
    }

    /// Scenario E: the only same-club pair in the division is forced into week 0 by C9,
    /// independent of KPI tie-breaking.
    #[test]
    fn scenario_e_same_club_pair_plays_week_zero() {
        init_logging();
        let teams = ["Y 1", "Y 2", "A 1", "B 1"];
        let fixtures = round_robin_fixtures("DIVISION", &teams);
        let slots = vec![
            slot("01/01/2024", "09:00", "1", "Y 1", None),
            slot("01/01/2024", "10:30", "2", "Y 2", None),
            slot("01/01/2024", "12:00", "3", "A 1", None),
            slot("01/01/2024", "13:30", "4", "B 1", None),
        ];
        let catalogue = normalize(&fixtures, &slots, &[]).unwrap();
        let config = ScheduleConfig::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 4, 1, 1);

        let result = schedule(&catalogue, &config).unwrap();
        let matches = &result.divisions[0].matches;

        let week_zero = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let same_club_match = matches
            .iter()
            .find(|m| {
                (m.home == "Y 1" && m.away == "Y 2") || (m.home == "Y 2" && m.away == "Y 1")
            })
            .expect("same-club pair must be scheduled");
        assert_eq!(same_club_match.date, week_zero);
    }

    /// Scenario D: K3 can reach 0 without disturbing K1/K2, so the rematch reverses.
    #[test]
    fn scenario_d_old_fixture_reversal() {
        init_logging();
        let teams = ["Pike 1", "Quill 1", "River 1"];
        let fixtures = round_robin_fixtures("DIVISION", &teams);
        let slots = vec![
            slot("01/01/2024", "09:00", "1", "Pike 1", None),
            slot("01/01/2024", "10:30", "2", "Quill 1", None),
            slot("01/01/2024", "12:00", "3", "River 1", None),
        ];
        let old_fixtures = vec![OldFixtureRow {
            team_1: "Pike 1".into(),
            team_2: "Quill 1".into(),
        }];
        let catalogue = normalize(&fixtures, &slots, &old_fixtures).unwrap();
        let config = ScheduleConfig::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 3, 5, 1);

        let result = schedule(&catalogue, &config).unwrap();
        let matches = &result.divisions[0].matches;
        assert_eq!(result.divisions[0].kpis.repeat_of_old_fixture, 0);

        let rematch = matches
            .iter()
            .find(|m| {
                (m.home == "Pike 1" && m.away == "Quill 1")
                    || (m.home == "Quill 1" && m.away == "Pike 1")
            })
            .expect("Pike/Quill pairing must be scheduled");
        assert_eq!(rematch.home, "Quill 1");
        assert_eq!(rematch.away, "Pike 1");
    }

    /// Scenario F: 45 pairings can't fit into 3 weeks (at most 5 matches/week for 10 teams).
    #[test]
    fn scenario_f_unsat_reported() {
        init_logging();
        let team_names: Vec<String> = (1..=10).map(|n| format!("Team {n}")).collect();
        let teams: Vec<&str> = team_names.iter().map(String::as_str).collect();
        let fixtures = round_robin_fixtures("DIVISION", &teams);
        let slots: Vec<SlotRow> = teams
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                slot(
                    "01/01/2024",
                    &format!("{:02}:00", 9 + idx),
                    &(idx + 1).to_string(),
                    name,
                    None,
                )
            })
            .collect();
        let catalogue = normalize(&fixtures, &slots, &[]).unwrap();
        let config = ScheduleConfig::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 3, 5, 1);

        let err = schedule(&catalogue, &config).unwrap_err();
        assert!(matches!(err, SchedulerError::ModelUnsat { .. }));
    }

    /// Scenario C: two divisions share one slot; the solver must never double-book it.
    #[test]
    fn scenario_c_shared_slot_never_double_booked() {
        init_logging();
        let div_a_teams = ["A 1", "A 2", "A 3", "A 4"];
        let div_b_teams = ["B 1", "B 2", "B 3", "B 4"];
        let mut fixtures = round_robin_fixtures("DIVISION A", &div_a_teams);
        fixtures.extend(round_robin_fixtures("DIVISION B", &div_b_teams));

        let slots = vec![
            slot("01/01/2024", "09:00", "1", "A 1", Some("B 1")),
            slot("01/01/2024", "10:30", "2", "A 2", None),
            slot("01/01/2024", "12:00", "3", "A 3", None),
            slot("01/01/2024", "13:30", "4", "A 4", None),
            slot("02/01/2024", "09:00", "5", "B 2", None),
            slot("02/01/2024", "10:30", "6", "B 3", None),
            slot("02/01/2024", "12:00", "7", "B 4", None),
        ];
        let catalogue = normalize(&fixtures, &slots, &[]).unwrap();
        let config = ScheduleConfig::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 4, 1, 1);

        let result = schedule(&catalogue, &config).unwrap();

        let a1_home_dates: Vec<_> = result
            .divisions
            .iter()
            .flat_map(|d| d.matches.iter())
            .filter(|m| m.home == "A 1")
            .map(|m| m.date)
            .collect();
        let b1_home_dates: Vec<_> = result
            .divisions
            .iter()
            .flat_map(|d| d.matches.iter())
            .filter(|m| m.home == "B 1")
            .map(|m| m.date)
            .collect();

        assert!(a1_home_dates.iter().all(|d| !b1_home_dates.contains(d)));

        let clashes = super::super::audit::audit_shared_slots(&result, &catalogue);
        assert!(clashes.is_empty());
    }

    /// Scenario B: four teams sharing a first-week date with a rest requirement wide enough that
    /// every pairing can't be squeezed into one week; the solver must still respect it for every
    /// pair of matches a team plays, and keep the home/away split close to even.
    #[test]
    fn scenario_b_rest_enforcement() {
        init_logging();
        let teams = ["Apex 1", "Birch 1", "Cedar 1", "Delta 1"];
        let fixtures = round_robin_fixtures("DIVISION 1", &teams);
        let slots = vec![
            slot("01/01/2024", "09:00", "1", "Apex 1", None),
            slot("01/01/2024", "10:30", "2", "Birch 1", None),
            slot("01/01/2024", "12:00", "3", "Cedar 1", None),
            slot("01/01/2024", "13:30", "4", "Delta 1", None),
        ];
        let catalogue = normalize(&fixtures, &slots, &[]).unwrap();
        let config = ScheduleConfig::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 4, 8, 1);

        let result = schedule(&catalogue, &config).unwrap();
        let matches = &result.divisions[0].matches;
        assert_eq!(matches.len(), 6);

        for &team in &teams {
            let mut dates: Vec<NaiveDate> = matches
                .iter()
                .filter(|m| m.home == team || m.away == team)
                .map(|m| m.date)
                .collect();
            dates.sort();
            for pair in dates.windows(2) {
                let gap = (pair[1] - pair[0]).num_days();
                assert!(
                    gap >= config.rest_days(),
                    "{team}: gap of {gap} day(s) between {} and {} is under the {}-day rest requirement",
                    pair[0],
                    pair[1],
                    config.rest_days()
                );
            }

            let home_count = matches.iter().filter(|m| m.home == team).count() as i64;
            let away_count = matches.iter().filter(|m| m.away == team).count() as i64;
            assert!(
                (home_count - away_count).abs() <= 1,
                "{team}: home/away split {home_count}/{away_count} is too uneven"
            );
        }
    }

    /// Encoding a finished schedule back into fixture rows and re-normalizing those rows
    /// reproduces the same set of scheduled matches.
    #[test]
    fn round_trip_through_fixture_rows_reproduces_matches() {
        init_logging();
        let teams = ["Pike 1", "Quill 1", "River 1"];
        let fixtures = round_robin_fixtures("DIVISION", &teams);
        let slots = vec![
            slot("01/01/2024", "09:00", "1", "Pike 1", None),
            slot("01/01/2024", "10:30", "2", "Quill 1", None),
            slot("01/01/2024", "12:00", "3", "River 1", None),
        ];
        let catalogue = normalize(&fixtures, &slots, &[]).unwrap();
        let config = ScheduleConfig::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 3, 5, 1);

        let result = schedule(&catalogue, &config).unwrap();
        let encoded_rows = result.to_fixture_rows();

        let round_tripped = normalize(&encoded_rows, &slots, &[]).unwrap();
        assert_eq!(round_tripped.divisions().len(), catalogue.divisions().len());

        let mut expected: Vec<(String, String, String)> = result
            .divisions
            .iter()
            .flat_map(|d| {
                d.matches
                    .iter()
                    .map(|m| (d.division.clone(), m.home.clone(), m.away.clone()))
            })
            .collect();
        expected.sort();

        let mut actual: Vec<(String, String, String)> = encoded_rows
            .iter()
            .map(|row| (row.draw.clone(), row.team_1.clone(), row.team_2.clone()))
            .collect();
        actual.sort();

        assert_eq!(actual, expected);
    }
}
