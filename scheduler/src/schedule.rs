//! The solver's output types and a diagnostic grid rendering for quick visual inspection of a
//! division's schedule.

use chrono::{NaiveDate, NaiveTime};

use crate::records::FixtureRow;
use crate::team::Division;

/// One fixture as placed by the solver: `home` hosts `away` on `date` at `time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledMatch {
    pub home: String,
    pub away: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl ScheduledMatch {
    /// Encodes this match back into the fixtures row shape — the wire format an output-emission
    /// collaborator would serialize. `nr` numbers the row within its division.
    pub fn to_fixture_row(&self, division: &str, nr: &str) -> FixtureRow {
        FixtureRow {
            date: Some(self.date.format("%d/%m/%Y").to_string()),
            time: Some(self.time.format("%H:%M:%S").to_string()),
            league_type: "LEAGUE".to_string(),
            event: "EVENT".to_string(),
            draw: division.to_string(),
            nr: nr.to_string(),
            team_1: self.home.clone(),
            team_2: self.away.clone(),
            court: None,
            location: None,
        }
    }
}

/// The three KPI values actually achieved in the extracted model, lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisionKpiResult {
    pub home_away_imbalance: i64,
    pub away_twice_at_same_club: i64,
    pub repeat_of_old_fixture: i64,
}

/// Whether a division reached its ideal bound for one KPI during lexicographic tightening, or
/// gave up after exhausting its iteration budget and kept whatever the solver last proved sat
/// for. One entry is recorded per `(kpi, division)` pair the driver tightens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TighteningOutcome {
    Tightened {
        kpi: &'static str,
        division: String,
        limit: i64,
    },
    TimedOut {
        kpi: &'static str,
        division: String,
        limit: i64,
    },
}

/// One division's completed fixture list plus its achieved KPI values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionSchedule {
    pub division: String,
    pub matches: Vec<ScheduledMatch>,
    pub kpis: DivisionKpiResult,
}

impl DivisionSchedule {
    /// Encodes every match in this division back into fixture rows, numbered from 1.
    pub fn to_fixture_rows(&self) -> Vec<FixtureRow> {
        self.matches
            .iter()
            .enumerate()
            .map(|(idx, m)| m.to_fixture_row(&self.division, &(idx + 1).to_string()))
            .collect()
    }
}

/// The whole competition's schedule, one entry per division, plus the outcome of every KPI
/// tightening round (reached its ideal bound, or timed out) across every division.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub divisions: Vec<DivisionSchedule>,
    pub tightening_outcomes: Vec<TighteningOutcome>,
}

impl Schedule {
    pub fn division(&self, name: &str) -> Option<&DivisionSchedule> {
        self.divisions.iter().find(|d| d.division == name)
    }

    /// Encodes every division's matches back into fixture rows.
    pub fn to_fixture_rows(&self) -> Vec<FixtureRow> {
        self.divisions
            .iter()
            .flat_map(DivisionSchedule::to_fixture_rows)
            .collect()
    }

    /// Tightening rounds that exhausted their iteration budget rather than reaching 0 — the
    /// only `TighteningOutcome`s worth surfacing to a caller as a warning.
    pub fn timed_out(&self) -> impl Iterator<Item = &TighteningOutcome> {
        self.tightening_outcomes
            .iter()
            .filter(|o| matches!(o, TighteningOutcome::TimedOut { .. }))
    }
}

/// Renders a home-team-by-away-team grid of match dates, `-` where the pair doesn't face off
/// that way around.
pub fn render_grid(schedule: &DivisionSchedule, division: &Division) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "= {} ===========", schedule.division);

    let _ = write!(out, "{:>31} :", "home \\ away");
    for (idx, _) in division.teams().iter().enumerate() {
        let _ = write!(out, "\t({})", idx + 1);
    }
    out.push('\n');

    for home in division.teams() {
        let _ = write!(out, "{:>31} :", home.name());
        for away in division.teams() {
            let found = schedule
                .matches
                .iter()
                .find(|m| m.home == home.name() && m.away == away.name());
            match found {
                Some(m) => {
                    let _ = write!(out, "\t{}", m.date.format("%d%b"));
                }
                None => {
                    let _ = write!(out, "\t-");
                }
            }
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "Home/Away imbalance     = {}",
        schedule.kpis.home_away_imbalance
    );
    let _ = writeln!(
        out,
        "Away twice at same club = {}",
        schedule.kpis.away_twice_at_same_club
    );
    let _ = writeln!(
        out,
        "Repeat of old fixture   = {}",
        schedule.kpis.repeat_of_old_fixture
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::Team;
    use chrono::NaiveTime;

    #[test]
    fn renders_played_pair_and_dashes_for_the_rest() {
        let mut division = Division::new("DIVISION 1");
        division.push_team(Team::new("Club X 1"));
        division.push_team(Team::new("Club X 2"));

        let schedule = DivisionSchedule {
            division: "DIVISION 1".to_string(),
            matches: vec![ScheduledMatch {
                home: "Club X 1".to_string(),
                away: "Club X 2".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            }],
            kpis: DivisionKpiResult {
                home_away_imbalance: 0,
                away_twice_at_same_club: 0,
                repeat_of_old_fixture: 0,
            },
        };

        let grid = render_grid(&schedule, &division);
        assert!(grid.contains("01Jan"));
        assert!(grid.contains('-'));
        assert!(grid.contains("Home/Away imbalance     = 0"));
    }
}
