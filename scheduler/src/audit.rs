//! The post-solve self-audit: re-scans the finished schedule for shared-slot clashes that the
//! shared-slot hard constraint should already have ruled out. Never fatal — a clash here means
//! the hard constraints missed something, which is worth a loud warning but not worth discarding
//! an otherwise-valid schedule.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::catalogue::Catalogue;
use crate::schedule::Schedule;

/// One shared-slot clash: both teams hosted a fixture on the same date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedSlotClash {
    pub team1: String,
    pub team2: String,
    pub dates: Vec<NaiveDate>,
}

fn home_dates(schedule: &Schedule, team_name: &str) -> HashSet<NaiveDate> {
    schedule
        .divisions
        .iter()
        .flat_map(|d| d.matches.iter())
        .filter(|m| m.home == team_name)
        .map(|m| m.date)
        .collect()
}

/// Checks every shared slot for a same-date double-booking. Logs a warning per clash found and
/// returns them for the caller to surface however it likes.
pub fn audit_shared_slots(schedule: &Schedule, catalogue: &Catalogue) -> Vec<SharedSlotClash> {
    let mut clashes = Vec::new();

    for (_, team1, team2) in catalogue.shared_slots() {
        let team1_dates = home_dates(schedule, team1);
        let team2_dates = home_dates(schedule, team2);

        let mut shared: Vec<NaiveDate> = team1_dates.intersection(&team2_dates).copied().collect();
        if shared.is_empty() {
            continue;
        }
        shared.sort();

        log::warn!(
            "shared slot clash: {team1} and {team2} both host on {}",
            shared
                .iter()
                .map(|d| d.format("%d %b").to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        clashes.push(SharedSlotClash {
            team1: team1.to_string(),
            team2: team2.to_string(),
            dates: shared,
        });
    }

    clashes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{DivisionKpiResult, DivisionSchedule, ScheduledMatch};
    use chrono::{NaiveDate, NaiveTime};

    fn catalogue_with_shared_slot() -> Catalogue {
        use crate::records::{FixtureRow, OldFixtureRow, SlotRow};
        use crate::normalize::normalize;

        let fixtures = vec![
            FixtureRow {
                date: None,
                time: None,
                league_type: "LEAGUE".into(),
                event: "EVENT".into(),
                draw: "DIV 1".into(),
                nr: "1".into(),
                team_1: "Club A 1".into(),
                team_2: "Club B 1".into(),
                court: None,
                location: None,
            },
            FixtureRow {
                date: None,
                time: None,
                league_type: "LEAGUE".into(),
                event: "EVENT".into(),
                draw: "DIV 2".into(),
                nr: "1".into(),
                team_1: "Club C 1".into(),
                team_2: "Club D 1".into(),
                court: None,
                location: None,
            },
        ];
        let slots = vec![
            SlotRow {
                date: "01/01/2024".into(),
                time: "10:00".into(),
                court: "1".into(),
                team_1: "Club A 1".into(),
                team_2: Some("Club C 1".into()),
            },
            SlotRow {
                date: "08/01/2024".into(),
                time: "10:00".into(),
                court: "2".into(),
                team_1: "Club B 1".into(),
                team_2: None,
            },
            SlotRow {
                date: "08/01/2024".into(),
                time: "11:00".into(),
                court: "3".into(),
                team_1: "Club D 1".into(),
                team_2: None,
            },
        ];
        let old_fixtures: Vec<OldFixtureRow> = Vec::new();
        normalize(&fixtures, &slots, &old_fixtures).unwrap()
    }

    fn division_schedule(division: &str, home: &str, away: &str, date: &str) -> DivisionSchedule {
        DivisionSchedule {
            division: division.to_string(),
            matches: vec![ScheduledMatch {
                home: home.to_string(),
                away: away.to_string(),
                date: NaiveDate::parse_from_str(date, "%d/%m/%Y").unwrap(),
                time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            }],
            kpis: DivisionKpiResult {
                home_away_imbalance: 0,
                away_twice_at_same_club: 0,
                repeat_of_old_fixture: 0,
            },
        }
    }

    #[test]
    fn flags_same_date_double_booking() {
        let catalogue = catalogue_with_shared_slot();
        let schedule = Schedule {
            divisions: vec![
                division_schedule("DIV 1", "Club A 1", "Club B 1", "01/01/2024"),
                division_schedule("DIV 2", "Club C 1", "Club D 1", "01/01/2024"),
            ],
            tightening_outcomes: Vec::new(),
        };

        let clashes = audit_shared_slots(&schedule, &catalogue);
        assert_eq!(clashes.len(), 1);
        assert_eq!(clashes[0].team1, "Club A 1");
        assert_eq!(clashes[0].team2, "Club C 1");
    }

    #[test]
    fn no_clash_when_dates_differ() {
        let catalogue = catalogue_with_shared_slot();
        let schedule = Schedule {
            divisions: vec![
                division_schedule("DIV 1", "Club A 1", "Club B 1", "01/01/2024"),
                division_schedule("DIV 2", "Club C 1", "Club D 1", "08/01/2024"),
            ],
            tightening_outcomes: Vec::new(),
        };

        let clashes = audit_shared_slots(&schedule, &catalogue);
        assert!(clashes.is_empty());
    }
}
