use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use itertools::{Itertools, MinMaxResult};

use crate::catalogue::Catalogue;
use crate::error::NormalizeError;
use crate::records::{FixtureRow, OldFixtureRow, Slot, SlotRow, BYE};
use crate::team::{Division, Team};

const DATE_FORMAT: &str = "%d/%m/%Y";

fn parse_date(raw: &str) -> Result<NaiveDate, NormalizeError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| NormalizeError::InvalidSlotDate {
        raw: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_time(raw: &str) -> Result<NaiveTime, NormalizeError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|e| NormalizeError::InvalidSlotTime {
            raw: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Converts raw fixture/slot/old-fixture rows into the typed catalogue.
pub fn normalize(
    fixtures: &[FixtureRow],
    slots: &[SlotRow],
    old_fixtures: &[OldFixtureRow],
) -> Result<Catalogue, NormalizeError> {
    let fixtures: Vec<&FixtureRow> = fixtures.iter().filter(|f| f.team_1 != BYE).collect();

    let slots: Vec<Slot> = slots
        .iter()
        .map(|row| {
            Ok(Slot::new(
                parse_date(&row.date)?,
                parse_time(&row.time)?,
                row.court.clone(),
                row.team_1.clone(),
                row.team_2.clone(),
            ))
        })
        .collect::<Result<Vec<_>, NormalizeError>>()?;

    check_first_week_spread(&slots)?;

    let mut team_slot: HashMap<String, usize> = HashMap::new();
    let mut slot_team_counts: HashMap<String, u32> = HashMap::new();
    for slot in &slots {
        slot_team_counts
            .entry(slot.primary().to_string())
            .and_modify(|c| *c += 1)
            .or_insert(1);
        if let Some(sharer) = slot.sharer() {
            slot_team_counts
                .entry(sharer.to_string())
                .and_modify(|c| *c += 1)
                .or_insert(1);
        }
    }
    let duplicates: Vec<String> = slot_team_counts
        .iter()
        .filter(|(_, &count)| count > 1)
        .map(|(name, _)| name.clone())
        .collect();
    if !duplicates.is_empty() {
        let mut duplicates = duplicates;
        duplicates.sort();
        return Err(NormalizeError::DuplicateSlotAssignment(duplicates));
    }

    let all_teams_in_fixtures: HashSet<String> = fixtures
        .iter()
        .flat_map(|f| [f.team_1.clone(), f.team_2.clone()])
        .collect();
    let all_teams_in_slots: HashSet<String> = slot_team_counts.keys().cloned().collect();

    let missing_from_slots: Vec<String> = all_teams_in_fixtures
        .difference(&all_teams_in_slots)
        .cloned()
        .collect();
    if !missing_from_slots.is_empty() {
        let mut missing = missing_from_slots;
        missing.sort();
        return Err(NormalizeError::TeamsMissingFromSlots(missing));
    }

    let missing_from_fixtures: Vec<String> = all_teams_in_slots
        .difference(&all_teams_in_fixtures)
        .cloned()
        .collect();
    if !missing_from_fixtures.is_empty() {
        let mut missing = missing_from_fixtures;
        missing.sort();
        return Err(NormalizeError::TeamsMissingFromFixtures(missing));
    }

    // Build team -> slot_index by scanning slots in order for the first mention of each team.
    // Every team here is already known to have a slot: the missing_from_slots check above
    // returns early unless all_teams_in_fixtures is a subset of all_teams_in_slots.
    for team in &all_teams_in_fixtures {
        if team_slot.contains_key(team) {
            continue;
        }
        let idx = slots
            .iter()
            .position(|s| s.mentions(team))
            .expect("missing_from_slots check above guarantees every fixture team has a slot");
        team_slot.insert(team.clone(), idx);
    }

    // Build divisions preserving the order teams first appear in the fixtures list.
    let mut division_index: HashMap<String, usize> = HashMap::new();
    let mut divisions: Vec<Division> = Vec::new();
    let mut team_division: HashMap<String, usize> = HashMap::new();

    for fixture in &fixtures {
        let division_name = &fixture.draw;
        let division_idx = *division_index.entry(division_name.clone()).or_insert_with(|| {
            divisions.push(Division::new(division_name.clone()));
            divisions.len() - 1
        });

        for team_name in [&fixture.team_1, &fixture.team_2] {
            if team_division.contains_key(team_name) {
                continue;
            }
            divisions[division_idx].push_team(Team::new(team_name.clone()));
            team_division.insert(team_name.clone(), division_idx);
        }
    }

    let old_fixtures = old_fixtures.iter().map(Into::into).collect();

    Ok(Catalogue::new(
        divisions,
        team_division,
        team_slot,
        slots,
        old_fixtures,
    ))
}

fn check_first_week_spread(slots: &[Slot]) -> Result<(), NormalizeError> {
    let (earliest, latest) = match slots.iter().map(Slot::first_week_date).minmax() {
        MinMaxResult::NoElements => return Ok(()),
        MinMaxResult::OneElement(date) => (date, date),
        MinMaxResult::MinMax(earliest, latest) => (earliest, latest),
    };

    let spread_days = (latest - earliest).num_days();
    if spread_days > 7 {
        return Err(NormalizeError::SlotDateSpreadTooWide {
            spread_days,
            earliest,
            latest,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn slot(date: &str, time: &str, team_1: &str, team_2: Option<&str>) -> SlotRow {
        SlotRow {
            date: date.into(),
            time: time.into(),
            court: "1".into(),
            team_1: team_1.into(),
            team_2: team_2.map(str::to_string),
        }
    }

    #[test]
    fn bye_rows_are_filtered() {
        let fixtures = vec![fixture("DIV 1", BYE, "Club X 1")];
        let slots = vec![slot("01/01/2024", "10:00", "Club X 1", None)];
        let catalogue = normalize(&fixtures, &slots, &[]).unwrap();
        assert!(catalogue.divisions().is_empty());
    }

    #[test]
    fn rejects_duplicate_slot_assignment() {
        let fixtures = vec![fixture("DIV 1", "Club X 1", "Club X 2")];
        let slots = vec![
            slot("01/01/2024", "10:00", "Club X 1", None),
            slot("01/01/2024", "11:00", "Club X 1", None),
        ];
        let err = normalize(&fixtures, &slots, &[]).unwrap_err();
        assert!(matches!(err, NormalizeError::DuplicateSlotAssignment(_)));
    }

    #[test]
    fn rejects_wide_first_week_spread() {
        let fixtures = vec![fixture("DIV 1", "Club X 1", "Club X 2")];
        let slots = vec![
            slot("01/01/2024", "10:00", "Club X 1", None),
            slot("10/01/2024", "10:00", "Club X 2", None),
        ];
        let err = normalize(&fixtures, &slots, &[]).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::SlotDateSpreadTooWide { .. }
        ));
    }

    #[test]
    fn rejects_unparseable_slot_date() {
        let fixtures = vec![fixture("DIV 1", "Club X 1", "Club X 2")];
        let slots = vec![
            slot("not-a-date", "10:00", "Club X 1", None),
            slot("08/01/2024", "10:00", "Club X 2", None),
        ];
        let err = normalize(&fixtures, &slots, &[]).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidSlotDate { .. }));
    }

    #[test]
    fn builds_one_division_with_both_teams() {
        let fixtures = vec![fixture("DIV 1", "Club X 1", "Club X 2")];
        let slots = vec![
            slot("01/01/2024", "10:00", "Club X 1", None),
            slot("08/01/2024", "10:00", "Club X 2", None),
        ];
        let catalogue = normalize(&fixtures, &slots, &[]).unwrap();
        assert_eq!(catalogue.divisions().len(), 1);
        assert_eq!(catalogue.divisions()[0].len(), 2);
    }
}
