use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One row of the fixtures input. Ingestion (parsing the file into these rows) is an
/// external collaborator's concern; this crate only defines the wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureRow {
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Time")]
    pub time: Option<String>,
    #[serde(rename = "League Type")]
    pub league_type: String,
    #[serde(rename = "Event")]
    pub event: String,
    #[serde(rename = "Draw")]
    pub draw: String,
    #[serde(rename = "Nr")]
    pub nr: String,
    #[serde(rename = "Team 1")]
    pub team_1: String,
    #[serde(rename = "Team 2")]
    pub team_2: String,
    #[serde(rename = "Court")]
    pub court: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
}

/// One row of the slots input. `team_2` is the optional sharing team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Court")]
    pub court: String,
    #[serde(rename = "Team 1")]
    pub team_1: String,
    #[serde(rename = "Team 2")]
    pub team_2: Option<String>,
}

/// One row of the (optional) old-fixtures input. Only `team_1`/`team_2` are used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldFixtureRow {
    #[serde(rename = "Team 1")]
    pub team_1: String,
    #[serde(rename = "Team 2")]
    pub team_2: String,
}

pub const BYE: &str = "Bye";

/// A weekly home venue for exactly one primary team and optionally one sharing team.
/// Slot records are immutable once built by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    first_week_date: NaiveDate,
    time: NaiveTime,
    court: String,
    primary: String,
    sharer: Option<String>,
}

impl Slot {
    pub fn new(
        first_week_date: NaiveDate,
        time: NaiveTime,
        court: impl Into<String>,
        primary: impl Into<String>,
        sharer: Option<String>,
    ) -> Self {
        Self {
            first_week_date,
            time,
            court: court.into(),
            primary: primary.into(),
            sharer,
        }
    }

    pub const fn first_week_date(&self) -> NaiveDate {
        self.first_week_date
    }

    pub const fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn court(&self) -> &str {
        &self.court
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn sharer(&self) -> Option<&str> {
        self.sharer.as_deref()
    }

    pub fn mentions(&self, team: &str) -> bool {
        self.primary == team || self.sharer.as_deref() == Some(team)
    }

    /// The team's Nth home date: `first_week_date + 7·N·spread` days.
    pub fn home_date(&self, week: u32, spread: u32) -> NaiveDate {
        self.first_week_date + chrono::Duration::days(7 * i64::from(week) * i64::from(spread))
    }
}

/// An ordered pair `(home, away)` from a previous season. Used only to compute the
/// "repeat of old fixture" KPI (K3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OldFixture {
    pub home: String,
    pub away: String,
}

impl From<&OldFixtureRow> for OldFixture {
    fn from(row: &OldFixtureRow) -> Self {
        Self {
            home: row.team_1.clone(),
            away: row.team_2.clone(),
        }
    }
}
