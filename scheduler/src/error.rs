use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced by the input normalizer. All are fatal before any solving starts.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("team(s) appear more than once in the slots file: {0:?}")]
    DuplicateSlotAssignment(Vec<String>),
    #[error("team(s) appear in fixtures but not in slots: {0:?}")]
    TeamsMissingFromSlots(Vec<String>),
    #[error("team(s) appear in slots but not in fixtures: {0:?}")]
    TeamsMissingFromFixtures(Vec<String>),
    #[error(
        "first-week slot dates span {spread_days} days (earliest {earliest}, latest {latest}), which exceeds the 7-day window"
    )]
    SlotDateSpreadTooWide {
        spread_days: i64,
        earliest: NaiveDate,
        latest: NaiveDate,
    },

    #[error("slot date `{raw}` did not match the expected DD/MM/YYYY format: {reason}")]
    InvalidSlotDate { raw: String, reason: String },

    #[error("slot time `{raw}` did not match the expected HH:MM[:SS] format: {reason}")]
    InvalidSlotTime { raw: String, reason: String },
}

/// Errors surfaced by the constraint builder and optimizer driver.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("division `{division}` has no satisfying assignment for the hard constraints")]
    ModelUnsat { division: String },

    #[error(
        "pair ({home}, {away}) in division `{division}` did not appear exactly once in the extracted schedule"
    )]
    ExtractionInvariant {
        division: String,
        home: String,
        away: String,
    },
}

pub type Result<T, E = SchedulerError> = std::result::Result<T, E>;
