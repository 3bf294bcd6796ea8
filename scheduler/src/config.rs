use chrono::NaiveDate;

/// Caller-supplied knobs for a single scheduling run. Immutable once built and threaded
/// explicitly through the pipeline rather than held as process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Date of the competition's first week. Informational only; used for derived output naming
    /// by callers, not consulted by the solver itself.
    start_date: NaiveDate,
    /// Number of competition weeks to model (`W`).
    weeks: u32,
    /// Minimum inter-match gap in days per team.
    rest_days: i64,
    /// Stride, in weeks, between a team's successive home dates. `spread = 2` interleaves this
    /// competition with another running on alternating weeks.
    spread: u32,
}

impl ScheduleConfig {
    pub fn new(start_date: NaiveDate, weeks: u32, rest_days: i64, spread: u32) -> Self {
        assert!(weeks > 0, "a competition needs at least one week");
        assert!(spread >= 1, "spread must be at least 1");
        Self {
            start_date,
            weeks,
            rest_days,
            spread,
        }
    }

    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub const fn weeks(&self) -> u32 {
        self.weeks
    }

    pub const fn rest_days(&self) -> i64 {
        self.rest_days
    }

    pub const fn spread(&self) -> u32 {
        self.spread
    }
}
