use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use scheduler::normalize::normalize;
use scheduler::records::{FixtureRow, OldFixtureRow, SlotRow};
use scheduler::schedule::render_grid;
use scheduler::{audit, solver, ScheduleConfig};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Build a small in-memory scenario and run it through the scheduler, printing each
    /// division's grid and any self-audit warnings. Doesn't re-implement file ingestion; see
    /// `scheduler::records` for the row shapes a real caller would (de)serialize.
    Playground {
        #[arg(value_enum, default_value_t = Scenario::RestEnforcement)]
        scenario: Scenario,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Scenario {
    /// Two teams, one same-club pairing, one week.
    Trivial,
    /// Four same-week teams with a generous rest requirement.
    RestEnforcement,
    /// Two divisions sharing one slot.
    SharedSlot,
    /// A rematch that last season's result nudges toward reversing.
    OldFixtureReversal,
}

fn fixture(draw: &str, team_1: &str, team_2: &str) -> FixtureRow {
    FixtureRow {
        date: None,
        time: None,
        league_type: "LEAGUE".into(),
        event: "PLAYGROUND".into(),
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

/// One same-club pair, nothing else to decide.
fn trivial_scenario() -> (Vec<FixtureRow>, Vec<SlotRow>, Vec<OldFixtureRow>, ScheduleConfig) {
    let fixtures = vec![fixture("DIVISION 1", "Club X 1", "Club X 2")];
    let slots = vec![
        slot("01/01/2024", "10:00", "1", "Club X 1", None),
        slot("08/01/2024", "11:00", "2", "Club X 2", None),
    ];
    let config = ScheduleConfig::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 2, 5, 1);
    (fixtures, slots, Vec::new(), config)
}

/// Four teams sharing a first-week date, forcing the rest constraint to actually bite.
fn rest_enforcement_scenario() -> (Vec<FixtureRow>, Vec<SlotRow>, Vec<OldFixtureRow>, ScheduleConfig)
{
    let fixtures = vec![
        fixture("DIVISION 1", "Apex 1", "Birch 1"),
        fixture("DIVISION 1", "Apex 1", "Cedar 1"),
        fixture("DIVISION 1", "Apex 1", "Delta 1"),
        fixture("DIVISION 1", "Birch 1", "Cedar 1"),
        fixture("DIVISION 1", "Birch 1", "Delta 1"),
        fixture("DIVISION 1", "Cedar 1", "Delta 1"),
    ];
    let slots = vec![
        slot("01/01/2024", "09:00", "1", "Apex 1", None),
        slot("01/01/2024", "10:30", "2", "Birch 1", None),
        slot("01/01/2024", "12:00", "3", "Cedar 1", None),
        slot("01/01/2024", "13:30", "4", "Delta 1", None),
    ];
    let config = ScheduleConfig::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 4, 8, 1);
    (fixtures, slots, Vec::new(), config)
}

/// Two divisions, one shared slot between them.
fn shared_slot_scenario() -> (Vec<FixtureRow>, Vec<SlotRow>, Vec<OldFixtureRow>, ScheduleConfig) {
    let fixtures = vec![
        fixture("DIVISION A", "A 1", "A 2"),
        fixture("DIVISION A", "A 1", "A 3"),
        fixture("DIVISION A", "A 1", "A 4"),
        fixture("DIVISION A", "A 2", "A 3"),
        fixture("DIVISION A", "A 2", "A 4"),
        fixture("DIVISION A", "A 3", "A 4"),
        fixture("DIVISION B", "B 1", "B 2"),
        fixture("DIVISION B", "B 1", "B 3"),
        fixture("DIVISION B", "B 1", "B 4"),
        fixture("DIVISION B", "B 2", "B 3"),
        fixture("DIVISION B", "B 2", "B 4"),
        fixture("DIVISION B", "B 3", "B 4"),
    ];
    let slots = vec![
        slot("01/01/2024", "09:00", "1", "A 1", Some("B 1")),
        slot("01/01/2024", "10:30", "2", "A 2", None),
        slot("01/01/2024", "12:00", "3", "A 3", None),
        slot("01/01/2024", "13:30", "4", "A 4", None),
        slot("02/01/2024", "09:00", "5", "B 2", None),
        slot("02/01/2024", "10:30", "6", "B 3", None),
        slot("02/01/2024", "12:00", "7", "B 4", None),
    ];
    let config = ScheduleConfig::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 4, 4, 1);
    (fixtures, slots, Vec::new(), config)
}

/// A rematch the old-fixture KPI nudges toward reversing.
fn old_fixture_reversal_scenario(
) -> (Vec<FixtureRow>, Vec<SlotRow>, Vec<OldFixtureRow>, ScheduleConfig) {
    let fixtures = vec![
        fixture("DIVISION 1", "Pike 1", "Quill 1"),
        fixture("DIVISION 1", "Pike 1", "River 1"),
        fixture("DIVISION 1", "Quill 1", "River 1"),
    ];
    let slots = vec![
        slot("01/01/2024", "09:00", "1", "Pike 1", None),
        slot("01/01/2024", "10:30", "2", "Quill 1", None),
        slot("01/01/2024", "12:00", "3", "River 1", None),
    ];
    let old_fixtures = vec![OldFixtureRow {
        team_1: "Pike 1".into(),
        team_2: "Quill 1".into(),
    }];
    let config = ScheduleConfig::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 3, 5, 1);
    (fixtures, slots, old_fixtures, config)
}

fn run_playground(scenario: Scenario) -> Result<()> {
    let (fixtures, slots, old_fixtures, config) = match scenario {
        Scenario::Trivial => trivial_scenario(),
        Scenario::RestEnforcement => rest_enforcement_scenario(),
        Scenario::SharedSlot => shared_slot_scenario(),
        Scenario::OldFixtureReversal => old_fixture_reversal_scenario(),
    };

    let catalogue =
        normalize(&fixtures, &slots, &old_fixtures).context("input normalization failed")?;

    let result = solver::schedule(&catalogue, &config).context("scheduling failed")?;

    for division_schedule in &result.divisions {
        let division = catalogue
            .divisions()
            .iter()
            .find(|d| d.name() == division_schedule.division)
            .expect("solver only returns divisions it was given");
        print!("{}", render_grid(division_schedule, division));
    }

    let clashes = audit::audit_shared_slots(&result, &catalogue);
    if clashes.is_empty() {
        println!("\nself-audit: no shared-slot clashes");
    } else {
        println!("\nself-audit found {} clash(es)", clashes.len());
    }

    for timeout in result.timed_out() {
        println!("note: {timeout:?}");
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    match args.cmd {
        Commands::Playground { scenario } => run_playground(scenario)?,
    }

    Ok(())
}
