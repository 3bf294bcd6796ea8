//! Round-robin league scheduling via SMT constraint solving.
//!
//! Given a catalogue of divisions, each team's weekly home slot, and this season's rules
//! ([`config::ScheduleConfig`]), [`solver::schedule`] produces a complete fixture list per
//! division that satisfies every hard constraint and is lexicographically optimal across
//! the three competition KPIs.
//!
//! The pipeline: [`normalize`] turns raw rows into a [`catalogue::Catalogue`], [`lattice`] and
//! [`builder`] stand up the decision variables for one division, [`constraints`] and [`kpi`]
//! assert the hard/soft halves of the model, [`solver`] drives the push/pop tightening loop and
//! extracts a [`schedule::Schedule`], and [`audit`] re-checks the result before you trust it.

pub mod audit;
pub mod builder;
pub mod catalogue;
pub mod config;
pub mod constraints;
pub mod error;
pub mod kpi;
pub mod lattice;
pub mod normalize;
pub mod records;
pub mod schedule;
pub mod solver;
pub mod team;

pub use catalogue::Catalogue;
pub use config::ScheduleConfig;
pub use error::{NormalizeError, Result, SchedulerError};
pub use schedule::Schedule;
