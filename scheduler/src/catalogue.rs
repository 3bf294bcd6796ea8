use std::collections::HashMap;

use crate::records::{OldFixture, Slot};
use crate::team::{Division, TeamId};

/// The typed catalogue produced by the input normalizer and consumed by everything
/// downstream. Teams are immutable once the catalogue is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalogue {
    divisions: Vec<Division>,
    /// team name -> index into `divisions`
    team_division: HashMap<String, usize>,
    /// team name -> index into `slots`
    team_slot: HashMap<String, usize>,
    slots: Vec<Slot>,
    old_fixtures: Vec<OldFixture>,
}

impl Catalogue {
    pub(crate) fn new(
        divisions: Vec<Division>,
        team_division: HashMap<String, usize>,
        team_slot: HashMap<String, usize>,
        slots: Vec<Slot>,
        old_fixtures: Vec<OldFixture>,
    ) -> Self {
        Self {
            divisions,
            team_division,
            team_slot,
            slots,
            old_fixtures,
        }
    }

    pub fn divisions(&self) -> &[Division] {
        &self.divisions
    }

    pub fn division_of(&self, team_name: &str) -> Option<&Division> {
        self.team_division
            .get(team_name)
            .map(|&idx| &self.divisions[idx])
    }

    pub fn slot_of(&self, team_name: &str) -> Option<&Slot> {
        self.team_slot.get(team_name).map(|&idx| &self.slots[idx])
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn old_fixtures(&self) -> &[OldFixture] {
        &self.old_fixtures
    }

    /// Resolves `(division, TeamId)` for a scheduled-match lookup keyed by the team's own slot.
    pub fn home_slot(&self, division: &Division, team: TeamId) -> &Slot {
        let name = division.team(team).name();
        self.team_slot
            .get(name)
            .map(|&idx| &self.slots[idx])
            .expect("normalizer guarantees every fixture team has exactly one slot")
    }

    /// Slots with two sharing teams, paired with the divisions each side belongs to — the input
    /// to the shared-slot constraint and the self-audit. Independent of whether
    /// the two teams are in the same division.
    pub fn shared_slots(&self) -> impl Iterator<Item = (&Slot, &str, &str)> {
        self.slots.iter().filter_map(|slot| {
            slot.sharer()
                .map(|sharer| (slot, slot.primary(), sharer))
        })
    }
}
