use std::fmt::Display;

/// A team's index within its division's lattice. Interning teams as a compact integer id keeps
/// solver-variable naming and the dense per-division lattices cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TeamId(pub u16);

impl Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "team#{}", self.0)
    }
}

/// A team catalogued by name. The final two characters of the name are a club-scoped team
/// number; everything before them is the club key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Team {
    name: String,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name with its trailing club-scoped team number removed.
    pub fn club_key(&self) -> &str {
        let len = self.name.len();
        if len >= 2 {
            &self.name[..len - 2]
        } else {
            &self.name[..]
        }
    }

    /// Two teams are same-club iff their club keys are equal.
    pub fn is_same_club(&self, other: &Team) -> bool {
        self.club_key() == other.club_key()
    }
}

impl Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An ordered list of teams playing a single round robin amongst themselves. Divisions are
/// disjoint: every team belongs to exactly one division (enforced by the normalizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Division {
    name: String,
    teams: Vec<Team>,
}

impl Division {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            teams: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team_id(&self, name: &str) -> Option<TeamId> {
        self.teams
            .iter()
            .position(|t| t.name() == name)
            .map(|idx| TeamId(idx as u16))
    }

    pub fn team(&self, id: TeamId) -> &Team {
        &self.teams[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Number of unordered pairings in a division of `T` teams: `T·(T−1)/2`.
    pub fn pairing_count(&self) -> usize {
        let t = self.teams.len();
        t * t.saturating_sub(1) / 2
    }

    pub(crate) fn push_team(&mut self, team: Team) {
        self.teams.push(team);
    }

    /// Same-club pairs, in the order the teams were added to the division — C9 and K2 both
    /// depend on this order being stable and deterministic.
    pub fn same_club_pairs(&self) -> Vec<(TeamId, TeamId)> {
        let mut pairs = Vec::new();
        for i in 0..self.teams.len() {
            for j in (i + 1)..self.teams.len() {
                if self.teams[i].is_same_club(&self.teams[j]) {
                    pairs.push((TeamId(i as u16), TeamId(j as u16)));
                }
            }
        }
        pairs
    }
}
