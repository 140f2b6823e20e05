//! Roster: ordered list of teams collected before a draw is created.

use crate::models::team::{Category, Team};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while editing a roster.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum RosterError {
    /// Position is not inside the roster.
    #[error("No team at position {index} (roster has {len} teams)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Teams in insertion order. Position is the only handle used to remove a team.
///
/// Members are not checked for duplicates; validating input is the caller's job.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Roster {
    teams: Vec<Team>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a team to the end.
    pub fn add(&mut self, team: Team) {
        self.teams.push(team);
    }

    /// Remove the team at `index`. The roster is unchanged on error.
    pub fn remove(&mut self, index: usize) -> Result<Team, RosterError> {
        if index >= self.teams.len() {
            return Err(RosterError::IndexOutOfRange {
                index,
                len: self.teams.len(),
            });
        }
        Ok(self.teams.remove(index))
    }

    /// Owned copy of the current teams; later edits do not show through it.
    pub fn snapshot(&self) -> Vec<Team> {
        self.teams.clone()
    }

    pub fn size(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn count_by_category(&self, category: Category) -> usize {
        self.teams.iter().filter(|t| t.category == category).count()
    }
}
