//! Tournament records as stored and served by the backend (read-only here).

use crate::models::team::Team;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Missing and `null` lists both decode as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Progress of a generated match. Integer code on the wire.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Ongoing,
    Completed,
}

impl TryFrom<u8> for MatchStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(MatchStatus::Scheduled),
            1 => Ok(MatchStatus::Ongoing),
            2 => Ok(MatchStatus::Completed),
            other => Err(format!("invalid match status: {other}")),
        }
    }
}

impl From<MatchStatus> for u8 {
    fn from(status: MatchStatus) -> Self {
        match status {
            MatchStatus::Scheduled => 0,
            MatchStatus::Ongoing => 1,
            MatchStatus::Completed => 2,
        }
    }
}

/// One match of a generated round, assigned to a court.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub team_a: Team,
    pub team_b: Team,
    #[serde(default)]
    pub match_status: MatchStatus,
    pub court_id: u32,
}

/// Matches played at the same time.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub matches: Vec<MatchRecord>,
}

/// A tournament previously created through the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentRecord {
    pub name: String,
    pub date: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub teams: Vec<Team>,
    /// Empty until the backend has generated pairings.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rounds: Vec<RoundRecord>,
}

impl TournamentRecord {
    /// File name suggested for the downloadable artifact.
    pub fn artifact_name(&self) -> String {
        format!("{}_{}.pdf", self.date.date_naive(), self.name)
    }

    pub fn total_matches(&self) -> usize {
        self.rounds.iter().map(|r| r.matches.len()).sum()
    }
}

/// Tournaments created on one date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentListing {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tournaments: Vec<TournamentRecord>,
}
