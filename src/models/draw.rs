//! Draw type, parameters and the configuration derived from them.

use crate::models::team::Team;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of draw the backend knows how to build.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum DrawType {
    /// Every team plays a fixed number of matches against varying opponents.
    #[default]
    Rodeo,
}

impl DrawType {
    pub fn as_str(self) -> &'static str {
        match self {
            DrawType::Rodeo => "Rodeo",
        }
    }
}

/// Inputs to the feasibility search. Recomputed on every evaluation, never stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DrawParameters {
    pub team_count: usize,
    pub total_rounds: u32,
    pub available_courts: u32,
}

/// A schedule shape that fits the courts: totals only, no pairings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DrawConfiguration {
    pub total_matches: u64,
    /// Average matches running at once; may be fractional.
    pub matches_per_turn: f64,
    pub matches_per_team: u32,
}

impl DrawConfiguration {
    /// Matches per turn rounded up, the number of courts actually needed at peak.
    pub fn matches_per_turn_display(&self) -> u64 {
        self.matches_per_turn.ceil() as u64
    }

    pub fn summary(&self) -> String {
        format!(
            "{} matches per team and at most {} matches per turn.",
            self.matches_per_team,
            self.matches_per_turn_display()
        )
    }
}

/// Outcome of a feasibility evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Feasibility {
    Feasible(DrawConfiguration),
    Infeasible,
}

impl Feasibility {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Feasibility::Feasible(_))
    }

    pub fn configuration(&self) -> Option<&DrawConfiguration> {
        match self {
            Feasibility::Feasible(config) => Some(config),
            Feasibility::Infeasible => None,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Feasibility::Feasible(config) => config.summary(),
            Feasibility::Infeasible => "Configuration is not valid".to_string(),
        }
    }
}

/// Everything the backend needs to build and store a draw.
///
/// The derived configuration is not part of it; the backend recomputes it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DrawRequest {
    pub draw_type: DrawType,
    pub date_start: DateTime<Utc>,
    pub teams: Vec<Team>,
    pub total_rounds: u32,
    pub available_courts: u32,
}
