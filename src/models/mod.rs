//! Data structures for draw creation: teams, roster, draw parameters, session, tournament records.

mod draw;
mod roster;
mod session;
mod team;
mod tournament;

pub use draw::{DrawConfiguration, DrawParameters, DrawRequest, DrawType, Feasibility};
pub use roster::{Roster, RosterError};
pub use session::{SessionFailure, SessionGrant, SessionState};
pub use team::{Category, CategoryError, Person, Team};
pub use tournament::{MatchRecord, MatchStatus, RoundRecord, TournamentListing, TournamentRecord};
