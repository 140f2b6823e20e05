//! Padel draw organizer: library with models, draw logic and the backend client.

pub mod client;
pub mod config;
pub mod logic;
pub mod models;

pub use client::{BackendError, DrawBackend, HttpBackend};
pub use config::{ConfigError, WebConfig};
pub use logic::{
    evaluate, find_draw_configuration, require_ready, spawn_submission, DrawWizard, Notice,
    PendingSubmission, SessionError, SessionGate, SubmissionOutcome, WizardError,
};
pub use models::{
    Category, CategoryError, DrawConfiguration, DrawParameters, DrawRequest, DrawType,
    Feasibility, MatchRecord, MatchStatus, Person, Roster, RosterError, RoundRecord,
    SessionFailure, SessionGrant, SessionState, Team, TournamentListing, TournamentRecord,
};
