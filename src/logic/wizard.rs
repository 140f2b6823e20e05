//! Draw wizard: roster building, parameter entry, feasibility display and submission.

use crate::client::{BackendError, DrawBackend};
use crate::logic::feasibility::find_draw_configuration;
use crate::logic::session::{require_ready, SessionError};
use crate::models::{
    DrawParameters, DrawRequest, DrawType, Feasibility, Roster, RosterError, SessionState, Team,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Errors returned by wizard operations. None of them changes the roster.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum WizardError {
    /// Session is not ready; carries the gate's reason unchanged.
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    /// Current rounds/courts do not admit a schedule for this roster.
    #[error("Configuration is not valid")]
    Infeasible,
    #[error("Tournament date is required")]
    MissingDate,
    /// A submission is outstanding; wait for it to resolve.
    #[error("A submission is already in progress")]
    SubmissionInFlight,
    /// The draw was created; start a new wizard for another one.
    #[error("Draw already created")]
    Completed,
}

/// Message shown to the operator once a submission resolves.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    fn created() -> Self {
        Self {
            title: "Tournament creation success".to_string(),
            description: "Tournament created and saved successfully".to_string(),
        }
    }

    fn failed() -> Self {
        Self {
            title: "Tournament creation failed".to_string(),
            description: "Try again later".to_string(),
        }
    }
}

/// Binary result of a submission.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubmissionOutcome {
    /// Backend stored the draw. The roster has been discarded.
    Created(Notice),
    /// Backend refused or was unreachable. The roster is kept for a retry.
    Failed { notice: Notice, error: BackendError },
}

impl SubmissionOutcome {
    pub fn notice(&self) -> &Notice {
        match self {
            SubmissionOutcome::Created(notice) => notice,
            SubmissionOutcome::Failed { notice, .. } => notice,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, SubmissionOutcome::Created(_))
    }
}

/// A submission that has been validated and marked in flight, ready to send.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSubmission {
    pub token: String,
    pub request: DrawRequest,
}

/// State of one draw-creation session.
///
/// Owns its roster; nothing is shared with other wizards and nothing outlives it.
#[derive(Clone, Debug)]
pub struct DrawWizard {
    roster: Roster,
    draw_type: DrawType,
    date_start: Option<DateTime<Utc>>,
    total_rounds: u32,
    available_courts: u32,
    in_flight: bool,
    completed: bool,
}

impl DrawWizard {
    /// Open a wizard. Refused unless the session is ready.
    pub fn start(session: &SessionState) -> Result<Self, WizardError> {
        ensure_ready(session)?;
        Ok(Self {
            roster: Roster::new(),
            draw_type: DrawType::default(),
            date_start: None,
            total_rounds: 0,
            available_courts: 0,
            in_flight: false,
            completed: false,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn draw_type(&self) -> DrawType {
        self.draw_type
    }

    pub fn date_start(&self) -> Option<DateTime<Utc>> {
        self.date_start
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Append a team. No upper bound on roster size.
    pub fn add_team(&mut self, team: Team) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.roster.add(team);
        Ok(())
    }

    pub fn remove_team(&mut self, index: usize) -> Result<Team, WizardError> {
        self.ensure_editable()?;
        Ok(self.roster.remove(index)?)
    }

    pub fn set_draw_type(&mut self, draw_type: DrawType) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draw_type = draw_type;
        Ok(())
    }

    pub fn set_date_start(&mut self, date_start: DateTime<Utc>) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.date_start = Some(date_start);
        Ok(())
    }

    /// Record new rounds/courts and return the feasibility for the live roster.
    pub fn set_parameters(
        &mut self,
        total_rounds: u32,
        available_courts: u32,
    ) -> Result<Feasibility, WizardError> {
        self.ensure_editable()?;
        self.total_rounds = total_rounds;
        self.available_courts = available_courts;
        Ok(self.feasibility())
    }

    pub fn parameters(&self) -> DrawParameters {
        DrawParameters {
            team_count: self.roster.size(),
            total_rounds: self.total_rounds,
            available_courts: self.available_courts,
        }
    }

    /// Feasibility for the current roster size and parameters, recomputed on every call.
    pub fn feasibility(&self) -> Feasibility {
        find_draw_configuration(self.parameters())
    }

    /// Validate and mark a submission in flight.
    ///
    /// Checks, in order: not completed, nothing outstanding, session ready, date set,
    /// configuration feasible. On error nothing is marked.
    pub fn begin_submission(
        &mut self,
        session: &SessionState,
    ) -> Result<PendingSubmission, WizardError> {
        self.ensure_editable()?;
        let token = ensure_ready(session)?.to_string();
        let date_start = self.date_start.ok_or(WizardError::MissingDate)?;
        if !self.feasibility().is_feasible() {
            return Err(WizardError::Infeasible);
        }

        self.in_flight = true;
        Ok(PendingSubmission {
            token,
            request: DrawRequest {
                draw_type: self.draw_type,
                date_start,
                teams: self.roster.snapshot(),
                total_rounds: self.total_rounds,
                available_courts: self.available_courts,
            },
        })
    }

    /// Apply the backend's answer to a submission started with [`Self::begin_submission`].
    pub fn finish_submission(&mut self, result: Result<(), BackendError>) -> SubmissionOutcome {
        self.in_flight = false;
        match result {
            Ok(()) => {
                log::info!(
                    "Draw created with {} teams, wizard closed",
                    self.roster.size()
                );
                self.roster = Roster::new();
                self.completed = true;
                SubmissionOutcome::Created(Notice::created())
            }
            Err(error) => {
                log::warn!("Draw creation failed: {error}");
                SubmissionOutcome::Failed {
                    notice: Notice::failed(),
                    error,
                }
            }
        }
    }

    /// Validate, send and apply the outcome in one call.
    pub async fn submit<B>(
        &mut self,
        session: &SessionState,
        backend: &B,
    ) -> Result<SubmissionOutcome, WizardError>
    where
        B: DrawBackend + ?Sized,
    {
        let pending = self.begin_submission(session)?;
        log::info!(
            "Submitting {} draw: {} teams, {} rounds, {} courts",
            pending.request.draw_type.as_str(),
            pending.request.teams.len(),
            pending.request.total_rounds,
            pending.request.available_courts
        );
        let result = backend.create_draw(&pending.token, &pending.request).await;
        Ok(self.finish_submission(result))
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.completed {
            return Err(WizardError::Completed);
        }
        if self.in_flight {
            return Err(WizardError::SubmissionInFlight);
        }
        Ok(())
    }
}

/// Send `pending` on its own task and hand the backend's answer to `finish`.
///
/// The task runs to completion even when the returned handle is dropped, so a wizard
/// marked in flight by [`DrawWizard::begin_submission`] is always released by `finish`.
pub fn spawn_submission<B, F, R>(
    backend: Arc<B>,
    pending: PendingSubmission,
    finish: F,
) -> JoinHandle<R>
where
    B: DrawBackend + ?Sized + 'static,
    F: FnOnce(Result<(), BackendError>) -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::spawn(async move {
        let result = backend.create_draw(&pending.token, &pending.request).await;
        finish(result)
    })
}

fn ensure_ready(session: &SessionState) -> Result<&str, WizardError> {
    Ok(require_ready(session)?)
}
