//! Draw creation logic: session gate, feasibility search, wizard.

mod feasibility;
mod session;
mod wizard;

pub use feasibility::{evaluate, find_draw_configuration};
pub use session::{require_ready, SessionError, SessionGate};
pub use wizard::{
    spawn_submission, DrawWizard, Notice, PendingSubmission, SubmissionOutcome, WizardError,
};
