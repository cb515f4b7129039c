//! Form controllers for storefront.
//!
//! # Services
//!
//! - `auth` - Login, signup, and logout against the MediStore API
//! - `profile` - Profile loading, profile updates, and order reviews
//! - `submit_gate` - Duplicate-submission prevention for every form
//!
//! Controllers validate first, submit second, and report the result as a
//! [`FormOutcome`]. They never return errors: network and server failures
//! become notifications.

pub mod auth;
pub mod profile;
pub mod submit_gate;

pub use auth::AuthService;
pub use profile::{ProfileData, ProfileService};
pub use submit_gate::SubmitGate;

use crate::forms::FieldErrors;
use crate::notifications::Toast;

/// Shown when the same form is submitted again while the first is in flight.
pub const DUPLICATE_SUBMISSION: &str = "Your request is already being processed";

/// What a route should do after a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Validation failed; re-render the form with these errors.
    Invalid(FieldErrors),
    /// Queue `toast` and redirect to `to`.
    Redirect { to: &'static str, toast: Toast },
}

impl FormOutcome {
    #[must_use]
    pub const fn redirect(to: &'static str, toast: Toast) -> Self {
        Self::Redirect { to, toast }
    }
}
