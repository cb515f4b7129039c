//! Authentication controller.
//!
//! Login and signup go through the MediStore API; the storefront itself never
//! sees a password hash. A successful login is the only place a session is
//! established.

use tracing::instrument;

use crate::api::{LoginRequest, LoginResponse, MediStoreClient, RegisterRequest};
use crate::forms::{LoginForm, SignupForm};
use crate::middleware::guard::{HOME_PATH, LOGIN_PATH};
use crate::notifications::Toast;
use crate::services::{DUPLICATE_SUBMISSION, FormOutcome, SubmitGate};
use crate::session::SessionStore;

/// Path of the signup form.
pub const SIGNUP_PATH: &str = "/signup";

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const LOGIN_FAILED: &str = "Login failed. Try again!";
pub const SIGNUP_SUCCESS: &str = "Signup successful! Please login.";
pub const SIGNUP_FAILED: &str = "Signup failed. Try again!";
pub const LOGGED_OUT: &str = "Logged out";

/// Authentication controller for one request.
pub struct AuthService<'a> {
    api: &'a MediStoreClient,
    session: &'a SessionStore,
    gate: &'a SubmitGate,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication controller.
    #[must_use]
    pub const fn new(
        api: &'a MediStoreClient,
        session: &'a SessionStore,
        gate: &'a SubmitGate,
    ) -> Self {
        Self { api, session, gate }
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Validate and submit the login form.
    ///
    /// On success the token and user are stored in the session and the
    /// visitor is sent home.
    #[instrument(skip_all)]
    pub async fn login(&self, form: &LoginForm) -> FormOutcome {
        let request = match form.check() {
            Ok(request) => request,
            Err(errors) => return FormOutcome::Invalid(errors),
        };

        self.gate
            .run(form.form_id.as_deref(), self.submit_login(&request))
            .await
            .unwrap_or_else(|| duplicate(LOGIN_PATH))
    }

    async fn submit_login(&self, request: &LoginRequest) -> FormOutcome {
        match self.api.login(request).await {
            Ok(LoginResponse { token, user }) => {
                if let Err(e) = self.session.set_session(&token, &user) {
                    tracing::error!(error = %e, "Failed to store session after login");
                    return FormOutcome::redirect(LOGIN_PATH, Toast::error(LOGIN_FAILED));
                }
                tracing::info!(user_id = %user.id, role = %user.role, "Login succeeded");
                FormOutcome::redirect(HOME_PATH, Toast::success(LOGIN_SUCCESS))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                FormOutcome::redirect(LOGIN_PATH, Toast::error(e.message_or(LOGIN_FAILED)))
            }
        }
    }

    // =========================================================================
    // Signup
    // =========================================================================

    /// Validate and submit the signup form.
    ///
    /// A successful signup does not sign the visitor in; they are sent to
    /// the login page instead.
    #[instrument(skip_all)]
    pub async fn signup(&self, form: &SignupForm) -> FormOutcome {
        let request = match form.check() {
            Ok(request) => request,
            Err(errors) => return FormOutcome::Invalid(errors),
        };

        self.gate
            .run(form.form_id.as_deref(), self.submit_signup(&request))
            .await
            .unwrap_or_else(|| duplicate(SIGNUP_PATH))
    }

    async fn submit_signup(&self, request: &RegisterRequest) -> FormOutcome {
        match self.api.register(request).await {
            Ok(()) => {
                tracing::info!(role = %request.role, "Signup succeeded");
                FormOutcome::redirect(LOGIN_PATH, Toast::success(SIGNUP_SUCCESS))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Signup failed");
                FormOutcome::redirect(SIGNUP_PATH, Toast::error(e.message_or(SIGNUP_FAILED)))
            }
        }
    }

    // =========================================================================
    // Logout
    // =========================================================================

    /// Forget the token and cached user. The caller redirects home.
    pub fn logout(&self) -> Toast {
        self.session.clear_session();
        Toast::success(LOGGED_OUT)
    }
}

fn duplicate(back_to: &'static str) -> FormOutcome {
    FormOutcome::redirect(back_to, Toast::info(DUPLICATE_SUBMISSION))
}
