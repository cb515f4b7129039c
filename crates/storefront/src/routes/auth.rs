//! Authentication route handlers.
//!
//! Validation failures re-render the form (422) with per-field messages and
//! whatever non-secret values the visitor typed. A body that is not a form at
//! all is a 400. Everything else ends in a redirect carrying a notification.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::error::{AppError, clear_sentry_user};
use crate::forms::{FieldErrors, LoginForm, SignupForm};
use crate::middleware::guard::HOME_PATH;
use crate::routes::{PageChrome, new_form_id, redirect_with};
use crate::services::{AuthService, FormOutcome};
use crate::session::SessionStore;
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub chrome: PageChrome,
    pub form_id: String,
    pub email: String,
    pub errors: FieldErrors,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub chrome: PageChrome,
    pub form_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub errors: FieldErrors,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(store: SessionStore, session: Session) -> impl IntoResponse {
    LoginTemplate {
        chrome: PageChrome::load(&store, &session).await,
        form_id: new_form_id(),
        email: String::new(),
        errors: FieldErrors::new(),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    store: SessionStore,
    session: Session,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    let outcome = AuthService::new(state.api(), &store, state.submit_gate())
        .login(&form)
        .await;

    Ok(match outcome {
        FormOutcome::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            LoginTemplate {
                chrome: PageChrome::load(&store, &session).await,
                form_id: new_form_id(),
                email: form.email,
                errors,
            },
        )
            .into_response(),
        FormOutcome::Redirect { to, toast } => redirect_with(&session, to, toast).await,
    })
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(store: SessionStore, session: Session) -> impl IntoResponse {
    SignupTemplate {
        chrome: PageChrome::load(&store, &session).await,
        form_id: new_form_id(),
        name: String::new(),
        email: String::new(),
        role: String::new(),
        errors: FieldErrors::new(),
    }
}

/// Handle signup form submission.
pub async fn signup(
    State(state): State<AppState>,
    store: SessionStore,
    session: Session,
    form: Result<Form<SignupForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    let outcome = AuthService::new(state.api(), &store, state.submit_gate())
        .signup(&form)
        .await;

    Ok(match outcome {
        FormOutcome::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            SignupTemplate {
                chrome: PageChrome::load(&store, &session).await,
                form_id: new_form_id(),
                name: form.name,
                email: form.email,
                role: form.role,
                errors,
            },
        )
            .into_response(),
        FormOutcome::Redirect { to, toast } => redirect_with(&session, to, toast).await,
    })
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
pub async fn logout(
    State(state): State<AppState>,
    store: SessionStore,
    session: Session,
) -> Response {
    let toast = AuthService::new(state.api(), &store, state.submit_gate()).logout();
    clear_sentry_user();

    redirect_with(&session, HOME_PATH, toast).await
}
