//! Route guard and the signed-in user extractor.
//!
//! The guard is re-evaluated on every request against whatever the session
//! holds at that moment. A decision is never cached, so logging in or out
//! anywhere takes effect on the very next request.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use medistore_core::{Role, User};

use crate::session::SessionStore;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Where visitors with the wrong role are sent.
pub const HOME_PATH: &str = "/";

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Render the wrapped content for this user.
    Granted(User),
    /// No session.
    RedirectToLogin,
    /// Signed in, but not with the required role.
    RedirectToHome,
}

/// Gate for protected pages, optionally restricted to one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteGuard {
    required_role: Option<Role>,
}

impl RouteGuard {
    /// Any signed-in user may pass.
    #[must_use]
    pub const fn authenticated() -> Self {
        Self {
            required_role: None,
        }
    }

    /// Only users holding `role` may pass.
    #[must_use]
    pub const fn role(role: Role) -> Self {
        Self {
            required_role: Some(role),
        }
    }

    /// The role this guard requires, if any.
    #[must_use]
    pub const fn required_role(&self) -> Option<Role> {
        self.required_role
    }

    /// Decide what to do with the current session.
    #[must_use]
    pub fn check(&self, session: &SessionStore) -> Access {
        let Some(user) = session.user() else {
            return Access::RedirectToLogin;
        };
        match self.required_role {
            Some(role) if !user.has_role(role) => Access::RedirectToHome,
            _ => Access::Granted(user),
        }
    }
}

/// Middleware enforcing a [`RouteGuard`].
///
/// Denied requests get a single redirect with an empty body and never reach
/// the wrapped handler. Granted requests carry the [`User`] in their
/// extensions for [`SignedIn`].
///
/// ```rust,ignore
/// Router::new()
///     .route("/admin", get(dashboard::admin))
///     .route_layer(from_fn_with_state(RouteGuard::role(Role::Admin), enforce));
/// ```
pub async fn enforce(
    State(guard): State<RouteGuard>,
    session: SessionStore,
    mut request: Request,
    next: Next,
) -> Response {
    match guard.check(&session) {
        Access::Granted(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Access::RedirectToLogin => {
            tracing::debug!(path = %request.uri().path(), "No session, redirecting to login");
            Redirect::to(LOGIN_PATH).into_response()
        }
        Access::RedirectToHome => {
            tracing::debug!(
                path = %request.uri().path(),
                required = ?guard.required_role(),
                "Wrong role, redirecting home"
            );
            Redirect::to(HOME_PATH).into_response()
        }
    }
}

/// Extractor for the user admitted by [`enforce`].
///
/// Falls back to reading the session directly, so handlers outside a guarded
/// router still behave: no user means a redirect to the login page.
pub struct SignedIn(pub User);

impl<S> FromRequestParts<S> for SignedIn
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<User>() {
            return Ok(Self(user.clone()));
        }

        let Ok(session) = SessionStore::from_request_parts(parts, state).await;
        session
            .user()
            .map(Self)
            .ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}
