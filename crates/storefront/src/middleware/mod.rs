//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//! 5. Session context (expose the session as a `SessionStore`, user on span)
//! 6. Route guards (per router, see `routes`)

pub mod guard;
pub mod request_id;
pub mod session;

pub use guard::{Access, RouteGuard, SignedIn, enforce};
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, session_context_middleware};
