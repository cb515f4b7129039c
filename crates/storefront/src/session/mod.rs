//! Visitor session: token and cached user.
//!
//! - [`SessionStorage`] is the single storage adapter. The HTTP layer backs it
//!   with a request-scoped [`MemoryStorage`] snapshot of the tower-sessions
//!   record (see `middleware::session`).
//! - [`SessionStore`] is the context object handlers receive. It is the only
//!   code that knows the `token`/`user` keys.
//! - [`SessionEvents`] carries typed [`SessionEvent`]s to subscribers.

pub mod events;
pub mod storage;
pub mod store;

pub use events::{SessionEvent, SessionEvents, log_session_events};
pub use storage::{Change, MemoryStorage, SessionStorage};
pub use store::{SessionError, SessionStore, keys};
