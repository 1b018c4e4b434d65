//! Sessions: per-visitor state, turn dispatch and the HTTP surface.

pub mod dispatcher;
pub mod model;
pub mod routes;
pub mod store;

pub use dispatcher::{SessionDispatcher, SessionStatus, TurnOutcome};
pub use model::{OFFLINE_MARKER, Reply, ReplyMode, Turn};
pub use routes::chat_routes;
pub use store::{InMemorySessionStore, SessionHandle, SessionStore, spawn_session_sweeper};
