//! Interview sessions: time box, per-persona patience, and the pinned notes board.

pub mod store;
pub mod types;

pub use store::SessionStore;
pub use types::{Bucket, Notes, Session, SessionId, SessionSnapshot};
