mod identity_repository;
mod session_repository;

pub use identity_repository::{IdentityRepository, PgIdentityRepository};
pub use session_repository::{PgSessionRepository, SessionRepository};
