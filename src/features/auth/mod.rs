//! Local accounts and sessions.
//!
//! Identities live in the `identities` table with argon2id password hashes.
//! Sessions are HS256 access/refresh token pairs sharing a session id; logout
//! records that id in `revoked_sessions`.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/auth/register` | Create identity + profile |
//! | POST | `/api/auth/login` | Verify credentials, reconcile profile, issue tokens |
//! | POST | `/api/auth/logout` | Revoke the current session |
//! | POST | `/api/auth/refresh` | New token pair for the same session |
//! | GET | `/api/auth/me` | Current identity and role |

mod password;
mod validator;

pub mod dtos;
pub mod handlers;
pub mod model;
pub mod repositories;
pub mod routes;
pub mod services;

pub use password::CredentialHasher;
pub use services::{AuthService, IdentityProvider, LocalIdentityProvider, TokenService};
pub use validator::JwtValidator;
