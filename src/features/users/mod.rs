//! Profiles: the role-carrying record attached 1:1 to each identity.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/profiles/me` | Caller's own profile |
//! | GET | `/api/profiles` | List profiles (admin) |
//! | POST | `/api/profiles` | Attach a profile to an identity (admin) |
//! | GET | `/api/profiles/{id}` | Own profile, or any for admins |
//! | PATCH | `/api/profiles/{id}` | Update role/phone/location (admin) |
//! | DELETE | `/api/profiles/{id}` | Delete a profile (admin) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::UserProfileService;
