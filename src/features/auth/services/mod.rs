mod auth_service;
mod identity_provider;
mod token_service;

pub use auth_service::AuthService;
pub use identity_provider::{IdentityProvider, LocalIdentityProvider};
pub use token_service::TokenService;
