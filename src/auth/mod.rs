use crate::state::AppState;
use axum::Router;

pub mod claims;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod identity;
pub mod services;

pub use extractors::AuthUser;
pub use identity::{GoTrueClient, IdentityProvider};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
