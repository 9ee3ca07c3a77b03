use axum::Router;

pub mod auth;
pub mod permissions;
pub mod roles;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
///
/// `/auth/login` is public and mounted separately, so the auth routes carry
/// full paths and are merged instead of nested.
pub fn router() -> Router {
    Router::new()
        .merge(auth::router())
        .nest("/users", users::router())
        .nest("/roles", roles::router())
        .nest("/permissions", permissions::router())
}
