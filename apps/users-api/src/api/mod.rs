use axum::Router;
use domain_users::MongoUserRepository;

pub mod health;
pub mod users;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
pub fn routes(users: MongoUserRepository) -> Router {
    Router::new().nest("/users", users::router(users))
}

/// Creates a router with the /ready endpoint that pings MongoDB.
///
/// This router has state applied and can be merged with the stateless app router
/// from `create_router`.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
