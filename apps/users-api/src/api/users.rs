use axum::Router;
use domain_users::{MongoUserRepository, UserService, handlers};

pub fn router(repository: MongoUserRepository) -> Router {
    let service = UserService::new(repository);
    handlers::router(service)
}
