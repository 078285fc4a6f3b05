pub mod dto;
pub mod handlers;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use services::DirectoryService;

pub fn router() -> Router<AppState> {
    handlers::teammate_routes()
}
