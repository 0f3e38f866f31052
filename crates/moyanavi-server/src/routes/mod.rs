// Export route modules
pub mod page;
pub mod reply;

use crate::state::AppState;
use axum::Router;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(page::routes())
        .merge(reply::routes(state))
}
