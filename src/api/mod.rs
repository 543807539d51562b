/// API routes and handlers
pub mod agents;
pub mod documents;
pub mod middleware;
pub mod transcriptions;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(agents::routes())
        .merge(transcriptions::routes())
        .merge(documents::routes())
}
