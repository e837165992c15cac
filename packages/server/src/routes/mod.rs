//! HTTP route tree. All endpoints live under a version prefix so the
//! API surface can evolve without breaking existing clients.

mod v1;

use utoipa_axum::router::OpenApiRouter;

use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1::routes())
}
