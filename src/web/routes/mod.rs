use crate::{web::{doc::ApiDoc, AppState}, Config};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod courses;

pub fn build_app<S: Send + Sync + Clone + 'static>(state: AppState, config: &'static Config) -> Router<S> {
    let mut router = Router::new()
        .merge(courses::routes(state.clone()))
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router
            .merge(
                SwaggerUi::new("/api/docs")
                    .url("/api-doc/openapi.json", openapi),
            );
    }

    router
}
