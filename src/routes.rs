// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    let contract_routes = Router::new()
        .route(
            "/",
            get(handlers::contracts::list_contracts).post(handlers::contracts::create_contract),
        )
        .route("/{id}/status", patch(handlers::contracts::update_contract_status))
        .route("/{id}/cpi-adjustment", post(handlers::contracts::apply_cpi_adjustment))
        .route("/{id}/renew", post(handlers::contracts::renew_contract))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let invoice_routes = Router::new()
        .route("/", get(handlers::invoices::list_invoices))
        .route("/generate", post(handlers::invoices::generate_invoices))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/contracts", contract_routes)
        .nest("/api/invoices", invoice_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
