// src/handlers/invoices.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Owner, RequireRole},
    },
    models::invoice::{GenerationReport, Invoice, InvoiceFilter},
};

// POST /api/invoices/generate
#[utoipa::path(
    post,
    path = "/api/invoices/generate",
    tag = "Faturas",
    responses(
        (status = 200, description = "Faturas de aluguel do mês geradas", body = GenerationReport),
        (status = 401, description = "Token ausente ou inválido"),
        (status = 403, description = "Apenas o proprietário"),
        (status = 500, description = "Falha na geração"),
        (status = 504, description = "Geração excedeu o tempo limite")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _role: RequireRole<Owner>,
) -> impl IntoResponse {
    tracing::info!("Geração manual de faturas solicitada por {}", user.id());

    match app_state.invoice_generator.generate_monthly_invoices().await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": app_state.i18n_store.get(&locale.0, "invoices_generated"),
                "report": report,
            })),
        ),
        Err(e) => {
            let status = match &e {
                AppError::GenerationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let api_error = e.to_api_error(&locale, &app_state.i18n_store);
            (
                status,
                Json(json!({
                    "success": false,
                    "error": api_error.error,
                })),
            )
        }
    }
}

// GET /api/invoices
#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Faturas",
    params(InvoiceFilter),
    responses(
        (status = 200, description = "Faturas encontradas", body = Vec<Invoice>),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<InvoiceFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let invoices = app_state
        .invoice_service
        .list_invoices(&filter)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(invoices)))
}
