// src/handlers/contracts.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Owner, RequireRole},
    },
    models::contract::{
        Contract, ContractView, CpiAdjustmentPayload, CreateContractPayload,
        RenewContractPayload, UpdateContractStatusPayload,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContractListQuery {
    /// true = só ativos, false = só inativos, ausente = todos
    pub active: Option<bool>,
}

// GET /api/contracts
#[utoipa::path(
    get,
    path = "/api/contracts",
    tag = "Contratos",
    params(ContractListQuery),
    responses(
        (status = 200, description = "Contratos com status de renovação", body = Vec<ContractView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contracts(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ContractListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let contracts = app_state
        .contract_service
        .list_contracts(query.active)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(contracts)))
}

// POST /api/contracts
#[utoipa::path(
    post,
    path = "/api/contracts",
    tag = "Contratos",
    request_body = CreateContractPayload,
    responses(
        (status = 201, description = "Contrato registrado", body = Contract),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "O imóvel já tem contrato ativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _role: RequireRole<Owner>,
    Json(payload): Json<CreateContractPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let contract = app_state
        .contract_service
        .create_contract(payload, user.id())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(contract)))
}

// PATCH /api/contracts/{id}/status
#[utoipa::path(
    patch,
    path = "/api/contracts/{id}/status",
    tag = "Contratos",
    request_body = UpdateContractStatusPayload,
    params(("id" = Uuid, Path, description = "ID do contrato")),
    responses(
        (status = 200, description = "Status atualizado", body = Contract),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contract_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _role: RequireRole<Owner>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContractStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let contract = app_state
        .contract_service
        .set_active(id, payload.active, user.id())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(contract)))
}

// POST /api/contracts/{id}/cpi-adjustment
#[utoipa::path(
    post,
    path = "/api/contracts/{id}/cpi-adjustment",
    tag = "Contratos",
    request_body = CpiAdjustmentPayload,
    params(("id" = Uuid, Path, description = "ID do contrato")),
    responses(
        (status = 200, description = "Reajuste do IPC aplicado", body = Contract),
        (status = 400, description = "Percentual inválido"),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn apply_cpi_adjustment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _role: RequireRole<Owner>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CpiAdjustmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let contract = app_state
        .contract_service
        .apply_cpi_adjustment(id, payload.percentage, user.id())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(contract)))
}

// POST /api/contracts/{id}/renew
#[utoipa::path(
    post,
    path = "/api/contracts/{id}/renew",
    tag = "Contratos",
    request_body = RenewContractPayload,
    params(("id" = Uuid, Path, description = "ID do contrato")),
    responses(
        (status = 200, description = "Contrato renovado", body = Contract),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn renew_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _role: RequireRole<Owner>,
    Path(id): Path<Uuid>,
    payload: Option<Json<RenewContractPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    // Corpo opcional: sem corpo, avança a renovação atual em um ano
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let contract = app_state
        .contract_service
        .renew(id, payload.renewal_date, user.id())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(contract)))
}
