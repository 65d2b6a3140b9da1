// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Contratos ---
        handlers::contracts::list_contracts,
        handlers::contracts::create_contract,
        handlers::contracts::update_contract_status,
        handlers::contracts::apply_cpi_adjustment,
        handlers::contracts::renew_contract,

        // --- Faturas ---
        handlers::invoices::generate_invoices,
        handlers::invoices::list_invoices,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,

            // --- Contratos ---
            models::contract::Contract,
            models::contract::ContractView,
            models::contract::RenewalStatus,
            models::contract::CreateContractPayload,
            models::contract::UpdateContractStatusPayload,
            models::contract::CpiAdjustmentPayload,
            models::contract::RenewContractPayload,

            // --- Faturas ---
            models::invoice::InvoiceKind,
            models::invoice::InvoiceStatus,
            models::invoice::Invoice,
            models::invoice::GenerationReport,
        )
    ),
    tags(
        (name = "Contratos", description = "Contratos de aluguel, reajuste do IPC e renovação"),
        (name = "Faturas", description = "Geração mensal e consulta de faturas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
