// src/models/contract.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::money::{deserialize_amount, MAX_AMOUNT};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "LL1bbn5RyJ65VxYmjCWg")]
    pub property_id: String,

    #[schema(example = "Bajo Izquierda")]
    pub property_name: String,

    pub tenant_ids: Vec<String>,

    // Opcionais: contratos antigos podem ter sido gravados sem preço ou data
    #[schema(example = "650.00")]
    pub monthly_rate: Option<Decimal>,

    #[schema(value_type = Option<String>, format = Date, example = "2024-03-15")]
    pub start_date: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date, example = "2025-03-14")]
    pub renewal_date: Option<NaiveDate>,

    // O reajuste do IPC já foi aplicado depois da última renovação?
    pub cpi_adjusted: bool,

    pub active: bool,

    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RenewalStatus {
    Current,     // Vigente
    CpiPending,  // Pendente de reajuste do IPC
    RenewalDue,  // Pendente de renovação
}

impl Contract {
    pub fn renewal_status(&self, today: NaiveDate) -> RenewalStatus {
        match self.renewal_date {
            None => RenewalStatus::Current,
            Some(date) if date <= today => RenewalStatus::RenewalDue,
            Some(_) if !self.cpi_adjusted => RenewalStatus::CpiPending,
            Some(_) => RenewalStatus::Current,
        }
    }
}

// Contrato + status calculado, para a listagem
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractView {
    #[serde(flatten)]
    pub contract: Contract,
    pub renewal_status: RenewalStatus,
}

fn validate_monthly_rate(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("range")
            .with_message("O valor mensal não pode ser negativo.".into()));
    }
    if *value > MAX_AMOUNT {
        return Err(ValidationError::new("range")
            .with_message("O valor mensal excede 9.999.999.999,99.".into()));
    }
    Ok(())
}

// Dados para registro de um novo contrato
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractPayload {
    #[validate(length(min = 1, message = "O imóvel é obrigatório."))]
    #[schema(example = "LL1bbn5RyJ65VxYmjCWg")]
    pub property_id: String,

    #[validate(length(min = 1, message = "O nome do imóvel é obrigatório."))]
    #[schema(example = "Bajo Izquierda")]
    pub property_name: String,

    #[serde(default)]
    pub tenant_ids: Vec<String>,

    // Aceita 650, "650.00" ou "650,00"
    #[serde(deserialize_with = "deserialize_amount")]
    #[validate(custom(function = "validate_monthly_rate"))]
    #[schema(value_type = String, example = "650,00")]
    pub monthly_rate: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-03-15")]
    pub start_date: NaiveDate,

    // Se ausente: início + 1 ano - 1 dia
    #[schema(value_type = Option<String>, format = Date, example = "2025-03-14")]
    pub renewal_date: Option<NaiveDate>,

    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContractStatusPayload {
    pub active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CpiAdjustmentPayload {
    // Percentual do IPC: 3.2 ou "3,2"
    #[serde(deserialize_with = "deserialize_amount")]
    #[schema(value_type = String, example = "3,2")]
    pub percentage: Decimal,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenewContractPayload {
    // Se ausente: renovação atual + 1 ano
    #[schema(value_type = Option<String>, format = Date, example = "2026-03-14")]
    pub renewal_date: Option<NaiveDate>,
}

// Dados para inserir um contrato (já validados pelo serviço)
#[derive(Debug, Clone)]
pub struct NewContract {
    pub property_id: String,
    pub property_name: String,
    pub tenant_ids: Vec<String>,
    pub monthly_rate: Decimal,
    pub start_date: NaiveDate,
    pub renewal_date: NaiveDate,
    pub active: bool,
    pub created_by: String,
}
