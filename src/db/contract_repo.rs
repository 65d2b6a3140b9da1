// src/db/contract_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::ContractStore,
    models::contract::{Contract, NewContract},
};

const CONTRACT_COLUMNS: &str = r#"
    id, property_id, property_name, tenant_ids,
    monthly_rate, start_date, renewal_date, cpi_adjusted, active,
    created_at, created_by, updated_at, updated_by
"#;

// Violação do índice único parcial (imóvel, ativo): outro contrato ativo já existe
fn map_active_conflict(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::Conflict("O imóvel já tem um contrato ativo".to_string());
        }
    }
    AppError::StoreUnavailable(e)
}

// O repositório de contratos, responsável pela tabela 'contracts'
#[derive(Clone)]
pub struct ContractRepository {
    pool: PgPool,
}

impl ContractRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContractStore for ContractRepository {
    async fn active_contracts(&self) -> Result<Vec<Contract>, AppError> {
        self.list_contracts(Some(true)).await
    }

    async fn list_contracts(&self, active: Option<bool>) -> Result<Vec<Contract>, AppError> {
        let sql = format!(
            "SELECT {CONTRACT_COLUMNS} FROM contracts
             WHERE ($1::boolean IS NULL OR active = $1)
             ORDER BY property_name ASC, start_date ASC"
        );
        let contracts = sqlx::query_as::<_, Contract>(&sql)
            .bind(active)
            .fetch_all(&self.pool)
            .await?;

        Ok(contracts)
    }

    async fn get_contract(&self, id: Uuid) -> Result<Option<Contract>, AppError> {
        let sql = format!("SELECT {CONTRACT_COLUMNS} FROM contracts WHERE id = $1");
        let contract = sqlx::query_as::<_, Contract>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(contract)
    }

    async fn insert_contract(&self, new: NewContract) -> Result<Contract, AppError> {
        // Na criação, updated_* espelha created_*
        let sql = format!(
            r#"
            INSERT INTO contracts (
                property_id, property_name, tenant_ids,
                monthly_rate, start_date, renewal_date, active,
                created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {CONTRACT_COLUMNS}
            "#
        );
        let contract = sqlx::query_as::<_, Contract>(&sql)
            .bind(&new.property_id)
            .bind(&new.property_name)
            .bind(&new.tenant_ids)
            .bind(new.monthly_rate)
            .bind(new.start_date)
            .bind(new.renewal_date)
            .bind(new.active)
            .bind(&new.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(map_active_conflict)?;

        Ok(contract)
    }

    async fn set_active(
        &self,
        id: Uuid,
        active: bool,
        updated_by: &str,
    ) -> Result<Option<Contract>, AppError> {
        let sql = format!(
            "UPDATE contracts SET active = $2, updated_at = now(), updated_by = $3
             WHERE id = $1
             RETURNING {CONTRACT_COLUMNS}"
        );
        let contract = sqlx::query_as::<_, Contract>(&sql)
            .bind(id)
            .bind(active)
            .bind(updated_by)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_active_conflict)?;

        Ok(contract)
    }

    async fn update_rate(
        &self,
        id: Uuid,
        monthly_rate: Decimal,
        updated_by: &str,
    ) -> Result<Option<Contract>, AppError> {
        let sql = format!(
            "UPDATE contracts
             SET monthly_rate = $2, cpi_adjusted = TRUE, updated_at = now(), updated_by = $3
             WHERE id = $1
             RETURNING {CONTRACT_COLUMNS}"
        );
        let contract = sqlx::query_as::<_, Contract>(&sql)
            .bind(id)
            .bind(monthly_rate)
            .bind(updated_by)
            .fetch_optional(&self.pool)
            .await?;

        Ok(contract)
    }

    async fn renew(
        &self,
        id: Uuid,
        renewal_date: NaiveDate,
        updated_by: &str,
    ) -> Result<Option<Contract>, AppError> {
        let sql = format!(
            "UPDATE contracts
             SET renewal_date = $2, cpi_adjusted = FALSE, updated_at = now(), updated_by = $3
             WHERE id = $1
             RETURNING {CONTRACT_COLUMNS}"
        );
        let contract = sqlx::query_as::<_, Contract>(&sql)
            .bind(id)
            .bind(renewal_date)
            .bind(updated_by)
            .fetch_optional(&self.pool)
            .await?;

        Ok(contract)
    }
}
