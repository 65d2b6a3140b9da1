// src/services/contract_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{
        calendar::{add_one_year, renewal_date_for, today_in, Clock},
        error::AppError,
        money::{apply_cpi, MAX_AMOUNT, MAX_CPI_PERCENTAGE},
    },
    db::ContractStore,
    models::contract::{Contract, ContractView, CreateContractPayload, NewContract},
};

#[derive(Clone)]
pub struct ContractService {
    store: Arc<dyn ContractStore>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl ContractService {
    pub fn new(store: Arc<dyn ContractStore>, clock: Arc<dyn Clock>, timezone: Tz) -> Self {
        Self { store, clock, timezone }
    }

    fn today(&self) -> NaiveDate {
        today_in(self.timezone, self.clock.now())
    }

    pub async fn list_contracts(&self, active: Option<bool>) -> Result<Vec<ContractView>, AppError> {
        let today = self.today();
        let contracts = self.store.list_contracts(active).await?;

        Ok(contracts
            .into_iter()
            .map(|contract| ContractView {
                renewal_status: contract.renewal_status(today),
                contract,
            })
            .collect())
    }

    /// Registra um contrato. Um imóvel só pode ter um contrato ativo.
    pub async fn create_contract(
        &self,
        payload: CreateContractPayload,
        created_by: &str,
    ) -> Result<Contract, AppError> {
        let active = payload.active.unwrap_or(true);

        if active {
            self.ensure_no_active_contract(&payload.property_id, None).await?;
        }

        let renewal_date = payload
            .renewal_date
            .unwrap_or_else(|| renewal_date_for(payload.start_date));

        let contract = self
            .store
            .insert_contract(NewContract {
                property_id: payload.property_id,
                property_name: payload.property_name,
                tenant_ids: payload.tenant_ids,
                monthly_rate: payload.monthly_rate,
                start_date: payload.start_date,
                renewal_date,
                active,
                created_by: created_by.to_string(),
            })
            .await?;

        tracing::info!("📄 Contrato {} registrado para {}", contract.id, contract.property_name);
        Ok(contract)
    }

    /// Ativa ou desativa o contrato. Reativar respeita a regra de um contrato ativo por imóvel.
    pub async fn set_active(&self, id: Uuid, active: bool, updated_by: &str) -> Result<Contract, AppError> {
        if active {
            let contract = self.get(id).await?;
            self.ensure_no_active_contract(&contract.property_id, Some(id)).await?;
        }

        self.store
            .set_active(id, active, updated_by)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Contrato {}", id)))
    }

    /// Aplica o reajuste anual do IPC sobre o aluguel atual.
    pub async fn apply_cpi_adjustment(
        &self,
        id: Uuid,
        percentage: Decimal,
        updated_by: &str,
    ) -> Result<Contract, AppError> {
        if percentage <= -Decimal::ONE_HUNDRED || percentage > MAX_CPI_PERCENTAGE {
            return Err(AppError::InvalidContractData(format!(
                "percentual de IPC inválido: {}",
                percentage
            )));
        }

        let contract = self.get(id).await?;
        let current_rate = contract.monthly_rate.ok_or_else(|| {
            AppError::InvalidContractData(format!("contrato {} sem valor mensal", id))
        })?;
        let new_rate = apply_cpi(current_rate, percentage)
            .filter(|rate| *rate <= MAX_AMOUNT)
            .ok_or_else(|| {
                AppError::InvalidContractData(format!(
                    "reajuste de {}% sobre {} excede o valor máximo",
                    percentage, current_rate
                ))
            })?;

        let updated = self
            .store
            .update_rate(id, new_rate, updated_by)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Contrato {}", id)))?;

        tracing::info!("IPC de {}% aplicado ao contrato {}: {} -> {}", percentage, id, current_rate, new_rate);
        Ok(updated)
    }

    /// Renova o contrato. Sem data informada, avança a renovação atual em um ano.
    pub async fn renew(
        &self,
        id: Uuid,
        renewal_date: Option<NaiveDate>,
        updated_by: &str,
    ) -> Result<Contract, AppError> {
        let contract = self.get(id).await?;

        let next = match renewal_date {
            Some(date) => date,
            None => {
                let current = contract
                    .renewal_date
                    .or(contract.start_date.map(renewal_date_for))
                    .ok_or_else(|| {
                        AppError::InvalidContractData(format!("contrato {} sem data de início", id))
                    })?;
                add_one_year(current)
            }
        };

        self.store
            .renew(id, next, updated_by)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Contrato {}", id)))
    }

    async fn ensure_no_active_contract(&self, property_id: &str, except: Option<Uuid>) -> Result<(), AppError> {
        let already_rented = self
            .store
            .list_contracts(Some(true))
            .await?
            .into_iter()
            .any(|c| c.property_id == property_id && Some(c.id) != except);
        if already_rented {
            return Err(AppError::Conflict(format!(
                "O imóvel {} já tem um contrato ativo",
                property_id
            )));
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Contract, AppError> {
        self.store
            .get_contract(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Contrato {}", id)))
    }
}
