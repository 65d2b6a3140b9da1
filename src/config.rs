// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use chrono_tz::Tz;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::{
        calendar::{Clock, SystemClock},
        i18n::I18nStore,
    },
    db::{ContractRepository, ContractStore, InvoiceRepository, InvoiceStore},
    services::{
        contract_service::ContractService,
        invoice_generator::InvoiceGenerator,
        invoice_service::InvoiceService,
        scheduler::SchedulerSettings,
    },
};

// Configuração lida do ambiente (.env carregado pelo dotenvy)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub billing_timezone: Tz,
    pub generation_timeout: Duration,
    pub scheduler_enabled: bool,
    pub scheduler_retry_count: u32,
    pub scheduler_max_retry: Duration,
    pub database_max_connections: u32,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta as configurações a partir de qualquer fonte chave -> valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow!("{} deve ser definida", key))
        };

        let billing_timezone = match lookup("BILLING_TIMEZONE") {
            Some(name) => Tz::from_str(&name)
                .map_err(|e| anyhow!("BILLING_TIMEZONE inválido '{}': {}", name, e))?,
            None => chrono_tz::Europe::Madrid,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            billing_timezone,
            generation_timeout: Duration::from_secs(parse_or(&lookup, "GENERATION_TIMEOUT_SECS", 60)?),
            scheduler_enabled: parse_or(&lookup, "SCHEDULER_ENABLED", true)?,
            scheduler_retry_count: parse_or(&lookup, "SCHEDULER_RETRY_COUNT", 3)?,
            scheduler_max_retry: Duration::from_secs(parse_or(&lookup, "SCHEDULER_MAX_RETRY_SECS", 60)?),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
        })
    }

    pub fn scheduler(&self) -> SchedulerSettings {
        SchedulerSettings {
            retry_count: self.scheduler_retry_count,
            max_retry_delay: self.scheduler_max_retry,
        }
    }

    pub async fn connect(&self) -> anyhow::Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&self.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(pool)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{} inválido '{}': {}", key, raw, e)),
        None => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub jwt_secret: String,
    pub i18n_store: Arc<I18nStore>,
    pub invoice_generator: InvoiceGenerator,
    pub contract_service: ContractService,
    pub invoice_service: InvoiceService,
}

impl AppState {
    pub fn new(settings: &Settings, pool: PgPool) -> Self {
        // --- Monta o gráfico de dependências ---
        let contracts: Arc<dyn ContractStore> = Arc::new(ContractRepository::new(pool.clone()));
        let invoices: Arc<dyn InvoiceStore> = Arc::new(InvoiceRepository::new(pool));
        Self::with_stores(settings, contracts, invoices, Arc::new(SystemClock))
    }

    pub fn with_stores(
        settings: &Settings,
        contracts: Arc<dyn ContractStore>,
        invoices: Arc<dyn InvoiceStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let invoice_generator = InvoiceGenerator::new(
            contracts.clone(),
            invoices.clone(),
            clock.clone(),
            settings.billing_timezone,
            settings.generation_timeout,
        );
        let contract_service = ContractService::new(contracts, clock, settings.billing_timezone);
        let invoice_service = InvoiceService::new(invoices);

        Self {
            jwt_secret: settings.jwt_secret.clone(),
            i18n_store: Arc::new(I18nStore::new()),
            invoice_generator,
            contract_service,
            invoice_service,
        }
    }
}
