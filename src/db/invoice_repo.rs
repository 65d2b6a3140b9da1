// src/db/invoice_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::InvoiceStore,
    models::invoice::{Invoice, InvoiceFilter, InvoiceKind, NewInvoice},
};

const INVOICE_COLUMNS: &str = r#"
    id, kind, property_id, property_name, contract_id,
    amount, period_start, period_end, status,
    created_at, created_by, updated_at, updated_by
"#;

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceStore for InvoiceRepository {
    async fn rent_invoices_between(
        &self,
        property_id: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Invoice>, AppError> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices
             WHERE property_id = $1 AND kind = $2
               AND period_start >= $3 AND period_start < $4"
        );
        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(property_id)
            .bind(InvoiceKind::Rent)
            .bind(from)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }

    async fn insert_invoice(&self, new: NewInvoice) -> Result<Uuid, AppError> {
        // created_at / updated_at: DEFAULT now() (relógio do servidor)
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO invoices (
                kind, property_id, property_name, contract_id,
                amount, period_start, period_end, status,
                created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(new.kind)
        .bind(&new.property_id)
        .bind(&new.property_name)
        .bind(new.contract_id)
        .bind(new.amount)
        .bind(new.period_start)
        .bind(new.period_end)
        .bind(new.status)
        .bind(&new.created_by)
        .bind(&new.updated_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Violação do índice único (imóvel, tipo, mês): outra execução chegou antes
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateInvoiceRace {
                        property_id: new.property_id.clone(),
                        month: new.period_start.format("%Y-%m").to_string(),
                    };
                }
            }
            AppError::StoreUnavailable(e)
        })
    }

    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, AppError> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices
             WHERE ($1::text IS NULL OR property_id = $1)
               AND ($2::date IS NULL OR period_start >= $2)
               AND ($3::date IS NULL OR period_start < $3)
             ORDER BY period_start DESC, property_name ASC"
        );
        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(filter.property_id.as_deref())
            .bind(filter.from)
            .bind(filter.until)
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }
}
