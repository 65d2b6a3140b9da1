// src/services/invoice_service.rs

use std::sync::Arc;

use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::InvoiceStore,
    models::invoice::{Invoice, InvoiceFilter},
};

#[derive(Clone)]
pub struct InvoiceService {
    store: Arc<dyn InvoiceStore>,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
        Self { store }
    }

    pub async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, AppError> {
        if let (Some(from), Some(until)) = (filter.from, filter.until) {
            if from >= until {
                let mut errors = ValidationErrors::new();
                errors.add(
                    "until",
                    ValidationError::new("range")
                        .with_message("'until' deve ser posterior a 'from'.".into()),
                );
                return Err(AppError::ValidationError(errors));
            }
        }
        self.store.list_invoices(filter).await
    }
}
