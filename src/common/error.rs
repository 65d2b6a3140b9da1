use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Nosso tipo de erro de domínio, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Falha de conectividade / consulta no banco (sqlx)
    #[error("Banco de dados indisponível: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    #[error("Contrato com dados inválidos: {0}")]
    InvalidContractData(String),

    // Outra execução já gravou a fatura deste imóvel/mês (índice único)
    #[error("Fatura de aluguel duplicada para o imóvel {property_id} em {month}")]
    DuplicateInvoiceRace { property_id: String, month: String },

    #[error("A geração de faturas excedeu {0}s")]
    GenerationTimeout(u64),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Falhas que o agendador pode tentar de novo.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_) | AppError::GenerationTimeout(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidContractData(_) => StatusCode::BAD_REQUEST,
            AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::DuplicateInvoiceRace { .. } => StatusCode::CONFLICT,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::GenerationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::InvalidContractData(_) => "validation_failed",
            AppError::ResourceNotFound(_) => "not_found",
            AppError::Conflict(_) | AppError::DuplicateInvoiceRace { .. } => "conflict",
            AppError::InvalidToken => "invalid_token",
            AppError::Forbidden(_) => "forbidden",
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::GenerationTimeout(_) => "generation_timeout",
            AppError::InternalServerError(_) => "internal_error",
        }
    }

    /// Converte o erro de domínio na resposta HTTP, já traduzida.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status_code();
        let error = i18n.get(&locale.0, self.message_key());

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    fields.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(fields))
            }
            AppError::InvalidContractData(reason)
            | AppError::ResourceNotFound(reason)
            | AppError::Conflict(reason)
            | AppError::Forbidden(reason) => Some(json!(reason)),
            _ => None,
        };

        if status.is_server_error() {
            // O `tracing` loga a mensagem detalhada; o cliente só recebe a genérica.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        ApiError { status, error, details }
    }

    /// Para rejeições sem acesso ao estado (idioma padrão).
    pub fn into_api_error(self) -> ApiError {
        self.to_api_error(&Locale::default(), &I18nStore::new())
    }
}

// O erro que sai pela API (rejeição dos extratores e dos handlers)
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_api_error().into_response()
    }
}
