// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Papéis do app: o proprietário administra tudo, o inquilino só consulta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Tenant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Tenant => "tenant",
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT emitido pelo login externo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (uid do usuário no provedor de identidade)
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    pub exp: usize, // Expiration time (quando o token expira)
}
