// src/common/i18n.rs

use std::collections::HashMap;

const FALLBACK_LANG: &str = "en";

// Catálogo de mensagens de erro exibidas ao cliente, por idioma.
// Chave -> [(idioma, texto)]
const MESSAGES: &[(&str, &[(&str, &str)])] = &[
    ("validation_failed", &[
        ("en", "One or more fields are invalid."),
        ("es", "Uno o más campos no son válidos."),
        ("pt", "Um ou mais campos são inválidos."),
    ]),
    ("not_found", &[
        ("en", "Resource not found."),
        ("es", "Recurso no encontrado."),
        ("pt", "Recurso não encontrado."),
    ]),
    ("conflict", &[
        ("en", "The request conflicts with existing data."),
        ("es", "La solicitud entra en conflicto con datos existentes."),
        ("pt", "A requisição conflita com dados existentes."),
    ]),
    ("invalid_token", &[
        ("en", "Invalid or missing authentication token."),
        ("es", "Token de autenticación inválido o ausente."),
        ("pt", "Token de autenticação inválido ou ausente."),
    ]),
    ("forbidden", &[
        ("en", "You are not allowed to perform this action."),
        ("es", "No tiene permiso para realizar esta acción."),
        ("pt", "Você não tem permissão para realizar esta ação."),
    ]),
    ("store_unavailable", &[
        ("en", "The database is unavailable. Try again later."),
        ("es", "La base de datos no está disponible. Inténtelo más tarde."),
        ("pt", "O banco de dados está indisponível. Tente novamente mais tarde."),
    ]),
    ("generation_timeout", &[
        ("en", "Invoice generation timed out. It can be retried."),
        ("es", "La generación de facturas excedió el tiempo límite. Puede reintentarse."),
        ("pt", "A geração de faturas excedeu o tempo limite. Pode ser repetida."),
    ]),
    ("invoices_generated", &[
        ("en", "Invoices generated successfully"),
        ("es", "Facturas generadas correctamente"),
        ("pt", "Faturas geradas com sucesso"),
    ]),
    ("internal_error", &[
        ("en", "An unexpected error occurred."),
        ("es", "Ocurrió un error inesperado."),
        ("pt", "Ocorreu um erro inesperado."),
    ]),
];

pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let messages = MESSAGES
            .iter()
            .map(|(key, translations)| (*key, translations.iter().copied().collect()))
            .collect();
        Self { messages }
    }

    /// Busca a mensagem no idioma pedido; cai para inglês e, por fim, na própria chave.
    pub fn get(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(key)
            .and_then(|translations| {
                translations
                    .get(lang)
                    .or_else(|| translations.get(FALLBACK_LANG))
            })
            .map(|message| message.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_languages_and_falls_back() {
        let store = I18nStore::new();
        assert_eq!(store.get("es", "not_found"), "Recurso no encontrado.");
        assert_eq!(store.get("pt", "not_found"), "Recurso não encontrado.");
        assert_eq!(store.get("fr", "not_found"), "Resource not found.");
        assert_eq!(store.get("es", "unknown_key"), "unknown_key");
    }
}
