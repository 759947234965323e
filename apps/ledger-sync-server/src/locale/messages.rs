//! User-facing message catalog

use super::Locale;

/// A user-facing message, rendered in the negotiated locale at the HTTP boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    UnsupportedMediaType,
    InvalidDate { value: String },
    InvalidParameter { name: String, value: String },
    Unauthenticated,
    NotFound { what: String },
    InvalidTimezone { value: String },
    UnsupportedLanguage { value: String },
    Internal,
}

impl Message {
    pub fn render(&self, locale: Locale) -> String {
        use Locale::*;

        match self {
            Message::UnsupportedMediaType => match locale {
                En => "Requests with a body must be sent as application/json.".to_string(),
                Fr => "Les requêtes avec un corps doivent être envoyées en application/json.".to_string(),
                Es => "Las solicitudes con cuerpo deben enviarse como application/json.".to_string(),
                De => "Anfragen mit Inhalt müssen als application/json gesendet werden.".to_string(),
                Pt => "Pedidos com corpo devem ser enviados como application/json.".to_string(),
                It => "Le richieste con un corpo devono essere inviate come application/json.".to_string(),
            },
            Message::InvalidDate { value } => match locale {
                En => format!("'{}' is not a valid date.", value),
                Fr => format!("'{}' n'est pas une date valide.", value),
                Es => format!("'{}' no es una fecha válida.", value),
                De => format!("'{}' ist kein gültiges Datum.", value),
                Pt => format!("'{}' não é uma data válida.", value),
                It => format!("'{}' non è una data valida.", value),
            },
            Message::InvalidParameter { name, value } => match locale {
                En => format!("Invalid value '{}' for parameter '{}'.", value, name),
                Fr => format!("Valeur '{}' invalide pour le paramètre '{}'.", value, name),
                Es => format!("Valor '{}' no válido para el parámetro '{}'.", value, name),
                De => format!("Ungültiger Wert '{}' für den Parameter '{}'.", value, name),
                Pt => format!("Valor '{}' inválido para o parâmetro '{}'.", value, name),
                It => format!("Valore '{}' non valido per il parametro '{}'.", value, name),
            },
            Message::Unauthenticated => match locale {
                En => "Authentication is required.".to_string(),
                Fr => "Une authentification est requise.".to_string(),
                Es => "Se requiere autenticación.".to_string(),
                De => "Authentifizierung erforderlich.".to_string(),
                Pt => "É necessária autenticação.".to_string(),
                It => "È richiesta l'autenticazione.".to_string(),
            },
            Message::NotFound { what } => match locale {
                En => format!("Not found: {}.", what),
                Fr => format!("Introuvable : {}.", what),
                Es => format!("No encontrado: {}.", what),
                De => format!("Nicht gefunden: {}.", what),
                Pt => format!("Não encontrado: {}.", what),
                It => format!("Non trovato: {}.", what),
            },
            Message::InvalidTimezone { value } => match locale {
                En => format!("'{}' is not a known timezone.", value),
                Fr => format!("'{}' n'est pas un fuseau horaire connu.", value),
                Es => format!("'{}' no es una zona horaria conocida.", value),
                De => format!("'{}' ist keine bekannte Zeitzone.", value),
                Pt => format!("'{}' não é um fuso horário conhecido.", value),
                It => format!("'{}' non è un fuso orario noto.", value),
            },
            Message::UnsupportedLanguage { value } => match locale {
                En => format!("'{}' is not a supported language.", value),
                Fr => format!("'{}' n'est pas une langue prise en charge.", value),
                Es => format!("'{}' no es un idioma admitido.", value),
                De => format!("'{}' ist keine unterstützte Sprache.", value),
                Pt => format!("'{}' não é um idioma suportado.", value),
                It => format!("'{}' non è una lingua supportata.", value),
            },
            Message::Internal => match locale {
                En => "An internal error occurred.".to_string(),
                Fr => "Une erreur interne est survenue.".to_string(),
                Es => "Se produjo un error interno.".to_string(),
                De => "Ein interner Fehler ist aufgetreten.".to_string(),
                Pt => "Ocorreu um erro interno.".to_string(),
                It => "Si è verificato un errore interno.".to_string(),
            },
        }
    }
}
