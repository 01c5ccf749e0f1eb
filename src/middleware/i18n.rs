// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

const DEFAULT_LANG: &str = "pt";

// Extrator de idioma (Accept-Language). Só o idioma primário importa: "pt-BR" vira "pt".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    pub fn from_header(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first()
                    .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
            })
            .filter(|lang| !lang.is_empty())
            .map(Locale)
            .unwrap_or_default()
    }

    pub fn is_english(&self) -> bool {
        self.0 == "en"
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(Locale::from_header(header_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_tag_wins() {
        assert_eq!(Locale::from_header(Some("en-US,pt;q=0.5")), Locale("en".into()));
        assert_eq!(Locale::from_header(Some("pt-BR")), Locale("pt".into()));
    }

    #[test]
    fn missing_header_defaults_to_portuguese() {
        assert_eq!(Locale::from_header(None), Locale::default());
        assert!(!Locale::from_header(None).is_english());
    }
}
