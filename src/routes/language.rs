use actix_web::cookie::{time::Duration, Cookie};
use actix_web::http::header::{LOCATION, REFERER};
use actix_web::{web, HttpRequest, HttpResponse};

use crate::domain::language::{Language, LANGUAGE_COOKIE};

/// Remembers the chosen language for a year and sends the visitor back where they came from.
/// Unknown codes fall back to English.
#[tracing::instrument(name = "Switch language", skip(request))]
pub async fn handle_switch_language(
    request: HttpRequest,
    lang: web::Path<String>,
) -> HttpResponse {
    let language = Language::parse(&lang).unwrap_or_default();
    let back_to = request
        .headers()
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or("/")
        .to_string();

    let cookie = Cookie::build(LANGUAGE_COOKIE, language.as_ref().to_string())
        .path("/")
        .max_age(Duration::days(365))
        .finish();

    HttpResponse::Found()
        .insert_header((LOCATION, back_to))
        .cookie(cookie)
        .finish()
}
