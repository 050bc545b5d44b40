use actix_web::body::MessageBody;
use actix_web::cookie::{time::Duration, Cookie};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderMap, AUTHORIZATION, LOCATION};
use actix_web::middleware::Next;
use actix_web::{web, HttpResponse};
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::startup::AdminToken;

pub const ADMIN_COOKIE: &str = "admin_token";

/// An empty configured token locks everybody out.
fn is_authorized(expected: &str, presented: Option<&str>) -> bool {
    !expected.is_empty() && presented == Some(expected)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

/// Guards `/admin`: the admin token must come either in the login cookie or as a bearer token.
pub async fn reject_non_admin(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let presented = req
        .cookie(ADMIN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| bearer_token(req.headers()));
    let authorized = req
        .app_data::<web::Data<AdminToken>>()
        .map(|admin_token| is_authorized(admin_token.0.expose_secret(), presented.as_deref()))
        .unwrap_or(false);

    if !authorized {
        tracing::warn!("Rejected unauthenticated admin request to {}", req.path());
        return Err(actix_web::error::ErrorForbidden("Forbidden"));
    }

    next.call(req).await
}

#[derive(Deserialize, Debug)]
pub struct LoginParameters {
    pub token: Option<String>,
}

/// Trades a correct `?token=` for a month-long HttpOnly admin cookie.
#[tracing::instrument(name = "Admin login", skip(parameters, admin_token))]
pub async fn admin_login(
    parameters: web::Query<LoginParameters>,
    admin_token: web::Data<AdminToken>,
) -> HttpResponse {
    let token = parameters.into_inner().token.unwrap_or_default();

    if !is_authorized(admin_token.0.expose_secret(), Some(token.as_str())) {
        return HttpResponse::Forbidden().finish();
    }

    let cookie = Cookie::build(ADMIN_COOKIE, token)
        .path("/")
        .http_only(true)
        .max_age(Duration::days(30))
        .finish();

    HttpResponse::SeeOther()
        .insert_header((LOCATION, "/admin/newsletters"))
        .cookie(cookie)
        .finish()
}
