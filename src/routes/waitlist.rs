use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::domain::{
    language::Language,
    subscriber_email::SubscriberEmail,
    subscriber_name::SubscriberName,
    waitlist::{NewWaitlistEntry, Product},
};
use crate::routes::{client_ip, e500};
use crate::store::waitlist::add_to_waitlist;

#[derive(Deserialize)]
pub struct WaitlistBody {
    pub email: String,
    pub name: Option<String>,
    pub product: Option<String>,
    pub language: Option<String>,
}

#[derive(serde::Serialize)]
struct WaitlistResponse {
    added: bool,
}

#[tracing::instrument(
    name = "Join the waitlist handler",
    skip(request, body, db_pool),
    fields(email = %body.email)
)]
pub async fn handle_join_waitlist(
    request: HttpRequest,
    body: web::Json<WaitlistBody>,
    db_pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, actix_web::Error> {
    let body = body.into_inner();
    let email = SubscriberEmail::parse(body.email).map_err(actix_web::error::ErrorBadRequest)?;
    let language = body
        .language
        .as_deref()
        .and_then(Language::parse)
        .unwrap_or_else(|| Language::from_request(&request));

    let entry = NewWaitlistEntry {
        email,
        name: SubscriberName::parse(body.name),
        product: Product::parse_or_default(body.product.as_deref()),
        language,
        ip_address: client_ip(&request),
    };

    let added = add_to_waitlist(&db_pool, &entry).await.map_err(e500)?;

    if added {
        Ok(HttpResponse::Created().json(WaitlistResponse { added }))
    } else {
        Ok(HttpResponse::Ok().json(WaitlistResponse { added }))
    }
}
