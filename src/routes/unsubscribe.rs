use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;

use crate::domain::subscription_token::SubscriptionToken;
use crate::routes::e500;
use crate::routes::subscriptions_confirm::Parameters;
use crate::store::subscribers::unsubscribe;

#[derive(serde::Serialize)]
struct UnsubscribeResponse {
    removed: bool,
}

/// Removes the subscriber behind an unsubscribe link. Unknown or already used tokens get a 404.
#[tracing::instrument(name = "Unsubscribe handler", skip(db_pool, parameters))]
pub async fn handle_unsubscribe(
    db_pool: web::Data<SqlitePool>,
    parameters: web::Query<Parameters>,
) -> Result<HttpResponse, actix_web::Error> {
    let removed = match SubscriptionToken::parse(parameters.into_inner().token) {
        Ok(token) => unsubscribe(&db_pool, &token).await.map_err(e500)?,
        Err(_) => false,
    };

    if removed {
        Ok(HttpResponse::Ok().json(UnsubscribeResponse { removed }))
    } else {
        Ok(HttpResponse::NotFound().json(UnsubscribeResponse { removed }))
    }
}
