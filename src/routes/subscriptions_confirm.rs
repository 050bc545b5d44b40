use actix_web::{
    web::{self, Query},
    HttpResponse,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::domain::subscription_token::SubscriptionToken;
use crate::routes::e500;
use crate::store::subscribers::confirm_subscriber;

#[derive(Deserialize, Debug)]
pub struct Parameters {
    pub token: String,
}

#[derive(serde::Serialize)]
struct ConfirmationResponse {
    confirmed: bool,
}

#[tracing::instrument(
  name = "Confirm a newsletter subscription",
  skip(db_pool, parameters)
)]
pub async fn handle_confirm_subscription(
    db_pool: web::Data<SqlitePool>,
    parameters: Query<Parameters>,
) -> Result<HttpResponse, actix_web::Error> {
    // A malformed token cannot match anything, answer as for an unknown one
    let confirmed = match SubscriptionToken::parse(parameters.into_inner().token) {
        Ok(token) => confirm_subscriber(&db_pool, &token)
            .await
            .map_err(e500)?,
        Err(err) => {
            tracing::warn!("Rejected confirmation token: {}", err);
            false
        }
    };

    if confirmed {
        Ok(HttpResponse::Ok().json(ConfirmationResponse { confirmed }))
    } else {
        Ok(HttpResponse::Unauthorized().json(ConfirmationResponse { confirmed }))
    }
}
