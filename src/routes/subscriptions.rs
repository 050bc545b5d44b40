use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, ResponseError};
use sqlx::SqlitePool;

use crate::{
    domain::{
        language::Language,
        new_subscriber::{NewSubscriber, NewSubscriberBody},
        subscriber::SubscribeOutcome,
    },
    mail::Mailer,
    routes::{client_ip, error_chain_fmt},
    store::subscribers::subscribe,
};

#[derive(serde::Serialize)]
struct SubscriptionResponse {
    status: &'static str,
}

#[tracing::instrument(
    name = "Creating a new subscriber handler",
    skip(request, body, db_pool, mailer),
    fields(
        subscriber_email = %body.email,
    )
)]
pub async fn handle_create_subscription(
    request: HttpRequest,
    body: web::Json<NewSubscriberBody>,
    db_pool: web::Data<SqlitePool>,
    mailer: web::Data<Mailer>,
) -> Result<HttpResponse, SubscribeError> {
    let new_subscriber = NewSubscriber::try_from_body(
        body.into_inner(),
        Language::from_request(&request),
        client_ip(&request),
    )
    .map_err(SubscribeError::ValidationError)?;

    let outcome = subscribe(&db_pool, &new_subscriber).await?;

    let confirm_token = match &outcome {
        SubscribeOutcome::AlreadyConfirmed { .. } => {
            return Ok(HttpResponse::Ok().json(SubscriptionResponse {
                status: "already_confirmed",
            }));
        }
        SubscribeOutcome::Created { confirm_token, .. }
        | SubscribeOutcome::PendingConfirmation { confirm_token, .. } => confirm_token,
    };

    // A lost confirmation email is not fatal: subscribing again resends the same link
    if !mailer
        .send_confirmation(&new_subscriber.email, confirm_token, new_subscriber.language)
        .await
    {
        tracing::warn!(
            "Confirmation email to {} was not delivered",
            new_subscriber.email
        );
    }

    if outcome.is_new() {
        Ok(HttpResponse::Created().json(SubscriptionResponse {
            status: "confirmation_sent",
        }))
    } else {
        Ok(HttpResponse::Ok().json(SubscriptionResponse {
            status: "confirmation_resent",
        }))
    }
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to store the subscriber.")]
    StoreError(#[from] sqlx::Error),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::ValidationError(_) => StatusCode::BAD_REQUEST,
            SubscribeError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
