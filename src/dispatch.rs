use actix_web::{http::StatusCode, ResponseError};
use sqlx::SqlitePool;

use crate::domain::newsletter::NewsletterStatus;
use crate::mail::Mailer;
use crate::routes::error_chain_fmt;
use crate::store::newsletters::{get_newsletter, mark_newsletter_sent};
use crate::store::subscribers::get_confirmed_subscribers;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DispatchReport {
    pub newsletter_id: i64,
    /// Confirmed subscribers in the newsletter's audience when the batch started.
    pub recipients: usize,
    /// Messages the mail API accepted.
    pub delivered: i64,
}

#[derive(thiserror::Error)]
pub enum DispatchError {
    #[error("Newsletter {0} does not exist.")]
    NotFound(i64),
    #[error("Newsletter {id} cannot be sent from status {status:?}.")]
    NotSendable { id: i64, status: NewsletterStatus },
    #[error("Failed to read or update the newsletter store.")]
    Store(#[from] sqlx::Error),
}

impl std::fmt::Debug for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for DispatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::NotFound(_) => StatusCode::NOT_FOUND,
            DispatchError::NotSendable { .. } => StatusCode::BAD_REQUEST,
            DispatchError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Sends a draft or scheduled newsletter to its audience and marks it as sent.
///
/// Recipients are mailed one by one in the order the store returns them. A failed delivery
/// is logged and skipped, never retried. Nothing is written until the whole batch is done:
/// a crash mid-batch leaves the newsletter sendable and a retry mails everyone again.
#[tracing::instrument(name = "Dispatch a newsletter", skip(db_pool, mailer))]
pub async fn send_newsletter(
    db_pool: &SqlitePool,
    mailer: &Mailer,
    newsletter_id: i64,
) -> Result<DispatchReport, DispatchError> {
    let newsletter = get_newsletter(db_pool, newsletter_id)
        .await?
        .ok_or(DispatchError::NotFound(newsletter_id))?;

    if !newsletter.status.is_sendable() {
        return Err(DispatchError::NotSendable {
            id: newsletter_id,
            status: newsletter.status,
        });
    }

    let subscribers = get_confirmed_subscribers(db_pool, newsletter.content.target).await?;
    let mut delivered: i64 = 0;

    for subscriber in &subscribers {
        let (subject, body) = newsletter.variant(subscriber.language);

        if mailer
            .send_newsletter(
                &subscriber.email,
                subject,
                body,
                &subscriber.unsubscribe_token,
                subscriber.language,
            )
            .await
        {
            delivered += 1;
        }
    }

    mark_newsletter_sent(db_pool, newsletter_id, delivered).await?;

    tracing::info!(
        "Newsletter {} delivered to {} of {} recipients",
        newsletter_id,
        delivered,
        subscribers.len()
    );

    Ok(DispatchReport {
        newsletter_id,
        recipients: subscribers.len(),
        delivered,
    })
}
