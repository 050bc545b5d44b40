use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::domain::{
    audience::Audience,
    language::Language,
    new_subscriber::NewSubscriber,
    subscriber::{SubscribeOutcome, Subscriber},
    subscriber_email::SubscriberEmail,
    subscriber_name::SubscriberName,
    subscriber_status::SubscriberStatus,
    subscription_token::SubscriptionToken,
};
use crate::store::decode_error;

// A conflicting row can disappear (concurrent unsubscribe) before it is read back.
const MAX_SUBSCRIBE_ATTEMPTS: usize = 3;

const SUBSCRIBER_COLUMNS: &str = "id, email, name, language, interests, confirmed, confirm_token, \
     unsubscribe_token, ip_address, created_at, confirmed_at";

/// Adds `new_subscriber` to the mailing list, or reports what is already there.
///
/// The unique index on `email` decides whether this call created the record: the insert
/// does nothing on conflict and the existing tokens are read back unchanged.
#[tracing::instrument(
    name = "Subscribe to the mailing list",
    skip(db_pool, new_subscriber),
    fields(subscriber_email = %new_subscriber.email)
)]
pub async fn subscribe(
    db_pool: &SqlitePool,
    new_subscriber: &NewSubscriber,
) -> Result<SubscribeOutcome, sqlx::Error> {
    for _ in 0..MAX_SUBSCRIBE_ATTEMPTS {
        let confirm_token = SubscriptionToken::generate();
        let unsubscribe_token = SubscriptionToken::generate();

        let inserted = sqlx::query(
            r#"
            INSERT INTO subscribers
                (email, name, language, interests, confirmed, confirm_token, unsubscribe_token, ip_address, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(new_subscriber.email.as_ref())
        .bind(new_subscriber.name.as_ref().map(|name| name.as_ref().to_string()))
        .bind(new_subscriber.language.as_ref())
        .bind(new_subscriber.interests.as_ref())
        .bind(confirm_token.as_ref())
        .bind(unsubscribe_token.as_ref())
        .bind(new_subscriber.ip_address.as_str())
        .bind(Utc::now())
        .execute(db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to insert subscriber: {:?}", err);
            err
        })?
        .rows_affected();

        if inserted == 1 {
            return Ok(SubscribeOutcome::Created {
                confirm_token,
                unsubscribe_token,
            });
        }

        if let Some(existing) = get_subscriber_by_email(db_pool, &new_subscriber.email).await? {
            let unsubscribe_token = existing.unsubscribe_token;

            return Ok(match existing.status {
                SubscriberStatus::Pending { confirm_token } => {
                    SubscribeOutcome::PendingConfirmation {
                        confirm_token,
                        unsubscribe_token,
                    }
                }
                SubscriberStatus::Confirmed { .. } => {
                    SubscribeOutcome::AlreadyConfirmed { unsubscribe_token }
                }
            });
        }

        tracing::warn!("Conflicting subscriber vanished before it could be read, retrying");
    }

    Err(sqlx::Error::RowNotFound)
}

/// Confirms the pending subscriber holding `confirm_token`.
///
/// Returns `true` on first confirmation and on any repeat of an already spent token whose
/// subscriber still exists; `false` for unknown tokens. `confirmed_at` is only ever set once.
#[tracing::instrument(name = "Confirm a subscriber", skip(db_pool, confirm_token))]
pub async fn confirm_subscriber(
    db_pool: &SqlitePool,
    confirm_token: &SubscriptionToken,
) -> Result<bool, sqlx::Error> {
    let confirmed = sqlx::query(
        r#"
        UPDATE subscribers
        SET confirmed = 1, confirmed_at = ?1, confirm_token = NULL, consumed_confirm_token = ?2
        WHERE confirm_token = ?2 AND confirmed = 0
        "#,
    )
    .bind(Utc::now())
    .bind(confirm_token.as_ref())
    .execute(db_pool)
    .await
    .map_err(|err| {
        tracing::error!("Failed to confirm subscriber: {:?}", err);
        err
    })?
    .rows_affected();

    if confirmed > 0 {
        return Ok(true);
    }

    let already_confirmed = sqlx::query(
        r#"
        SELECT 1 FROM subscribers
        WHERE consumed_confirm_token = ?1 AND confirmed = 1
        "#,
    )
    .bind(confirm_token.as_ref())
    .fetch_optional(db_pool)
    .await?
    .is_some();

    if already_confirmed {
        tracing::info!("Confirmation token was already used");
    }

    Ok(already_confirmed)
}

/// Deletes the subscriber holding `unsubscribe_token`. Returns whether a record was removed.
#[tracing::instrument(name = "Unsubscribe a subscriber", skip(db_pool, unsubscribe_token))]
pub async fn unsubscribe(
    db_pool: &SqlitePool,
    unsubscribe_token: &SubscriptionToken,
) -> Result<bool, sqlx::Error> {
    let removed = sqlx::query("DELETE FROM subscribers WHERE unsubscribe_token = ?1")
        .bind(unsubscribe_token.as_ref())
        .execute(db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to delete subscriber: {:?}", err);
            err
        })?
        .rows_affected();

    Ok(removed > 0)
}

/// Confirmed subscribers a newsletter for `target` goes to.
///
/// `All` selects everyone confirmed. A specific audience selects subscribers interested in
/// it plus those interested in everything.
#[tracing::instrument(name = "Get confirmed subscribers", skip(db_pool), fields(target = %target.as_ref()))]
pub async fn get_confirmed_subscribers(
    db_pool: &SqlitePool,
    target: Audience,
) -> Result<Vec<Subscriber>, sqlx::Error> {
    let rows = match target {
        Audience::All => {
            sqlx::query(&format!(
                "SELECT {} FROM subscribers WHERE confirmed = 1 ORDER BY id",
                SUBSCRIBER_COLUMNS
            ))
            .fetch_all(db_pool)
            .await
        }
        target => {
            sqlx::query(&format!(
                "SELECT {} FROM subscribers WHERE confirmed = 1 AND (interests = ?1 OR interests = ?2) ORDER BY id",
                SUBSCRIBER_COLUMNS
            ))
            .bind(target.as_ref())
            .bind(Audience::All.as_ref())
            .fetch_all(db_pool)
            .await
        }
    }
    .map_err(|err| {
        tracing::error!("Failed to fetch confirmed subscribers: {:?}", err);
        err
    })?;

    rows.iter().map(subscriber_from_row).collect()
}

#[tracing::instrument(name = "Get a subscriber by email", skip(db_pool), fields(subscriber_email = %email))]
pub async fn get_subscriber_by_email(
    db_pool: &SqlitePool,
    email: &SubscriberEmail,
) -> Result<Option<Subscriber>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM subscribers WHERE email = ?1",
        SUBSCRIBER_COLUMNS
    ))
    .bind(email.as_ref())
    .fetch_optional(db_pool)
    .await?;

    row.as_ref().map(subscriber_from_row).transpose()
}

fn subscriber_from_row(row: &SqliteRow) -> Result<Subscriber, sqlx::Error> {
    let status = SubscriberStatus::from_columns(
        row.try_get("confirmed")?,
        row.try_get("confirm_token")?,
        row.try_get("confirmed_at")?,
    )
    .map_err(decode_error)?;
    let name: Option<String> = row.try_get("name")?;
    let language: String = row.try_get("language")?;
    let interests: String = row.try_get("interests")?;

    Ok(Subscriber {
        id: row.try_get("id")?,
        email: SubscriberEmail::parse(row.try_get("email")?).map_err(decode_error)?,
        name: SubscriberName::parse(name),
        language: Language::parse_or_default(&language),
        interests: Audience::parse(&interests).map_err(decode_error)?,
        status,
        unsubscribe_token: SubscriptionToken::parse(row.try_get("unsubscribe_token")?)
            .map_err(decode_error)?,
        ip_address: row.try_get("ip_address")?,
        created_at: row.try_get("created_at")?,
    })
}
