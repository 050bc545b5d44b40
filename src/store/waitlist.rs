use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::waitlist::NewWaitlistEntry;

/// Returns `true` when the entry was added, `false` when the email is already on the list.
#[tracing::instrument(
    name = "Add an entry to the waitlist",
    skip(db_pool, entry),
    fields(email = %entry.email, product = %entry.product.as_ref())
)]
pub async fn add_to_waitlist(
    db_pool: &SqlitePool,
    entry: &NewWaitlistEntry,
) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO waitlist (email, name, product, language, ip_address, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(entry.email.as_ref())
    .bind(entry.name.as_ref().map(|name| name.as_ref().to_string()))
    .bind(entry.product.as_ref())
    .bind(entry.language.as_ref())
    .bind(entry.ip_address.as_str())
    .bind(Utc::now())
    .execute(db_pool)
    .await
    .map_err(|err| {
        tracing::error!("Failed to insert waitlist entry: {:?}", err);
        err
    })?
    .rows_affected();

    Ok(inserted == 1)
}
