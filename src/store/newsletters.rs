use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::domain::audience::Audience;
use crate::domain::newsletter::{Bilingual, Newsletter, NewsletterContent, NewsletterStatus};
use crate::store::decode_error;

const NEWSLETTER_COLUMNS: &str = "id, subject_en, subject_nl, body_en, body_nl, target, status, \
     created_at, scheduled_at, sent_at, sent_count";

/// Stores a new draft and returns its id.
#[tracing::instrument(name = "Create a newsletter", skip(db_pool, content), fields(target = %content.target.as_ref()))]
pub async fn create_newsletter(
    db_pool: &SqlitePool,
    content: &NewsletterContent,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO newsletters (subject_en, subject_nl, body_en, body_nl, target, status, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, 'draft', ?6)
        "#,
    )
    .bind(&content.subject.en)
    .bind(&content.subject.nl)
    .bind(&content.body.en)
    .bind(&content.body.nl)
    .bind(content.target.as_ref())
    .bind(Utc::now())
    .execute(db_pool)
    .await
    .map_err(|err| {
        tracing::error!("Failed to insert newsletter: {:?}", err);
        err
    })?;

    Ok(result.last_insert_rowid())
}

/// Replaces the content of a draft. Returns `false` when the newsletter is missing or no
/// longer a draft.
#[tracing::instrument(name = "Update a newsletter", skip(db_pool, content))]
pub async fn update_newsletter(
    db_pool: &SqlitePool,
    newsletter_id: i64,
    content: &NewsletterContent,
) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query(
        r#"
        UPDATE newsletters
        SET subject_en = ?1, subject_nl = ?2, body_en = ?3, body_nl = ?4, target = ?5
        WHERE id = ?6 AND status = 'draft'
        "#,
    )
    .bind(&content.subject.en)
    .bind(&content.subject.nl)
    .bind(&content.body.en)
    .bind(&content.body.nl)
    .bind(content.target.as_ref())
    .bind(newsletter_id)
    .execute(db_pool)
    .await
    .map_err(|err| {
        tracing::error!("Failed to update newsletter: {:?}", err);
        err
    })?
    .rows_affected();

    Ok(updated > 0)
}

#[tracing::instrument(name = "Get a newsletter", skip(db_pool))]
pub async fn get_newsletter(
    db_pool: &SqlitePool,
    newsletter_id: i64,
) -> Result<Option<Newsletter>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM newsletters WHERE id = ?1",
        NEWSLETTER_COLUMNS
    ))
    .bind(newsletter_id)
    .fetch_optional(db_pool)
    .await?;

    row.as_ref().map(newsletter_from_row).transpose()
}

/// Every newsletter, newest first.
#[tracing::instrument(name = "List newsletters", skip(db_pool))]
pub async fn list_newsletters(db_pool: &SqlitePool) -> Result<Vec<Newsletter>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM newsletters ORDER BY created_at DESC, id DESC",
        NEWSLETTER_COLUMNS
    ))
    .fetch_all(db_pool)
    .await?;

    rows.iter().map(newsletter_from_row).collect()
}

/// Moves a draft to scheduled. Scheduling is a marker only: nothing sends it automatically.
#[tracing::instrument(name = "Schedule a newsletter", skip(db_pool))]
pub async fn schedule_newsletter(
    db_pool: &SqlitePool,
    newsletter_id: i64,
) -> Result<bool, sqlx::Error> {
    let scheduled = sqlx::query(
        r#"
        UPDATE newsletters SET status = 'scheduled', scheduled_at = ?1
        WHERE id = ?2 AND status = 'draft'
        "#,
    )
    .bind(Utc::now())
    .bind(newsletter_id)
    .execute(db_pool)
    .await?
    .rows_affected();

    Ok(scheduled > 0)
}

/// Records the result of a dispatch. Unlike the other transitions this one is not guarded
/// by the current status, so the delivered count is never lost.
#[tracing::instrument(name = "Mark a newsletter as sent", skip(db_pool))]
pub async fn mark_newsletter_sent(
    db_pool: &SqlitePool,
    newsletter_id: i64,
    sent_count: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE newsletters SET status = 'sent', sent_at = ?1, sent_count = ?2
        WHERE id = ?3
        "#,
    )
    .bind(Utc::now())
    .bind(sent_count)
    .bind(newsletter_id)
    .execute(db_pool)
    .await
    .map_err(|err| {
        tracing::error!("Failed to mark newsletter as sent: {:?}", err);
        err
    })?;

    Ok(())
}

/// Deletes a draft. Scheduled and sent newsletters are kept.
#[tracing::instrument(name = "Delete a newsletter", skip(db_pool))]
pub async fn delete_newsletter(
    db_pool: &SqlitePool,
    newsletter_id: i64,
) -> Result<bool, sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM newsletters WHERE id = ?1 AND status = 'draft'")
        .bind(newsletter_id)
        .execute(db_pool)
        .await?
        .rows_affected();

    Ok(deleted > 0)
}

fn newsletter_from_row(row: &SqliteRow) -> Result<Newsletter, sqlx::Error> {
    let target: String = row.try_get("target")?;
    let status: String = row.try_get("status")?;

    Ok(Newsletter {
        id: row.try_get("id")?,
        content: NewsletterContent {
            subject: Bilingual {
                en: row.try_get("subject_en")?,
                nl: row.try_get("subject_nl")?,
            },
            body: Bilingual {
                en: row.try_get("body_en")?,
                nl: row.try_get("body_nl")?,
            },
            target: Audience::parse(&target).map_err(decode_error)?,
        },
        status: NewsletterStatus::parse(&status).map_err(decode_error)?,
        created_at: row.try_get("created_at")?,
        scheduled_at: row.try_get("scheduled_at")?,
        sent_at: row.try_get("sent_at")?,
        sent_count: row.try_get("sent_count")?,
    })
}
