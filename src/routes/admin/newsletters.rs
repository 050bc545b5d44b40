use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, ResponseError};
use serde_json::json;
use sqlx::SqlitePool;

use crate::dispatch::{send_newsletter, DispatchError};
use crate::domain::audience::Audience;
use crate::domain::language::Language;
use crate::domain::newsletter::{NewsletterBody, NewsletterContent};
use crate::mail::Mailer;
use crate::routes::error_chain_fmt;
use crate::store::newsletters::{
    create_newsletter, delete_newsletter, get_newsletter, list_newsletters, schedule_newsletter,
    update_newsletter,
};
use crate::store::subscribers::get_confirmed_subscribers;

#[derive(thiserror::Error)]
pub enum NewsletterError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Newsletter {0} does not exist.")]
    NotFound(i64),
    #[error("Newsletter {0} is no longer a draft.")]
    NotDraft(i64),
    #[error("Failed to access the newsletter store.")]
    StoreError(#[from] sqlx::Error),
}

impl std::fmt::Debug for NewsletterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for NewsletterError {
    fn status_code(&self) -> StatusCode {
        match self {
            NewsletterError::ValidationError(_) => StatusCode::BAD_REQUEST,
            NewsletterError::NotFound(_) => StatusCode::NOT_FOUND,
            NewsletterError::NotDraft(_) => StatusCode::CONFLICT,
            NewsletterError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Turns a refused draft-only transition into the right error: missing or no longer a draft.
async fn refusal(db_pool: &SqlitePool, newsletter_id: i64) -> NewsletterError {
    match get_newsletter(db_pool, newsletter_id).await {
        Ok(Some(_)) => NewsletterError::NotDraft(newsletter_id),
        Ok(None) => NewsletterError::NotFound(newsletter_id),
        Err(err) => NewsletterError::StoreError(err),
    }
}

#[tracing::instrument(name = "List newsletters handler", skip(db_pool))]
pub async fn handle_list_newsletters(
    db_pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, NewsletterError> {
    let newsletters = list_newsletters(&db_pool).await?;
    let confirmed_subscribers = get_confirmed_subscribers(&db_pool, Audience::All)
        .await?
        .len();

    Ok(HttpResponse::Ok().json(json!({
        "newsletters": newsletters,
        "confirmed_subscribers": confirmed_subscribers,
    })))
}

#[tracing::instrument(name = "Create newsletter handler", skip(db_pool, body))]
pub async fn handle_create_newsletter(
    body: web::Json<NewsletterBody>,
    db_pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, NewsletterError> {
    let content: NewsletterContent = body
        .into_inner()
        .try_into()
        .map_err(NewsletterError::ValidationError)?;

    let newsletter_id = create_newsletter(&db_pool, &content).await?;

    Ok(HttpResponse::Created().json(json!({ "id": newsletter_id })))
}

#[tracing::instrument(name = "Get newsletter handler", skip(db_pool))]
pub async fn handle_get_newsletter(
    path: web::Path<i64>,
    db_pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, NewsletterError> {
    let newsletter_id = path.into_inner();
    let newsletter = get_newsletter(&db_pool, newsletter_id)
        .await?
        .ok_or(NewsletterError::NotFound(newsletter_id))?;
    let target_subscribers = get_confirmed_subscribers(&db_pool, newsletter.content.target)
        .await?
        .len();

    Ok(HttpResponse::Ok().json(json!({
        "newsletter": newsletter,
        "target_subscribers": target_subscribers,
    })))
}

#[tracing::instrument(name = "Update newsletter handler", skip(db_pool, body))]
pub async fn handle_update_newsletter(
    path: web::Path<i64>,
    body: web::Json<NewsletterBody>,
    db_pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, NewsletterError> {
    let newsletter_id = path.into_inner();
    let content: NewsletterContent = body
        .into_inner()
        .try_into()
        .map_err(NewsletterError::ValidationError)?;

    if !update_newsletter(&db_pool, newsletter_id, &content).await? {
        return Err(refusal(&db_pool, newsletter_id).await);
    }

    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(name = "Schedule newsletter handler", skip(db_pool))]
pub async fn handle_schedule_newsletter(
    path: web::Path<i64>,
    db_pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, NewsletterError> {
    let newsletter_id = path.into_inner();

    if !schedule_newsletter(&db_pool, newsletter_id).await? {
        return Err(refusal(&db_pool, newsletter_id).await);
    }

    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(name = "Delete newsletter handler", skip(db_pool))]
pub async fn handle_delete_newsletter(
    path: web::Path<i64>,
    db_pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, NewsletterError> {
    let newsletter_id = path.into_inner();

    if !delete_newsletter(&db_pool, newsletter_id).await? {
        return Err(refusal(&db_pool, newsletter_id).await);
    }

    Ok(HttpResponse::NoContent().finish())
}

#[tracing::instrument(
    name = "Publishing a newsletter to its audience",
    skip(db_pool, mailer)
)]
pub async fn handle_send_newsletter(
    path: web::Path<i64>,
    db_pool: web::Data<SqlitePool>,
    mailer: web::Data<Mailer>,
) -> Result<HttpResponse, DispatchError> {
    let report = send_newsletter(&db_pool, &mailer, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(report))
}

/// Shows a newsletter the way a reader of the request language would receive it.
#[tracing::instrument(name = "Preview newsletter handler", skip(request, db_pool, mailer))]
pub async fn handle_preview_newsletter(
    request: HttpRequest,
    path: web::Path<i64>,
    db_pool: web::Data<SqlitePool>,
    mailer: web::Data<Mailer>,
) -> Result<HttpResponse, NewsletterError> {
    let newsletter_id = path.into_inner();
    let newsletter = get_newsletter(&db_pool, newsletter_id)
        .await?
        .ok_or(NewsletterError::NotFound(newsletter_id))?;
    let language = Language::from_request(&request);
    let (subject, body) = newsletter.variant(language);

    Ok(HttpResponse::Ok().json(json!({
        "language": language,
        "subject": subject,
        "html": mailer.render_newsletter(body, "#", language),
    })))
}
