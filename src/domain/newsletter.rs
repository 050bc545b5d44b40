use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::audience::Audience;
use crate::domain::language::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsletterStatus {
    Draft,
    Scheduled,
    Sent,
}

impl NewsletterStatus {
    pub fn parse(status: &str) -> Result<NewsletterStatus, String> {
        match status {
            "draft" => Ok(NewsletterStatus::Draft),
            "scheduled" => Ok(NewsletterStatus::Scheduled),
            "sent" => Ok(NewsletterStatus::Sent),
            _ => Err(format!("{} is not a valid newsletter status", status)),
        }
    }

    pub fn is_sendable(&self) -> bool {
        matches!(self, NewsletterStatus::Draft | NewsletterStatus::Scheduled)
    }
}

impl AsRef<str> for NewsletterStatus {
    fn as_ref(&self) -> &str {
        match self {
            NewsletterStatus::Draft => "draft",
            NewsletterStatus::Scheduled => "scheduled",
            NewsletterStatus::Sent => "sent",
        }
    }
}

/// A text written once in English and once in Dutch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct Bilingual {
    pub en: String,
    pub nl: String,
}

impl Bilingual {
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Nl => &self.nl,
            Language::En => &self.en,
        }
    }
}

/// Editable part of a newsletter.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NewsletterContent {
    pub subject: Bilingual,
    pub body: Bilingual,
    pub target: Audience,
}

#[derive(Deserialize, Debug)]
pub struct NewsletterBody {
    pub subject: Bilingual,
    pub body: Bilingual,
    pub target: Option<String>,
}

impl TryFrom<NewsletterBody> for NewsletterContent {
    type Error = String;

    fn try_from(body: NewsletterBody) -> Result<Self, Self::Error> {
        let texts = [
            ("English subject", &body.subject.en),
            ("Dutch subject", &body.subject.nl),
            ("English body", &body.body.en),
            ("Dutch body", &body.body.nl),
        ];
        if let Some((field, _)) = texts.iter().find(|(_, text)| text.trim().is_empty()) {
            return Err(format!("{} cannot be empty", field));
        }

        Ok(NewsletterContent {
            target: Audience::parse_or_default(body.target.as_deref()),
            subject: body.subject,
            body: body.body,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Newsletter {
    pub id: i64,
    #[serde(flatten)]
    pub content: NewsletterContent,
    pub status: NewsletterStatus,
    pub created_at: DateTime<Utc>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub sent_count: i64,
}

impl Newsletter {
    /// Subject and body for a recipient reading `language`.
    pub fn variant(&self, language: Language) -> (&str, &str) {
        (
            self.content.subject.get(language),
            self.content.body.get(language),
        )
    }
}
