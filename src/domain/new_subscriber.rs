use serde::Deserialize;

use crate::domain::audience::Audience;
use crate::domain::language::Language;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_name::SubscriberName;

#[derive(Debug)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub name: Option<SubscriberName>,
    pub interests: Audience,
    pub language: Language,
    pub ip_address: String,
}

#[derive(Deserialize)]
pub struct NewSubscriberBody {
    pub email: String,
    pub name: Option<String>,
    pub interests: Option<String>,
    pub language: Option<String>,
}

impl NewSubscriber {
    /// `language` and `ip_address` come from the request itself; a `language` field in the
    /// body overrides the detected one.
    pub fn try_from_body(
        body: NewSubscriberBody,
        detected_language: Language,
        ip_address: String,
    ) -> Result<Self, String> {
        let email = SubscriberEmail::parse(body.email)?;
        let name = SubscriberName::parse(body.name);
        let interests = Audience::parse_or_default(body.interests.as_deref());
        let language = body
            .language
            .as_deref()
            .and_then(Language::parse)
            .unwrap_or(detected_language);

        Ok(NewSubscriber {
            email,
            name,
            interests,
            language,
            ip_address,
        })
    }
}
