use validator::validate_email;

/// An email address as stored: trimmed and lower-cased, so the unique index sees one key per mailbox.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(email: String) -> Result<SubscriberEmail, String> {
        let normalized = email.trim().to_lowercase();
        let is_valid_email = validate_email(normalized.as_str()) && has_public_tld(&normalized);

        if !is_valid_email {
            return Err(format!("{} email is not valid", email));
        }

        Ok(Self(normalized))
    }
}

/// The domain must end in a dot and at least two letters; `ann@localhost` is not deliverable.
fn has_public_tld(email: &str) -> bool {
    email
        .rsplit_once('@')
        .and_then(|(_, domain)| domain.rsplit_once('.'))
        .map(|(host, tld)| {
            !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        })
        .unwrap_or(false)
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
