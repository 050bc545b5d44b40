use rand::Rng;

// 43 alphanumeric characters carry a little over 256 bits of entropy.
const TOKEN_LENGTH: usize = 43;
const MAX_TOKEN_LENGTH: usize = 64;

/// Opaque credential embedded in confirmation and unsubscribe links.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubscriptionToken(String);

impl SubscriptionToken {
    pub fn generate() -> SubscriptionToken {
        let mut rng = rand::thread_rng();

        let token = std::iter::repeat_with(|| rng.sample(rand::distributions::Alphanumeric))
            .map(char::from)
            .take(TOKEN_LENGTH)
            .collect();

        Self(token)
    }

    /// Validates a token coming from a link before it is used as a lookup key.
    pub fn parse(token: String) -> Result<SubscriptionToken, String> {
        let is_empty = token.is_empty();
        let is_too_long = token.len() > MAX_TOKEN_LENGTH;
        let has_invalid_chars = !token.chars().all(|c| c.is_ascii_alphanumeric());

        if is_empty || is_too_long || has_invalid_chars {
            return Err(format!("{} is not a valid subscription token", token));
        }

        Ok(Self(token))
    }
}

impl AsRef<str> for SubscriptionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
