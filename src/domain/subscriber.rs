use chrono::{DateTime, Utc};

use crate::domain::audience::Audience;
use crate::domain::language::Language;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_name::SubscriberName;
use crate::domain::subscriber_status::SubscriberStatus;
use crate::domain::subscription_token::SubscriptionToken;

#[derive(Debug, Clone)]
pub struct Subscriber {
    pub id: i64,
    pub email: SubscriberEmail,
    pub name: Option<SubscriberName>,
    pub language: Language,
    pub interests: Audience,
    pub status: SubscriberStatus,
    pub unsubscribe_token: SubscriptionToken,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of a subscribe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// A new pending record was stored with fresh tokens.
    Created {
        confirm_token: SubscriptionToken,
        unsubscribe_token: SubscriptionToken,
    },
    /// The address was already waiting for confirmation; its original tokens are returned
    /// so earlier confirmation links keep working.
    PendingConfirmation {
        confirm_token: SubscriptionToken,
        unsubscribe_token: SubscriptionToken,
    },
    /// Nothing to send.
    AlreadyConfirmed { unsubscribe_token: SubscriptionToken },
}

impl SubscribeOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, SubscribeOutcome::Created { .. })
    }

    pub fn confirm_token(&self) -> Option<&SubscriptionToken> {
        match self {
            SubscribeOutcome::Created { confirm_token, .. }
            | SubscribeOutcome::PendingConfirmation { confirm_token, .. } => Some(confirm_token),
            SubscribeOutcome::AlreadyConfirmed { .. } => None,
        }
    }

    pub fn unsubscribe_token(&self) -> &SubscriptionToken {
        match self {
            SubscribeOutcome::Created {
                unsubscribe_token, ..
            }
            | SubscribeOutcome::PendingConfirmation {
                unsubscribe_token, ..
            }
            | SubscribeOutcome::AlreadyConfirmed { unsubscribe_token } => unsubscribe_token,
        }
    }
}
