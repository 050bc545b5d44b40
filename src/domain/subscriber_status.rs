use chrono::{DateTime, Utc};

use crate::domain::subscription_token::SubscriptionToken;

/// Confirmation state of a stored subscriber.
///
/// Unsubscribed is not a status: unsubscribing deletes the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriberStatus {
    Pending { confirm_token: SubscriptionToken },
    Confirmed { confirmed_at: DateTime<Utc> },
}

impl SubscriberStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubscriberStatus::Pending { .. })
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubscriberStatus::Confirmed { .. })
    }

    pub fn confirm_token(&self) -> Option<&SubscriptionToken> {
        match self {
            SubscriberStatus::Pending { confirm_token } => Some(confirm_token),
            SubscriberStatus::Confirmed { .. } => None,
        }
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SubscriberStatus::Pending { .. } => None,
            SubscriberStatus::Confirmed { confirmed_at } => Some(*confirmed_at),
        }
    }

    /// Rebuilds the status from its three storage columns, rejecting combinations
    /// the state machine can never produce.
    pub fn from_columns(
        confirmed: bool,
        confirm_token: Option<String>,
        confirmed_at: Option<DateTime<Utc>>,
    ) -> Result<SubscriberStatus, String> {
        match (confirmed, confirm_token, confirmed_at) {
            (false, Some(token), None) => Ok(SubscriberStatus::Pending {
                confirm_token: SubscriptionToken::parse(token)?,
            }),
            (true, None, Some(confirmed_at)) => Ok(SubscriberStatus::Confirmed { confirmed_at }),
            (confirmed, token, confirmed_at) => Err(format!(
                "inconsistent subscriber status: confirmed={}, confirm_token present={}, confirmed_at present={}",
                confirmed,
                token.is_some(),
                confirmed_at.is_some()
            )),
        }
    }
}
