//! Entitlement gate: subscription-tier policy
//!
//! Stateless policy functions consulted by the recorder (premium-only
//! notification channels) and the listing routes (row-count limits).
//! Every check takes the current tier as an explicit input; the tier is
//! resolved fresh per request (see `billing`), never cached across
//! requests, since it can change mid-session after an upgrade.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Free and basic tiers see at most this many predictions in a listing
pub const FREE_ROW_LIMIT: usize = 3;

/// Subscription tiers, lowest to highest.
/// Transitions (checkout, cancellation, expiry) are owned by the billing
/// collaborator; this gate only reads the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Basic,
    Premium,
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionTier::Free => write!(f, "free"),
            SubscriptionTier::Basic => write!(f, "basic"),
            SubscriptionTier::Premium => write!(f, "premium"),
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = std::convert::Infallible;

    /// Unknown tier strings fail closed to `Free`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "premium" => SubscriptionTier::Premium,
            "basic" => SubscriptionTier::Basic,
            _ => SubscriptionTier::Free,
        })
    }
}

/// Notification channels with per-tier availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Sms,
    Email,
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationChannel::Sms => write!(f, "sms"),
            NotificationChannel::Email => write!(f, "email"),
        }
    }
}

/// True iff the tier is an active premium subscription
pub fn is_premium(tier: SubscriptionTier) -> bool {
    tier == SubscriptionTier::Premium
}

/// How many of `total` predictions the tier may see in a listing.
/// Premium is unbounded here; the UI may separately paginate.
pub fn visible_count(tier: SubscriptionTier, total: usize) -> usize {
    if is_premium(tier) {
        total
    } else {
        total.min(FREE_ROW_LIMIT)
    }
}

/// Whether the tier may use the given notification channel.
/// SMS requires premium; email does not.
pub fn channel_allowed(tier: SubscriptionTier, channel: NotificationChannel) -> bool {
    match channel {
        NotificationChannel::Sms => is_premium(tier),
        NotificationChannel::Email => true,
    }
}
