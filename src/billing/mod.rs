//! Billing collaborator client
//!
//! The billing service is the source of truth for subscription state.
//! The tier is resolved fresh on every request and never cached across
//! requests, since it can change mid-session (e.g. after an upgrade).
//! When no billing URL is configured (dev/stub), the stored profile tier
//! is used instead; unknown or missing tiers resolve to free.

use bson::doc;
use serde::Deserialize;
use tracing::warn;

use crate::db::schemas::{ProfileDoc, PROFILE_COLLECTION};
use crate::db::MongoClient;
use crate::entitlement::SubscriptionTier;
use crate::types::CropcastError;

/// Response shape from the billing service
#[derive(Debug, Deserialize)]
struct SubscriptionResponse {
    tier: String,
}

/// Client for subscription tier lookups
#[derive(Clone)]
pub struct BillingClient {
    http: reqwest::Client,
    base_url: Option<String>,
}

impl BillingClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    /// Whether a billing service is configured
    pub fn configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Fetch the current tier from the billing service.
    /// Errors propagate; the core does not retry.
    async fn fetch_tier(&self, base: &str, user_id: &str) -> Result<SubscriptionTier, CropcastError> {
        let url = format!("{}/v1/subscriptions/{}", base, user_id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CropcastError::Http(format!("Billing request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CropcastError::Http(format!(
                "Billing service returned {}",
                response.status()
            )));
        }

        let body: SubscriptionResponse = response
            .json()
            .await
            .map_err(|e| CropcastError::Http(format!("Invalid billing response: {}", e)))?;

        // Unknown tier strings fail closed to free
        Ok(body.tier.parse().unwrap_or_default())
    }

    /// Resolve the user's current subscription tier.
    ///
    /// Billing service when configured; stored profile tier as the dev
    /// fallback; free when neither is available.
    pub async fn subscription_tier(
        &self,
        user_id: &str,
        mongo: Option<&MongoClient>,
    ) -> Result<SubscriptionTier, CropcastError> {
        if let Some(ref base) = self.base_url {
            return self.fetch_tier(base, user_id).await;
        }

        let Some(mongo) = mongo else {
            return Ok(SubscriptionTier::Free);
        };

        let collection = mongo.collection::<ProfileDoc>(PROFILE_COLLECTION).await?;
        match collection.find_one(doc! { "user_id": user_id }).await {
            Ok(Some(profile)) => Ok(profile.subscription_tier.parse().unwrap_or_default()),
            Ok(None) => Ok(SubscriptionTier::Free),
            Err(e) => {
                warn!("Tier lookup failed for {}, treating as free: {}", user_id, e);
                Ok(SubscriptionTier::Free)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_without_db_resolves_free() {
        let client = BillingClient::new(None);
        assert!(!client.configured());
        let tier = client.subscription_tier("user-1", None).await.unwrap();
        assert_eq!(tier, SubscriptionTier::Free);
    }

    #[test]
    fn test_base_url_normalization() {
        let client = BillingClient::new(Some("http://billing:9000/".into()));
        assert!(client.configured());
        assert_eq!(client.base_url.as_deref(), Some("http://billing:9000"));
    }
}
