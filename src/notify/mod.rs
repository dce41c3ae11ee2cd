//! Notification sink
//!
//! Dispatches SMS/email notifications with a premium gate on the SMS
//! channel. Delivery is mocked: a receipt is composed and logged; real
//! SMS/email provider integration is out of scope.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::schemas::ProfileDoc;
use crate::entitlement::{channel_allowed, NotificationChannel, SubscriptionTier};
use crate::types::CropcastError;

/// Inbound notification request
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRequest {
    #[serde(rename = "type")]
    pub channel: NotificationChannel,
    pub message: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Delivery receipt for one dispatched notification
#[derive(Debug, Clone, Serialize)]
pub struct NotificationReceipt {
    #[serde(rename = "type")]
    pub channel: NotificationChannel,
    pub recipient: String,
    pub status: &'static str,
    pub timestamp: String,
}

/// Response for a notification request
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub success: bool,
    pub notifications: Vec<NotificationReceipt>,
    pub premium_features_used: bool,
}

/// Dispatch a notification for a user at the given tier.
///
/// SMS while not premium fails closed with a premium-required error,
/// never a silent downgrade to another channel. The recipient comes from
/// the request, falling back to the stored profile contact.
pub fn send(
    tier: SubscriptionTier,
    request: &NotificationRequest,
    profile: Option<&ProfileDoc>,
) -> Result<NotificationResponse, CropcastError> {
    if !channel_allowed(tier, request.channel) {
        return Err(CropcastError::PremiumRequired(format!(
            "{} notifications require a premium subscription; upgrade to enable them",
            request.channel
        )));
    }

    if request.message.trim().is_empty() {
        return Err(CropcastError::Validation(
            "Missing required field: message".into(),
        ));
    }

    let recipient = match request.channel {
        NotificationChannel::Sms => request
            .phone
            .clone()
            .or_else(|| profile.and_then(|p| p.phone.clone())),
        NotificationChannel::Email => request
            .email
            .clone()
            .or_else(|| profile.and_then(|p| p.email.clone())),
    };

    let recipient = recipient.filter(|r| !r.trim().is_empty()).ok_or_else(|| {
        CropcastError::Validation(format!(
            "No {} recipient provided and none on the profile",
            request.channel
        ))
    })?;

    // Mock delivery: compose the receipt and log it
    let receipt = NotificationReceipt {
        channel: request.channel,
        recipient,
        status: "sent",
        timestamp: Utc::now().to_rfc3339(),
    };

    info!(
        channel = %receipt.channel,
        recipient = %receipt.recipient,
        "Notification dispatched (mock delivery)"
    );

    Ok(NotificationResponse {
        success: true,
        premium_features_used: request.channel == NotificationChannel::Sms,
        notifications: vec![receipt],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sms_request() -> NotificationRequest {
        NotificationRequest {
            channel: NotificationChannel::Sms,
            message: "Your maize yield estimate is ready".into(),
            phone: Some("+254700000000".into()),
            email: None,
        }
    }

    fn email_request() -> NotificationRequest {
        NotificationRequest {
            channel: NotificationChannel::Email,
            message: "Your maize yield estimate is ready".into(),
            phone: None,
            email: Some("farmer@example.com".into()),
        }
    }

    #[test]
    fn test_sms_denied_for_free_tier() {
        let err = send(SubscriptionTier::Free, &sms_request(), None).unwrap_err();
        assert!(matches!(err, CropcastError::PremiumRequired(_)));
    }

    #[test]
    fn test_sms_denied_for_basic_tier() {
        let err = send(SubscriptionTier::Basic, &sms_request(), None).unwrap_err();
        assert!(matches!(err, CropcastError::PremiumRequired(_)));
    }

    #[test]
    fn test_sms_allowed_for_premium() {
        let response = send(SubscriptionTier::Premium, &sms_request(), None).unwrap();
        assert!(response.success);
        assert!(response.premium_features_used);
        assert_eq!(response.notifications.len(), 1);
        assert_eq!(response.notifications[0].recipient, "+254700000000");
        assert_eq!(response.notifications[0].status, "sent");
    }

    #[test]
    fn test_email_allowed_for_free_tier() {
        let response = send(SubscriptionTier::Free, &email_request(), None).unwrap();
        assert!(response.success);
        assert!(!response.premium_features_used);
    }

    #[test]
    fn test_profile_contact_fallback() {
        let mut request = sms_request();
        request.phone = None;

        let profile = ProfileDoc {
            user_id: "user-1".into(),
            phone: Some("+254711111111".into()),
            ..Default::default()
        };

        let response = send(SubscriptionTier::Premium, &request, Some(&profile)).unwrap();
        assert_eq!(response.notifications[0].recipient, "+254711111111");
    }

    #[test]
    fn test_missing_recipient_rejected() {
        let mut request = email_request();
        request.email = None;
        let err = send(SubscriptionTier::Free, &request, None).unwrap_err();
        assert!(matches!(err, CropcastError::Validation(_)));
    }

    #[test]
    fn test_empty_message_rejected() {
        let mut request = email_request();
        request.message = "  ".into();
        let err = send(SubscriptionTier::Free, &request, None).unwrap_err();
        assert!(matches!(err, CropcastError::Validation(_)));
    }
}
