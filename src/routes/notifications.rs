//! Notification endpoint
//!
//! POST /api/notifications
//!
//! Dispatches an SMS or email notification. SMS requires a premium
//! subscription; the tier is resolved fresh for every call so an
//! upgrade takes effect immediately.

use bson::doc;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use tracing::warn;

use crate::db::schemas::{ProfileDoc, PROFILE_COLLECTION};
use crate::notify::{self, NotificationRequest};
use crate::routes::{
    error_response, get_auth_header, json_response, parse_json_body, require_auth, BoxBody,
};
use crate::server::AppState;

/// POST /api/notifications
pub async fn handle_notifications(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let auth_header = get_auth_header(&req);
    let claims = match require_auth(auth_header.as_deref(), &state) {
        Ok(c) => c,
        Err(resp) => return *resp,
    };

    let body: NotificationRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    // Tier is read fresh per invocation, never cached across requests
    let tier = match state
        .billing
        .subscription_tier(&claims.sub, state.mongo.as_ref())
        .await
    {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };

    // Profile is the fallback source for the recipient contact
    let profile = match &state.mongo {
        Some(mongo) => match mongo.collection::<ProfileDoc>(PROFILE_COLLECTION).await {
            Ok(collection) => match collection.find_one(doc! { "user_id": &claims.sub }).await {
                Ok(p) => p,
                Err(e) => {
                    warn!("Profile lookup failed for {}: {}", claims.sub, e);
                    None
                }
            },
            Err(e) => {
                warn!("Profile collection unavailable: {}", e);
                None
            }
        },
        None => None,
    };

    match notify::send(tier, &body, profile.as_ref()) {
        Ok(response) => json_response(StatusCode::OK, &response),
        Err(e) => error_response(&e),
    }
}
