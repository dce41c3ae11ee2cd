//! Prediction listing endpoint
//!
//! GET /api/predictions
//!
//! The subscription tier is resolved fresh for every call; free and
//! basic tiers see at most the three most recent predictions, premium
//! sees all. The response carries total and visible counts so the UI
//! can render an upgrade prompt for hidden rows.

use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::db::schemas::PredictionDoc;
use crate::entitlement::{visible_count, SubscriptionTier};
use crate::recorder::PredictionStore;
use crate::estimator::WeatherSummary;
use crate::routes::{
    error_response, get_auth_header, json_response, require_auth, BoxBody, ErrorResponse,
};
use crate::server::AppState;

#[derive(Debug, Serialize)]
struct PredictionListItem {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    farm_id: Option<String>,
    yield_per_hectare: f64,
    confidence_score: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    weather_summary: Option<WeatherSummary>,
    model_version: String,
    created_at: String,
}

#[derive(Debug, Serialize)]
struct PredictionListResponse {
    predictions: Vec<PredictionListItem>,
    /// Total predictions stored for this user
    total: usize,
    /// How many the current tier may see
    visible: usize,
    tier: SubscriptionTier,
}

fn to_list_item(doc: PredictionDoc) -> PredictionListItem {
    PredictionListItem {
        id: doc._id.map(|id| id.to_hex()).unwrap_or_default(),
        farm_id: doc.farm_id.map(|id| id.to_hex()),
        yield_per_hectare: doc.yield_per_hectare,
        confidence_score: doc.confidence_score,
        weather_summary: doc.weather_summary,
        model_version: doc.model_version,
        created_at: doc
            .metadata
            .created_at
            .and_then(|t| t.try_to_rfc3339_string().ok())
            .unwrap_or_default(),
    }
}

/// GET /api/predictions
pub async fn handle_list_predictions(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let auth_header = get_auth_header(&req);
    let claims = match require_auth(auth_header.as_deref(), &state) {
        Ok(c) => c,
        Err(resp) => return *resp,
    };

    let store = match &state.store {
        Some(s) => s,
        None => {
            return json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                &ErrorResponse {
                    error: "Database not available".into(),
                    code: Some("DB_UNAVAILABLE".into()),
                },
            )
        }
    };

    // Tier is read fresh on every listing, never memoized
    let tier = match state
        .billing
        .subscription_tier(&claims.sub, state.mongo.as_ref())
        .await
    {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };

    let total = match store.count_predictions(&claims.sub).await {
        Ok(n) => n as usize,
        Err(e) => return error_response(&e),
    };

    let visible = visible_count(tier, total);

    let docs = if visible == 0 {
        Vec::new()
    } else {
        match store.list_recent(&claims.sub, visible as i64).await {
            Ok(d) => d,
            Err(e) => return error_response(&e),
        }
    };

    let predictions: Vec<PredictionListItem> = docs.into_iter().map(to_list_item).collect();

    json_response(
        StatusCode::OK,
        &PredictionListResponse {
            predictions,
            total,
            visible,
            tier,
        },
    )
}
