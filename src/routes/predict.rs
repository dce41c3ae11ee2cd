//! Prediction submission endpoint
//!
//! POST /api/predict
//!
//! Flow: identity check, body parse, then the recorder validates,
//! persists the farm, estimates, and persists the prediction. The
//! composed result echoes the figures the UI renders.

use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::recorder::{self, FarmInput, PredictionOutcome};
use crate::routes::{
    error_response, get_auth_header, json_response, parse_json_body, require_auth, BoxBody,
    ErrorResponse,
};
use crate::server::AppState;

#[derive(Debug, Serialize)]
struct PredictResponse {
    success: bool,
    prediction: PredictionOutcome,
}

/// POST /api/predict
pub async fn handle_predict(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let auth_header = get_auth_header(&req);
    let claims = match require_auth(auth_header.as_deref(), &state) {
        Ok(c) => c,
        Err(resp) => return *resp,
    };

    let input: FarmInput = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
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

    match recorder::submit(
        &claims.sub,
        &input,
        store.as_ref(),
        state.weather.as_ref(),
        &state.args.model_version,
    )
    .await
    {
        Ok(outcome) => json_response(
            StatusCode::OK,
            &PredictResponse {
                success: true,
                prediction: outcome,
            },
        ),
        Err(e) => error_response(&e),
    }
}
