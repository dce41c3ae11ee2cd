//! HTTP routes for Cropcast
//!
//! Handlers are plain hyper functions over `AppState`. Shared helpers
//! here cover JSON responses, CORS, body parsing, and the Bearer-token
//! identity check every `/api/*` route performs.

pub mod health;
pub mod notifications;
pub mod predict;
pub mod predictions;
pub mod profile;

pub use health::{health_check, readiness_check, version_info};
pub use notifications::handle_notifications;
pub use predict::handle_predict;
pub use predictions::handle_list_predictions;
pub use profile::{handle_get_profile, handle_put_profile};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{extract_token_from_header, Claims};
use crate::server::AppState;
use crate::types::CropcastError;

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Error payload: stable machine-readable code plus a human message
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(full_body(json))
        .unwrap()
}

/// Map a core error onto its HTTP status and machine-readable code
pub fn error_response(err: &CropcastError) -> Response<BoxBody> {
    json_response(
        err.status_code(),
        &ErrorResponse {
            error: err.to_string(),
            code: Some(err.code().to_string()),
        },
    )
}

pub fn not_found_response(path: &str) -> Response<BoxBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &ErrorResponse {
            error: format!("Not found: {}", path),
            code: Some("NOT_FOUND".into()),
        },
    )
}

pub fn cors_preflight() -> Response<BoxBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .header("Access-Control-Max-Age", "86400")
        .body(empty_body())
        .unwrap()
}

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

pub async fn parse_json_body<T: for<'de> Deserialize<'de>>(
    req: Request<hyper::body::Incoming>,
) -> Result<T, CropcastError> {
    let body = req
        .collect()
        .await
        .map_err(|e| CropcastError::Validation(format!("Failed to read body: {}", e)))?;

    let bytes = body.to_bytes();
    if bytes.len() > 10240 {
        return Err(CropcastError::Validation("Request body too large".into()));
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| CropcastError::Validation(format!("Invalid JSON: {}", e)))
}

pub fn get_auth_header(req: &Request<hyper::body::Incoming>) -> Option<String> {
    req.headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Validate the Bearer token and return its claims, or the 401 response
/// to send back. Identity is checked before anything else in a handler.
pub fn require_auth(
    auth_header: Option<&str>,
    state: &Arc<AppState>,
) -> Result<Claims, Box<Response<BoxBody>>> {
    let token = match extract_token_from_header(auth_header) {
        Some(t) => t,
        None => {
            return Err(Box::new(error_response(&CropcastError::Auth(
                "No token provided, please sign in".into(),
            ))))
        }
    };

    let result = state.jwt.verify_token(token);
    match result.claims {
        Some(claims) if result.valid => Ok(claims),
        _ => Err(Box::new(error_response(&CropcastError::Auth(
            result.error.unwrap_or_else(|| "Invalid token".into()),
        )))),
    }
}
