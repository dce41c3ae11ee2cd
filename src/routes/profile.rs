//! Profile endpoints
//!
//! GET /api/profile  - fetch the caller's profile
//! PUT /api/profile  - upsert the caller's profile (created lazily on
//!                     first save)
//!
//! The subscription tier is not writable here; tier transitions belong
//! to the billing collaborator.

use bson::doc;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::db::schemas::{ProfileDoc, PROFILE_COLLECTION};
use crate::routes::{
    error_response, get_auth_header, json_response, parse_json_body, require_auth, BoxBody,
    ErrorResponse,
};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub farm_size_hectares: Option<f64>,
    /// Comma-separated list, e.g. "maize, beans"; parsed on save
    #[serde(default)]
    pub primary_crops: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProfileResponse {
    user_id: String,
    display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    farm_size_hectares: Option<f64>,
    primary_crops: Vec<String>,
    subscription_tier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
}

impl From<ProfileDoc> for ProfileResponse {
    fn from(doc: ProfileDoc) -> Self {
        Self {
            user_id: doc.user_id,
            display_name: doc.display_name,
            bio: doc.bio,
            location: doc.location,
            phone: doc.phone,
            email: doc.email,
            farm_size_hectares: doc.farm_size_hectares,
            primary_crops: doc.primary_crops,
            subscription_tier: doc.subscription_tier,
            avatar_url: doc.avatar_url,
        }
    }
}

/// Parse a comma-separated crop list into trimmed, non-empty entries
pub fn parse_primary_crops(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// GET /api/profile
pub async fn handle_get_profile(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let auth_header = get_auth_header(&req);
    let claims = match require_auth(auth_header.as_deref(), &state) {
        Ok(c) => c,
        Err(resp) => return *resp,
    };

    let mongo = match &state.mongo {
        Some(m) => m,
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

    let collection = match mongo.collection::<ProfileDoc>(PROFILE_COLLECTION).await {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match collection.find_one(doc! { "user_id": &claims.sub }).await {
        Ok(Some(profile)) => json_response(StatusCode::OK, &ProfileResponse::from(profile)),
        Ok(None) => json_response(
            StatusCode::NOT_FOUND,
            &ErrorResponse {
                error: "Profile not found".into(),
                code: Some("PROFILE_NOT_FOUND".into()),
            },
        ),
        Err(e) => error_response(&e),
    }
}

/// PUT /api/profile
pub async fn handle_put_profile(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let auth_header = get_auth_header(&req);
    let claims = match require_auth(auth_header.as_deref(), &state) {
        Ok(c) => c,
        Err(resp) => return *resp,
    };

    let body: ProfileUpdateRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    let mongo = match &state.mongo {
        Some(m) => m,
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

    let collection = match mongo.collection::<ProfileDoc>(PROFILE_COLLECTION).await {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    // Only provided fields are written; absent fields keep their stored value
    let mut set_fields = doc! { "user_id": &claims.sub };
    if let Some(v) = &body.display_name {
        set_fields.insert("display_name", v);
    }
    if let Some(v) = &body.bio {
        set_fields.insert("bio", v);
    }
    if let Some(v) = &body.location {
        set_fields.insert("location", v);
    }
    if let Some(v) = &body.phone {
        set_fields.insert("phone", v);
    }
    if let Some(v) = &body.email {
        set_fields.insert("email", v);
    }
    if let Some(v) = body.farm_size_hectares {
        set_fields.insert("farm_size_hectares", v);
    }
    if let Some(raw) = &body.primary_crops {
        set_fields.insert("primary_crops", parse_primary_crops(raw));
    }
    if let Some(v) = &body.avatar_url {
        set_fields.insert("avatar_url", v);
    }

    if let Err(e) = collection
        .upsert_one(doc! { "user_id": &claims.sub }, set_fields)
        .await
    {
        return error_response(&e);
    }

    info!("Profile saved for user {}", claims.sub);

    // Return the saved profile
    match collection.find_one(doc! { "user_id": &claims.sub }).await {
        Ok(Some(profile)) => json_response(StatusCode::OK, &ProfileResponse::from(profile)),
        Ok(None) => error_response(&crate::types::CropcastError::Database(
            "Profile missing after upsert".into(),
        )),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primary_crops() {
        assert_eq!(
            parse_primary_crops("maize, beans ,rice"),
            vec!["maize", "beans", "rice"]
        );
        assert_eq!(parse_primary_crops(""), Vec::<String>::new());
        assert_eq!(parse_primary_crops(" , ,"), Vec::<String>::new());
        assert_eq!(parse_primary_crops("tomato"), vec!["tomato"]);
    }
}
