//! Profile document schema
//!
//! One profile per user, created lazily on first save and upserted by
//! the owning user. The subscription_tier field mirrors the billing
//! collaborator's state for dev fallback; the billing service remains
//! the source of truth when configured.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for profiles
pub const PROFILE_COLLECTION: &str = "profiles";

/// Profile document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ProfileDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Owning user id (unique)
    pub user_id: String,

    /// Display name
    #[serde(default)]
    pub display_name: String,

    /// Bio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    /// Location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Contact phone (fallback recipient for SMS notifications)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Contact email (fallback recipient for email notifications)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Total farm size in hectares
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm_size_hectares: Option<f64>,

    /// Primary crops, comma-parsed on save
    #[serde(default)]
    pub primary_crops: Vec<String>,

    /// Subscription tier as last reported (free/basic/premium)
    #[serde(default = "default_tier")]
    pub subscription_tier: String,

    /// Avatar reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

fn default_tier() -> String {
    "free".to_string()
}

impl IntoIndexes for ProfileDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "user_id": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_id_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for ProfileDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
