//! Farm document schema
//!
//! One farm row per prediction request, created under the submitting
//! user's identity. Farms are write-once: never updated or deleted by
//! this service.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for farms
pub const FARM_COLLECTION: &str = "farms";

/// Farm document stored in MongoDB.
/// Field names are the wire contract other collaborators depend on.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct FarmDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Owning user id (from the authenticated identity)
    pub user_id: String,

    /// Derived display name: "<farmer name>'s <crop> Farm"
    pub name: String,

    /// Location (free text from the request)
    pub location: String,

    /// Crop type as submitted
    pub crop_type: String,

    /// Farm area in hectares
    pub area_hectares: f64,

    /// Soil pH
    pub soil_ph: f64,

    /// Soil moisture percentage
    pub soil_moisture: f64,

    /// Organic matter percentage
    pub organic_matter: f64,
}

impl FarmDoc {
    /// Create a new farm document with the derived display name
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        farmer_name: &str,
        location: String,
        crop_type: String,
        area_hectares: f64,
        soil_ph: f64,
        soil_moisture: f64,
        organic_matter: f64,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            user_id,
            name: format!("{}'s {} Farm", farmer_name, crop_type),
            location,
            crop_type,
            area_hectares,
            soil_ph,
            soil_moisture,
            organic_matter,
        }
    }
}

impl IntoIndexes for FarmDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "user_id": 1 },
            Some(
                IndexOptions::builder()
                    .name("user_id_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for FarmDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
