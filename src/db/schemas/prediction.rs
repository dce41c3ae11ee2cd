//! Prediction document schema
//!
//! One prediction per submission, referencing the farm created in the
//! same request. Immutable after insert. Many predictions may reference
//! one farm, though the current flow always creates a fresh farm.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::estimator::WeatherSummary;

/// Collection name for predictions
pub const PREDICTION_COLLECTION: &str = "predictions";

/// Prediction document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PredictionDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// The farm this prediction belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm_id: Option<ObjectId>,

    /// Owning user id; must equal the farm's user_id
    pub user_id: String,

    /// Expected yield in tonnes per hectare, 2-decimal rounded
    pub yield_per_hectare: f64,

    /// Confidence score as computed by the estimator (capped at 95)
    pub confidence_score: i32,

    /// Weather snapshot used for this prediction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_summary: Option<WeatherSummary>,

    /// Estimator model version tag
    pub model_version: String,
}

impl PredictionDoc {
    pub fn new(
        farm_id: ObjectId,
        user_id: String,
        yield_per_hectare: f64,
        confidence_score: i32,
        weather_summary: WeatherSummary,
        model_version: String,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            farm_id: Some(farm_id),
            user_id,
            yield_per_hectare,
            confidence_score,
            weather_summary: Some(weather_summary),
            model_version,
        }
    }
}

impl IntoIndexes for PredictionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "user_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("user_id_index".to_string())
                        .build(),
                ),
            ),
            // Listings are newest-first
            (
                doc! { "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("created_at_desc_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for PredictionDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
