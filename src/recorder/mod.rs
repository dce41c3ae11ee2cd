//! Farm/prediction recorder
//!
//! Orchestrates one submission: validate the request, persist the farm
//! under the caller's identity, run the estimator, persist the
//! prediction, and compose the response. The farm insert strictly
//! precedes the prediction insert; there is no transactional wrapping,
//! so a prediction-insert failure leaves the farm row behind (logged
//! with the orphaned farm id, surfaced as a storage error).

use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::db::schemas::{FarmDoc, PredictionDoc, FARM_COLLECTION, PREDICTION_COLLECTION};
use crate::db::MongoClient;
use crate::estimator::{self, WeatherProvider, WeatherSummary};
use crate::types::CropcastError;

/// Prediction submission payload.
/// Numeric fields are optional; absent or invalid values fall back to
/// documented defaults during sanitation.
#[derive(Debug, Clone, Deserialize)]
pub struct FarmInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub crop: String,
    #[serde(default)]
    pub area_ha: Option<f64>,
    #[serde(default)]
    pub soil_ph: Option<f64>,
    #[serde(default)]
    pub soil_moisture: Option<f64>,
    #[serde(default)]
    pub organic_matter: Option<f64>,
}

/// Sanitized numeric fields with defaults applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilFigures {
    pub area_ha: f64,
    pub soil_ph: f64,
    pub soil_moisture: f64,
    pub organic_matter: f64,
}

/// Composed result of a successful submission
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub id: String,
    pub yield_per_hectare: f64,
    pub confidence_score: i32,
    pub weather_summary: WeatherSummary,
    pub farm_id: String,
    pub total_yield: f64,
}

/// Persistence seam for submissions and listings. The Mongo
/// implementation is used in production; tests substitute an in-memory
/// store.
#[async_trait]
pub trait PredictionStore: Send + Sync {
    async fn insert_farm(&self, farm: FarmDoc) -> Result<ObjectId, CropcastError>;
    async fn insert_prediction(&self, prediction: PredictionDoc) -> Result<ObjectId, CropcastError>;

    /// Total predictions stored for a user
    async fn count_predictions(&self, user_id: &str) -> Result<u64, CropcastError>;

    /// The user's most recent predictions, newest first, at most `limit`
    async fn list_recent(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<PredictionDoc>, CropcastError>;
}

/// MongoDB-backed store
pub struct MongoPredictionStore {
    mongo: MongoClient,
}

impl MongoPredictionStore {
    pub fn new(mongo: MongoClient) -> Self {
        Self { mongo }
    }
}

#[async_trait]
impl PredictionStore for MongoPredictionStore {
    async fn insert_farm(&self, farm: FarmDoc) -> Result<ObjectId, CropcastError> {
        let collection = self.mongo.collection::<FarmDoc>(FARM_COLLECTION).await?;
        collection.insert_one(farm).await
    }

    async fn insert_prediction(
        &self,
        prediction: PredictionDoc,
    ) -> Result<ObjectId, CropcastError> {
        let collection = self
            .mongo
            .collection::<PredictionDoc>(PREDICTION_COLLECTION)
            .await?;
        collection.insert_one(prediction).await
    }

    async fn count_predictions(&self, user_id: &str) -> Result<u64, CropcastError> {
        let collection = self
            .mongo
            .collection::<PredictionDoc>(PREDICTION_COLLECTION)
            .await?;
        collection.count(doc! { "user_id": user_id }).await
    }

    async fn list_recent(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<PredictionDoc>, CropcastError> {
        let collection = self
            .mongo
            .collection::<PredictionDoc>(PREDICTION_COLLECTION)
            .await?;
        collection
            .find_many_sorted(
                doc! { "user_id": user_id },
                Some(doc! { "metadata.created_at": -1 }),
                Some(limit),
            )
            .await
    }
}

/// Validate required fields. Runs before any persistence or estimation.
pub fn validate(input: &FarmInput) -> Result<(), CropcastError> {
    for (field, value) in [
        ("name", &input.name),
        ("phone", &input.phone),
        ("location", &input.location),
        ("crop", &input.crop),
    ] {
        if value.trim().is_empty() {
            return Err(CropcastError::Validation(format!(
                "Missing required field: {}",
                field
            )));
        }
    }
    Ok(())
}

/// Apply defaults to absent or invalid numeric fields:
/// area 1 ha, pH 6.5, moisture 25%, organic matter 2.5%.
pub fn sanitize(input: &FarmInput) -> SoilFigures {
    let area_ha = match input.area_ha {
        Some(a) if a.is_finite() && a > 0.0 => a,
        _ => 1.0,
    };
    SoilFigures {
        area_ha,
        soil_ph: finite_or(input.soil_ph, 6.5),
        soil_moisture: finite_or(input.soil_moisture, 25.0),
        organic_matter: finite_or(input.organic_matter, 2.5),
    }
}

fn finite_or(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => default,
    }
}

/// Process one prediction submission for an authenticated user.
///
/// Side effects: exactly one farm insert and, on success, exactly one
/// prediction insert. Identical submissions are not deduplicated.
pub async fn submit(
    user_id: &str,
    input: &FarmInput,
    store: &dyn PredictionStore,
    weather: &dyn WeatherProvider,
    model_version: &str,
) -> Result<PredictionOutcome, CropcastError> {
    validate(input)?;
    let figures = sanitize(input);

    // 1. Farm row first; a failure here aborts before any estimation
    let farm = FarmDoc::new(
        user_id.to_string(),
        input.name.trim(),
        input.location.clone(),
        input.crop.clone(),
        figures.area_ha,
        figures.soil_ph,
        figures.soil_moisture,
        figures.organic_matter,
    );
    let farm_id = store.insert_farm(farm).await?;

    // 2. Estimate and synthesize the weather snapshot
    let est = estimator::estimate(
        &input.crop,
        figures.soil_ph,
        figures.soil_moisture,
        figures.organic_matter,
    );
    let weather_summary = weather.snapshot(&input.location);

    // 3. Prediction row referencing the just-created farm. No rollback on
    // failure: the farm row remains as an accepted orphan.
    let prediction = PredictionDoc::new(
        farm_id,
        user_id.to_string(),
        est.yield_per_hectare,
        est.confidence,
        weather_summary.clone(),
        model_version.to_string(),
    );
    let prediction_id = match store.insert_prediction(prediction).await {
        Ok(id) => id,
        Err(e) => {
            error!(
                farm_id = %farm_id,
                user_id = %user_id,
                "Prediction insert failed after farm insert, orphan farm remains: {}",
                e
            );
            return Err(e);
        }
    };

    info!(
        user_id = %user_id,
        farm_id = %farm_id,
        prediction_id = %prediction_id,
        crop = %input.crop,
        "Recorded prediction ({} t/ha, confidence {})",
        est.yield_per_hectare,
        est.confidence
    );

    Ok(PredictionOutcome {
        id: prediction_id.to_hex(),
        yield_per_hectare: est.yield_per_hectare,
        confidence_score: est.confidence,
        weather_summary,
        farm_id: farm_id.to_hex(),
        total_yield: estimator::total_yield(est.yield_per_hectare, figures.area_ha),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::FixedWeather;
    use std::sync::Mutex;

    /// In-memory store recording inserts, with switchable failure points
    #[derive(Default)]
    struct MemoryStore {
        farms: Mutex<Vec<FarmDoc>>,
        predictions: Mutex<Vec<PredictionDoc>>,
        fail_farm: bool,
        fail_prediction: bool,
    }

    #[async_trait]
    impl PredictionStore for MemoryStore {
        async fn insert_farm(&self, farm: FarmDoc) -> Result<ObjectId, CropcastError> {
            if self.fail_farm {
                return Err(CropcastError::Database("farm insert refused".into()));
            }
            let id = ObjectId::new();
            let mut stored = farm;
            stored._id = Some(id);
            self.farms.lock().unwrap().push(stored);
            Ok(id)
        }

        async fn insert_prediction(
            &self,
            prediction: PredictionDoc,
        ) -> Result<ObjectId, CropcastError> {
            if self.fail_prediction {
                return Err(CropcastError::Database("prediction insert refused".into()));
            }
            let id = ObjectId::new();
            let mut stored = prediction;
            stored._id = Some(id);
            self.predictions.lock().unwrap().push(stored);
            Ok(id)
        }

        async fn count_predictions(&self, user_id: &str) -> Result<u64, CropcastError> {
            Ok(self
                .predictions
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.user_id == user_id)
                .count() as u64)
        }

        async fn list_recent(
            &self,
            user_id: &str,
            limit: i64,
        ) -> Result<Vec<PredictionDoc>, CropcastError> {
            let mut rows: Vec<PredictionDoc> = self
                .predictions
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));
            rows.truncate(limit as usize);
            Ok(rows)
        }
    }

    fn valid_input() -> FarmInput {
        FarmInput {
            name: "Wanjiku".into(),
            phone: "+254700000000".into(),
            location: "Nakuru".into(),
            crop: "maize".into(),
            area_ha: Some(2.0),
            soil_ph: Some(6.5),
            soil_moisture: Some(25.0),
            organic_matter: Some(3.0),
        }
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let store = MemoryStore::default();
        let weather = FixedWeather::default();

        let outcome = submit("user-1", &valid_input(), &store, &weather, "v1.0")
            .await
            .unwrap();

        assert_eq!(outcome.yield_per_hectare, 4.95);
        assert_eq!(outcome.confidence_score, 95);
        assert_eq!(outcome.total_yield, 9.9); // 4.95 * 2.0
        assert_eq!(outcome.weather_summary.location, "Nakuru");

        let farms = store.farms.lock().unwrap();
        let predictions = store.predictions.lock().unwrap();
        assert_eq!(farms.len(), 1);
        assert_eq!(predictions.len(), 1);
        assert_eq!(farms[0].name, "Wanjiku's maize Farm");
        assert_eq!(farms[0].user_id, "user-1");
        // prediction owner matches farm owner
        assert_eq!(predictions[0].user_id, farms[0].user_id);
        assert_eq!(predictions[0].farm_id, farms[0]._id);
        assert_eq!(predictions[0].model_version, "v1.0");
    }

    #[tokio::test]
    async fn test_empty_name_fails_before_any_persistence() {
        let store = MemoryStore::default();
        let mut input = valid_input();
        input.name = "  ".into();

        let err = submit("user-1", &input, &store, &FixedWeather::default(), "v1.0")
            .await
            .unwrap_err();

        assert!(matches!(err, CropcastError::Validation(_)));
        assert!(store.farms.lock().unwrap().is_empty());
        assert!(store.predictions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_farm_insert_failure_aborts_without_prediction() {
        let store = MemoryStore {
            fail_farm: true,
            ..Default::default()
        };

        let err = submit(
            "user-1",
            &valid_input(),
            &store,
            &FixedWeather::default(),
            "v1.0",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CropcastError::Database(_)));
        assert!(store.predictions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prediction_insert_failure_leaves_farm_row() {
        let store = MemoryStore {
            fail_prediction: true,
            ..Default::default()
        };

        let err = submit(
            "user-1",
            &valid_input(),
            &store,
            &FixedWeather::default(),
            "v1.0",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CropcastError::Database(_)));
        // Accepted inconsistency: the farm row is not rolled back
        assert_eq!(store.farms.lock().unwrap().len(), 1);
        assert!(store.predictions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_identical_submissions_create_distinct_pairs() {
        let store = MemoryStore::default();
        let weather = FixedWeather::default();
        let input = valid_input();

        let a = submit("user-1", &input, &store, &weather, "v1.0").await.unwrap();
        let b = submit("user-1", &input, &store, &weather, "v1.0").await.unwrap();

        assert_ne!(a.id, b.id);
        assert_ne!(a.farm_id, b.farm_id);
        assert_eq!(store.farms.lock().unwrap().len(), 2);
        assert_eq!(store.predictions.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_free_tier_lists_three_newest_of_ten() {
        use crate::entitlement::{visible_count, SubscriptionTier};
        use crate::estimator::WeatherSummary;

        let store = MemoryStore::default();

        // Ten predictions with strictly increasing creation times
        for i in 0..10i64 {
            let mut prediction = PredictionDoc::new(
                ObjectId::new(),
                "user-1".to_string(),
                4.95,
                95,
                WeatherSummary {
                    temperature: 25.0,
                    rainfall: 30.0,
                    humidity: 75.0,
                    location: "Nakuru".into(),
                },
                format!("v1.{}", i),
            );
            prediction.metadata.created_at = Some(bson::DateTime::from_millis(1_000 * (i + 1)));
            store.insert_prediction(prediction).await.unwrap();
        }

        let total = store.count_predictions("user-1").await.unwrap() as usize;
        assert_eq!(total, 10);

        let visible = visible_count(SubscriptionTier::Free, total);
        assert_eq!(visible, 3);

        let rows = store.list_recent("user-1", visible as i64).await.unwrap();
        assert_eq!(rows.len(), 3);
        // Newest first: the last three inserted, in descending created order
        assert_eq!(rows[0].model_version, "v1.9");
        assert_eq!(rows[1].model_version, "v1.8");
        assert_eq!(rows[2].model_version, "v1.7");

        // Premium sees everything
        let all = store
            .list_recent("user-1", visible_count(SubscriptionTier::Premium, total) as i64)
            .await
            .unwrap();
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn test_sanitize_defaults() {
        let input = FarmInput {
            name: "A".into(),
            phone: "1".into(),
            location: "L".into(),
            crop: "maize".into(),
            area_ha: None,
            soil_ph: None,
            soil_moisture: None,
            organic_matter: None,
        };
        let figures = sanitize(&input);
        assert_eq!(figures.area_ha, 1.0);
        assert_eq!(figures.soil_ph, 6.5);
        assert_eq!(figures.soil_moisture, 25.0);
        assert_eq!(figures.organic_matter, 2.5);
    }

    #[test]
    fn test_sanitize_rejects_invalid_area() {
        let mut input = valid_input();
        input.area_ha = Some(-3.0);
        assert_eq!(sanitize(&input).area_ha, 1.0);

        input.area_ha = Some(f64::NAN);
        assert_eq!(sanitize(&input).area_ha, 1.0);

        input.area_ha = Some(0.0);
        assert_eq!(sanitize(&input).area_ha, 1.0);
    }

    #[test]
    fn test_validate_reports_missing_field() {
        let mut input = valid_input();
        input.crop = String::new();
        let err = validate(&input).unwrap_err();
        match err {
            CropcastError::Validation(msg) => assert!(msg.contains("crop")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
