//! Document schemas for Cropcast collections

pub mod farm;
pub mod metadata;
pub mod prediction;
pub mod profile;

pub use farm::{FarmDoc, FARM_COLLECTION};
pub use metadata::Metadata;
pub use prediction::{PredictionDoc, PREDICTION_COLLECTION};
pub use profile::{ProfileDoc, PROFILE_COLLECTION};
