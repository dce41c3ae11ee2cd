//! Cropcast - crop yield estimation service
//!
//! Cropcast accepts authenticated farm/soil submissions, estimates the
//! expected yield with a mock weather snapshot, persists the farm and
//! prediction to MongoDB, and gates advanced result access behind a
//! subscription tier reported by the billing collaborator.
//!
//! ## Components
//!
//! - **Estimator**: pure yield/confidence computation over soil inputs
//! - **Recorder**: validates a submission, persists farm + prediction
//! - **Entitlement**: tier policy (row limits, premium-only channels)
//! - **Billing**: per-request subscription tier lookup
//! - **Notify**: channel-gated notification sink (mock delivery)

pub mod auth;
pub mod billing;
pub mod config;
pub mod db;
pub mod entitlement;
pub mod estimator;
pub mod notify;
pub mod recorder;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{CropcastError, Result};
