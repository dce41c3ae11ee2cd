//! HTTP server implementation
//!
//! hyper http1 with TokioIo, one tokio task per connection. Requests
//! are request-scoped and independent; the only ordering guarantee is
//! intra-request (farm insert before prediction insert, inside the
//! recorder).

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::JwtValidator;
use crate::billing::BillingClient;
use crate::config::Args;
use crate::db::MongoClient;
use crate::estimator::{RandomWeather, WeatherProvider};
use crate::recorder::MongoPredictionStore;
use crate::routes;
use crate::types::CropcastError;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub mongo: Option<MongoClient>,
    /// Billing collaborator client for per-request tier lookups
    pub billing: BillingClient,
    /// JWT validator for the identity provider's tokens
    pub jwt: JwtValidator,
    /// Weather source for the estimator (random stub in production,
    /// fixed values in tests)
    pub weather: Arc<dyn WeatherProvider>,
    /// Persistence seam for the recorder; absent without MongoDB
    pub store: Option<Arc<MongoPredictionStore>>,
}

impl AppState {
    /// Create application state. MongoDB may be absent in dev mode;
    /// prediction endpoints then respond 503 individually. Fails when no
    /// JWT secret is available outside dev mode.
    pub fn new(args: Args, mongo: Option<MongoClient>) -> Result<Self, CropcastError> {
        let billing = BillingClient::new(args.billing_url.clone());
        let jwt = JwtValidator::new(args.jwt_secret()?, args.jwt_expiry_seconds);
        let store = mongo
            .clone()
            .map(|m| Arc::new(MongoPredictionStore::new(m)));

        Ok(Self {
            args,
            mongo,
            billing,
            jwt,
            weather: Arc::new(RandomWeather),
            store,
        })
    }

    /// Replace the weather source (tests pin deterministic values)
    pub fn with_weather(mut self, weather: Arc<dyn WeatherProvider>) -> Self {
        self.weather = weather;
        self
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), CropcastError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Cropcast listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - MongoDB optional, insecure JWT default");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        // Liveness probe - returns 200 while the service is running
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            to_boxed(routes::health_check(Arc::clone(&state)))
        }

        // Readiness probe - requires MongoDB outside dev mode
        (Method::GET, "/ready") | (Method::GET, "/readyz") => {
            to_boxed(routes::readiness_check(Arc::clone(&state)))
        }

        (Method::GET, "/version") => to_boxed(routes::version_info(Arc::clone(&state))),

        (Method::OPTIONS, _) => routes::cors_preflight(),

        // Prediction submission
        (Method::POST, "/api/predict") => routes::handle_predict(req, Arc::clone(&state)).await,

        // Tier-gated prediction listing
        (Method::GET, "/api/predictions") => {
            routes::handle_list_predictions(req, Arc::clone(&state)).await
        }

        // Profile
        (Method::GET, "/api/profile") => {
            routes::handle_get_profile(req, Arc::clone(&state)).await
        }
        (Method::PUT, "/api/profile") => {
            routes::handle_put_profile(req, Arc::clone(&state)).await
        }

        // Tier-gated notifications
        (Method::POST, "/api/notifications") => {
            routes::handle_notifications(req, Arc::clone(&state)).await
        }

        _ => routes::not_found_response(&path),
    };

    Ok(response)
}

fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}
