//! Authentication for Cropcast
//!
//! Identity is issued by the external identity provider; this service
//! only validates the Bearer JWT it presents.

pub mod jwt;

pub use jwt::{extract_token_from_header, Claims, JwtValidator, TokenValidationResult};
