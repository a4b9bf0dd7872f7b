//! HTTP middleware
//!
//! - cors - origin allow-list (403 guard + tower-http CorsLayer)
//! - rate_limit - per-IP request budgets
//! - security_headers - fixed response hardening headers

pub mod cors;
pub mod rate_limit;
pub mod security_headers;

pub use cors::{cors_guard, CorsPolicy};
pub use rate_limit::{enforce_rate_limit, RateLimit};
pub use security_headers::with_security_headers;
