//! HTTP middleware for the provisioner.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (the extension front-end is served from another origin)
//! 4. API token guard (`/api/*` only, when a token is configured)

pub mod auth;

pub use auth::require_api_token;
