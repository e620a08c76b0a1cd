//! API Module
//!
//! HTTP handlers and routing for the agent metadata API.
//!
//! # Endpoints
//! - `GET /agents/:id` - Agent metadata
//! - `GET /users/:id` - User metadata
//! - `PUT /users/:id/summary` - Refresh a cached user summary
//! - `DELETE /agents/:id/cache` - Drop a cached agent
//! - `DELETE /users/:id/cache` - Drop a cached user
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
