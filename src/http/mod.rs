//! HTTP admission layer.
//!
//! Thin glue between the wire and the decision core: builds the rate limit
//! key from request attributes, translates the boolean decision into a
//! status code, and exposes liveness and metrics endpoints. No rate
//! limiting logic lives here.

mod server;

pub use server::HttpServer;
