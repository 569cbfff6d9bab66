//! HTTP gateway for Querent: query routes, strategy setter, health and the index page.

/// Query routing over the processor.
pub mod router;
/// The axum application.
pub mod server;

pub use router::{QueryRequest, QueryRoute, QueryRouter, StrategyBody};
pub use server::{AppState, GatewayServer};
