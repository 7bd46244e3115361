// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod dto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
