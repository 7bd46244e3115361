// Infrastructure layer module
// Contains database adapters and external service integrations
// Follows Hexagonal Architecture

pub mod blob;
pub mod identity;
pub mod repositories;
