// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of infrastructure concerns

pub mod errors;
pub mod identity;
pub mod photo;
pub mod repositories;
pub mod storage;
pub mod user;
