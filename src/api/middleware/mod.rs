pub mod auth;

pub use auth::{resolve_bearer, CurrentUser};
