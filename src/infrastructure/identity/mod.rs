// External identity provider adapters

pub mod facebook;

pub use facebook::FacebookIdentityProvider;
