//! fotoUTC API Library
//!
//! Server side of a photo-sharing application: accounts and bearer tokens,
//! photos with likes and comments, and binary uploads to an object store.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod services;
