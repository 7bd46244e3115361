// User domain module
// Contains the user entity, profile updates and value objects

#![allow(clippy::module_inception)]

pub mod user;
pub mod value_objects;

pub use user::{NewUser, ProfileUpdate, User, UserSummary};
pub use value_objects::Email;
