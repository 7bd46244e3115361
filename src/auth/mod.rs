// Authentication primitives: identity tokens and password hashing

pub mod jwt;
pub mod password;
