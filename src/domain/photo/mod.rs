// Photo domain module
// Contains the photo aggregate root and its embedded comments

#![allow(clippy::module_inception)]

pub mod comment;
pub mod photo;

pub use comment::{Comment, CommentText};
pub use photo::Photo;
