// Repository ports implemented by the infrastructure layer

pub mod photo_repository;
pub mod user_repository;

pub use photo_repository::PhotoRepository;
pub use user_repository::UserRepository;
