// Application services
// Orchestrate domain objects, repositories and gateways for the API layer

pub mod accounts;
pub mod media;
pub mod photos;

pub use accounts::{AccountError, AccountService, AuthSession};
pub use media::{MediaFolder, MediaService, StoredBlob, Upload};
pub use photos::{AuthoredComment, PhotoError, PhotoService, PhotoView};
