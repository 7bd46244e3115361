use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::value_objects::Email;

/// Registered account
///
/// `password_hash` is `None` for accounts that only ever signed in through
/// an external identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: Email,
    pub password_hash: Option<String>,
    pub name: String,
    pub description: String,
    pub location: String,
    pub profile_picture_url: Option<String>,
    pub facebook_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns the denormalized fields shown next to photos and comments
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            profile_picture_url: self.profile_picture_url.clone(),
        }
    }

    /// Applies a partial profile update in place
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(url) = update.profile_picture_url {
            self.profile_picture_url = Some(url);
        }
    }
}

/// Data required to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: Option<String>,
    pub name: String,
    pub facebook_id: Option<String>,
}

impl NewUser {
    /// Builds the persisted user with a fresh id
    pub fn into_user(self) -> User {
        User {
            id: Uuid::new_v4(),
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            description: String::new(),
            location: String::new(),
            profile_picture_url: None,
            facebook_id: self.facebook_id,
            created_at: Utc::now(),
        }
    }
}

/// Partial profile update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub profile_picture_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.profile_picture_url.is_none()
    }
}

/// Owner/author fields joined onto photos at read time
#[derive(Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub profile_picture_url: Option<String>,
}
