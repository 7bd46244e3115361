// Credential store operations: registration, login, social login and
// profile management.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::auth::jwt::{TokenError, TokenService};
use crate::auth::password::{hash_password, verify_password, PasswordError};
use crate::domain::errors::RepositoryError;
use crate::domain::identity::{IdentityError, IdentityProvider};
use crate::domain::repositories::UserRepository;
use crate::domain::user::value_objects::MIN_PASSWORD_LENGTH;
use crate::domain::user::{Email, NewUser, ProfileUpdate, User};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("user already exists")]
    AlreadyExists,

    #[error("user not found")]
    NotFound,

    #[error("incorrect password")]
    BadPassword,

    #[error("identity provider rejected the access token: {0}")]
    IdentityRejected(String),

    #[error("identity provider unavailable: {0}")]
    IdentityUnavailable(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("password hashing task failed: {0}")]
    HashingTask(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AccountError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => AccountError::AlreadyExists,
            other => AccountError::Repository(other),
        }
    }
}

impl From<IdentityError> for AccountError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Rejected(msg) => AccountError::IdentityRejected(msg),
            IdentityError::Unavailable(msg) => AccountError::IdentityUnavailable(msg),
        }
    }
}

/// Authenticated user together with a freshly issued token
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Account service
///
/// Password hashing and verification run on the blocking pool so a slow
/// bcrypt round never stalls other requests.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    identity: Arc<dyn IdentityProvider>,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        identity: Arc<dyn IdentityProvider>,
        tokens: TokenService,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            identity,
            tokens,
            bcrypt_cost,
        }
    }

    /// Creates an account and signs it in
    ///
    /// The existence check gives the common case a clear error; the store's
    /// unique email constraint settles concurrent registrations, and the
    /// loser also gets `AlreadyExists`.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthSession, AccountError> {
        let email = Email::new(email).map_err(AccountError::InvalidInput)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AccountError::AlreadyExists);
        }

        let password_hash = self.hash(password).await?;
        let name = email
            .as_str()
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string();

        let user = self
            .users
            .create(NewUser {
                email,
                password_hash: Some(password_hash),
                name,
                facebook_id: None,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.session(user)
    }

    /// Checks credentials and issues a token
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AccountError> {
        let email = Email::new(email).map_err(AccountError::InvalidInput)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::NotFound)?;

        // Accounts created through social login have no password to match
        let Some(hash) = user.password_hash.clone() else {
            return Err(AccountError::BadPassword);
        };

        let password = password.to_string();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AccountError::HashingTask(e.to_string()))??;
        if !valid {
            return Err(AccountError::BadPassword);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.session(user)
    }

    /// Signs in with an external access token, creating the account on first use
    ///
    /// Accounts are matched by email. An existing account without a linked
    /// provider id gets it recorded.
    pub async fn login_with_facebook(
        &self,
        access_token: &str,
    ) -> Result<AuthSession, AccountError> {
        if access_token.trim().is_empty() {
            return Err(AccountError::InvalidInput("accessToken is required".to_string()));
        }

        let profile = self.identity.fetch_profile(access_token).await?;
        let email = profile
            .email
            .as_deref()
            .ok_or_else(|| {
                AccountError::InvalidInput("identity provider did not return an email".to_string())
            })
            .and_then(|email| Email::new(email).map_err(AccountError::InvalidInput))?;

        let user = match self.users.find_by_email(&email).await? {
            Some(mut user) => {
                if user.facebook_id.is_none() {
                    self.users
                        .link_facebook(user.id, &profile.provider_id)
                        .await?;
                    user.facebook_id = Some(profile.provider_id.clone());
                    tracing::info!(user_id = %user.id, "Linked facebook account");
                }
                user
            }
            None => {
                let created = self
                    .users
                    .create(NewUser {
                        email: email.clone(),
                        password_hash: None,
                        name: profile.name.clone().unwrap_or_default(),
                        facebook_id: Some(profile.provider_id.clone()),
                    })
                    .await;

                match created {
                    Ok(user) => {
                        tracing::info!(user_id = %user.id, "User created from facebook profile");
                        user
                    }
                    // Lost a race with a concurrent first login for the same email
                    Err(RepositoryError::Conflict(_)) => self
                        .users
                        .find_by_email(&email)
                        .await?
                        .ok_or(AccountError::NotFound)?,
                    Err(e) => return Err(e.into()),
                }
            }
        };

        self.session(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<User, AccountError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound)
    }

    /// Applies a partial profile update; an empty update returns the user unchanged
    pub async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<User, AccountError> {
        if update.is_empty() {
            return self.find_by_id(id).await;
        }

        let user = self
            .users
            .update_profile(id, update)
            .await?
            .ok_or(AccountError::NotFound)?;

        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    async fn hash(&self, password: &str) -> Result<String, AccountError> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AccountError::HashingTask(e.to_string()))??;
        Ok(hash)
    }

    fn session(&self, user: User) -> Result<AuthSession, AccountError> {
        let token = self.tokens.issue(user.id)?;
        Ok(AuthSession { user, token })
    }
}
