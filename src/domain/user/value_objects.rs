use serde::{Deserialize, Serialize};
use std::fmt;

/// Email value object representing a normalized email address
///
/// # Invariants
/// - Surrounding whitespace is trimmed and the address is lower-cased
/// - Exactly one '@' with a non-empty local part and domain
/// - Is immutable after construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Creates a new Email value object
    ///
    /// # Arguments
    /// * `email` - The email string to validate
    ///
    /// # Returns
    /// * `Ok(Email)` - If email is valid, normalized
    /// * `Err(String)` - If email is invalid
    ///
    /// # Example
    /// ```
    /// use fotoutc_api::domain::user::value_objects::Email;
    ///
    /// let email = Email::new("  Ana@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_str(), "ana@example.com");
    /// ```
    pub fn new(email: impl AsRef<str>) -> Result<Self, String> {
        let normalized = email.as_ref().trim().to_lowercase();
        if Self::is_valid(&normalized) {
            Ok(Email(normalized))
        } else {
            Err(format!("Invalid email: {}", email.as_ref().trim()))
        }
    }

    /// Validation rules: one '@', non-empty local part and domain, no spaces
    fn is_valid(email: &str) -> bool {
        match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !email.chars().any(char::is_whitespace)
            }
            None => false,
        }
    }

    /// Returns the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LENGTH: usize = 8;
