use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::DisplayNameError;
use crate::user::errors::EmailError;
use crate::user::errors::PageRequestError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// `password_hash` is the self-describing PHC string; the plaintext is never stored.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type
///
/// Between 4 and 100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MIN_LENGTH: usize = 4;
    const MAX_LENGTH: usize = 100;

    /// Create a new valid display name.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 4 characters
    /// * `TooLong` - More than 100 characters
    pub fn new(name: String) -> Result<Self, DisplayNameError> {
        let length = name.chars().count();
        if length < Self::MIN_LENGTH {
            Err(DisplayNameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password that satisfies the registration policy.
///
/// Lives only for the duration of a request; hashed by the service before
/// anything is persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 6;
    const SPECIAL_CHARACTERS: &'static str = "!@#$%*";

    /// Validate a plaintext password.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 6 characters
    /// * `MissingSpecialCharacter` - None of `!@#$%*` present
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        if !password.contains(|c: char| Self::SPECIAL_CHARACTERS.contains(c)) {
            return Err(PasswordPolicyError::MissingSpecialCharacter(
                Self::SPECIAL_CHARACTERS,
            ));
        }
        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Command to create a new user with domain types
#[derive(Debug)]
pub struct CreateUserCommand {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password: Password,
}

impl CreateUserCommand {
    pub fn new(name: DisplayName, email: EmailAddress, password: Password) -> Self {
        Self {
            name,
            email,
            password,
        }
    }
}

/// Command to update an existing user with optional validated fields.
///
/// Only provided fields will be updated. A new password replaces the stored
/// hash entirely.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub name: Option<DisplayName>,
    pub email: Option<EmailAddress>,
    pub password: Option<Password>,
}

/// One page of a user listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    items_per_page: u32,
    current_page: u32,
}

impl PageRequest {
    pub const DEFAULT_ITEMS_PER_PAGE: u32 = 10;
    pub const MAX_ITEMS_PER_PAGE: u32 = 100;

    /// Build a page request; missing values fall back to page 1 of 10 items.
    ///
    /// # Errors
    /// * `InvalidItemsPerPage` - Zero or more than 100 items requested
    /// * `InvalidPage` - Page number is zero
    pub fn new(
        items_per_page: Option<u32>,
        current_page: Option<u32>,
    ) -> Result<Self, PageRequestError> {
        let items_per_page = items_per_page.unwrap_or(Self::DEFAULT_ITEMS_PER_PAGE);
        let current_page = current_page.unwrap_or(1);

        if items_per_page == 0 || items_per_page > Self::MAX_ITEMS_PER_PAGE {
            return Err(PageRequestError::InvalidItemsPerPage {
                max: Self::MAX_ITEMS_PER_PAGE,
                actual: items_per_page,
            });
        }
        if current_page == 0 {
            return Err(PageRequestError::InvalidPage);
        }

        Ok(Self {
            items_per_page,
            current_page,
        })
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Number of records to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.current_page - 1) * u64::from(self.items_per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            items_per_page: Self::DEFAULT_ITEMS_PER_PAGE,
            current_page: 1,
        }
    }
}

/// A page of users together with the request that produced it.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub current_page: u32,
    pub items_per_page: u32,
}
