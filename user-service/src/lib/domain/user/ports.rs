use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PageRequest;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserPage;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `command` - Validated command containing name, email, and password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `EmailAlreadyRegistered` - Email belongs to another user
    /// * `Password` - Password hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Update existing user with optional fields.
    ///
    /// # Arguments
    /// * `id` - User ID to update
    /// * `command` - Command with optional name, email, and password fields
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmailAlreadyRegistered` - New email belongs to another user
    /// * `DatabaseError` - Database operation failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;

    /// Delete existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;

    /// List one page of users.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self, page: PageRequest) -> Result<UserPage, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyRegistered` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Replace the stored user with `user`.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmailAlreadyRegistered` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;

    /// Retrieve one page of users, oldest first.
    async fn list_paginated(&self, page: &PageRequest) -> Result<Vec<User>, UserError>;
}

/// Read-only lookup used by the login flow.
///
/// Every [`UserRepository`] provides it, so the login flow can be wired to the
/// full repository while depending on nothing but this method.
#[async_trait]
pub trait UserLookup: Send + Sync + 'static {
    /// Find the user registered with `email`.
    ///
    /// # Returns
    /// Optional user entity (None if no account uses this email)
    ///
    /// # Errors
    /// * `DatabaseError` - Store could not be queried
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
}

#[async_trait]
impl<R> UserLookup for R
where
    R: UserRepository,
{
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        UserRepository::find_by_email(self, email).await
    }
}
