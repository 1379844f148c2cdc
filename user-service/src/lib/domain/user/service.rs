use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PageRequest;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserPage;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing shared with the login flow
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    /// Fail if `email` belongs to a user other than `owner`.
    ///
    /// Finding nobody is the normal outcome and means the address is free.
    async fn ensure_email_available(
        &self,
        email: &EmailAddress,
        owner: Option<&UserId>,
    ) -> Result<(), UserError> {
        match self.repository.find_by_email(email).await? {
            None => Ok(()),
            Some(existing) if Some(&existing.id) == owner => Ok(()),
            Some(existing) => {
                tracing::info!(
                    existing_user_id = %existing.id,
                    "Email is already registered"
                );
                Err(UserError::EmailAlreadyRegistered(email.to_string()))
            }
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        self.ensure_email_available(&command.email, None).await?;

        let password_hash = self.authenticator.hash_password(command.password.as_str())?;

        let user = User {
            id: UserId::new(),
            name: command.name,
            email: command.email,
            password_hash,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;

        tracing::info!(user_id = %created_user.id, "User created");

        Ok(created_user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(new_name) = command.name {
            user.name = new_name;
        }

        if let Some(new_email) = command.email {
            if new_email != user.email {
                self.ensure_email_available(&new_email, Some(id)).await?;
            }
            user.email = new_email;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.authenticator.hash_password(new_password.as_str())?;
        }

        let updated_user = self.repository.update(user).await?;

        tracing::info!(user_id = %updated_user.id, "User updated");

        Ok(updated_user)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;

        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }

    async fn list_users(&self, page: PageRequest) -> Result<UserPage, UserError> {
        let users = self.repository.list_paginated(&page).await?;

        tracing::debug!(
            items_per_page = page.items_per_page(),
            current_page = page.current_page(),
            returned = users.len(),
            "Users listed"
        );

        Ok(UserPage {
            users,
            current_page: page.current_page(),
            items_per_page: page.items_per_page(),
        })
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::DisplayName;
    use crate::domain::user::models::Password;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
            async fn list_paginated(&self, page: &PageRequest) -> Result<Vec<User>, UserError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(b"test-secret", 24).unwrap())
    }

    fn user(name: &str, email: &str) -> User {
        User {
            id: UserId::new(),
            name: DisplayName::new(name.to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        repository
            .expect_create()
            .withf(|user| {
                user.name.as_str() == "Test User"
                    && user.email.as_str() == "test@example.com"
                    && user.password_hash.starts_with("$argon2id$")
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository), authenticator());

        let command = CreateUserCommand::new(
            DisplayName::new("Test User".to_string()).unwrap(),
            EmailAddress::new("test@example.com".to_string()).unwrap(),
            Password::new("Secret1!".to_string()).unwrap(),
        );

        let user = service.create_user(command).await.unwrap();
        assert_eq!(user.name.as_str(), "Test User");
        assert_eq!(user.email.as_str(), "test@example.com");
        assert!(!user.password_hash.contains("Secret1!"));
        assert!(auth::PasswordHasher::new().verify("Secret1!", &user.password_hash));
    }

    #[tokio::test]
    async fn test_create_user_hashes_with_injected_authenticator() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_email().returning(|_| Ok(None));
        repository.expect_create().returning(|user| Ok(user));

        let authenticator = authenticator();
        let service = UserService::new(Arc::new(repository), Arc::clone(&authenticator));

        let command = CreateUserCommand::new(
            DisplayName::new("Test User".to_string()).unwrap(),
            EmailAddress::new("test@example.com".to_string()).unwrap(),
            Password::new("Secret1!".to_string()).unwrap(),
        );

        let user = service.create_user(command).await.unwrap();
        assert!(authenticator.verify_password("Secret1!", &user.password_hash));
    }

    #[tokio::test]
    async fn test_create_user_email_already_registered() {
        let mut repository = MockTestUserRepository::new();

        let existing = user("Someone", "test@example.com");
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repository.expect_create().times(0);

        let service = UserService::new(Arc::new(repository), authenticator());

        let command = CreateUserCommand::new(
            DisplayName::new("Test User".to_string()).unwrap(),
            EmailAddress::new("test@example.com".to_string()).unwrap(),
            Password::new("Secret1!".to_string()).unwrap(),
        );

        let result = service.create_user(command).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::EmailAlreadyRegistered(_)
        ));
    }

    #[tokio::test]
    async fn test_create_user_propagates_lookup_failure() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection refused".to_string())));
        repository.expect_create().times(0);

        let service = UserService::new(Arc::new(repository), authenticator());

        let command = CreateUserCommand::new(
            DisplayName::new("Test User".to_string()).unwrap(),
            EmailAddress::new("test@example.com".to_string()).unwrap(),
            Password::new("Secret1!".to_string()).unwrap(),
        );

        let result = service.create_user(command).await;
        assert!(matches!(result.unwrap_err(), UserError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn test_get_user_success() {
        let mut repository = MockTestUserRepository::new();

        let expected_user = user("Test User", "test@example.com");
        let user_id = expected_user.id;

        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(expected_user.clone())));

        let service = UserService::new(Arc::new(repository), authenticator());

        let user = service.get_user(&user_id).await.unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.name.as_str(), "Test User");
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_user_success() {
        let mut repository = MockTestUserRepository::new();

        let existing_user = user("Old Name", "old@example.com");
        let user_id = existing_user.id;

        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(existing_user.clone())));

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        repository
            .expect_update()
            .withf(|user| {
                user.name.as_str() == "New Name"
                    && user.email.as_str() == "new@example.com"
                    && user.password_hash.starts_with("$argon2id$v=19$")
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository), authenticator());

        let command = UpdateUserCommand {
            name: Some(DisplayName::new("New Name".to_string()).unwrap()),
            email: Some(EmailAddress::new("new@example.com".to_string()).unwrap()),
            password: Some(Password::new("NewSecret1!".to_string()).unwrap()),
        };

        let updated_user = service.update_user(&user_id, command).await.unwrap();
        assert_eq!(updated_user.name.as_str(), "New Name");
        assert_eq!(updated_user.email.as_str(), "new@example.com");
        assert!(auth::PasswordHasher::new().verify("NewSecret1!", &updated_user.password_hash));
    }

    #[tokio::test]
    async fn test_update_user_keeps_own_email_without_lookup() {
        let mut repository = MockTestUserRepository::new();

        let existing_user = user("Old Name", "same@example.com");
        let user_id = existing_user.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(existing_user.clone())));
        repository.expect_find_by_email().times(0);
        repository
            .expect_update()
            .withf(|user| user.password_hash == "$argon2id$test_hash")
            .times(1)
            .returning(|user| Ok(user));

        let service = UserService::new(Arc::new(repository), authenticator());

        let command = UpdateUserCommand {
            email: Some(EmailAddress::new("same@example.com".to_string()).unwrap()),
            ..Default::default()
        };

        assert!(service.update_user(&user_id, command).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_user_email_taken_by_other_user() {
        let mut repository = MockTestUserRepository::new();

        let existing_user = user("Old Name", "old@example.com");
        let user_id = existing_user.id;
        let other_user = user("Other User", "taken@example.com");

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(existing_user.clone())));
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(other_user.clone())));
        repository.expect_update().times(0);

        let service = UserService::new(Arc::new(repository), authenticator());

        let command = UpdateUserCommand {
            email: Some(EmailAddress::new("taken@example.com".to_string()).unwrap()),
            ..Default::default()
        };

        let result = service.update_user(&user_id, command).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::EmailAlreadyRegistered(_)
        ));
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), authenticator());

        let command = UpdateUserCommand {
            name: Some(DisplayName::new("New Name".to_string()).unwrap()),
            ..Default::default()
        };

        let result = service.update_user(&UserId::new(), command).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_user_success() {
        let mut repository = MockTestUserRepository::new();

        let user_id = UserId::new();

        repository
            .expect_delete()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(|_| Ok(()));

        let service = UserService::new(Arc::new(repository), authenticator());

        assert!(service.delete_user(&user_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        let user_id = UserId::new();

        repository
            .expect_delete()
            .times(1)
            .returning(move |_| Err(UserError::NotFound(user_id.to_string())));

        let service = UserService::new(Arc::new(repository), authenticator());

        let result = service.delete_user(&user_id).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_users() {
        let mut repository = MockTestUserRepository::new();

        let users = vec![
            user("User One", "one@example.com"),
            user("User Two", "two@example.com"),
        ];

        repository
            .expect_list_paginated()
            .withf(|page| page.items_per_page() == 2 && page.current_page() == 3)
            .times(1)
            .returning(move |_| Ok(users.clone()));

        let service = UserService::new(Arc::new(repository), authenticator());

        let page = PageRequest::new(Some(2), Some(3)).unwrap();
        let result = service.list_users(page).await.unwrap();

        assert_eq!(result.users.len(), 2);
        assert_eq!(result.current_page, 3);
        assert_eq!(result.items_per_page, 2);
    }
}
