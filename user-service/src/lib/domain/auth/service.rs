use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::PasswordError;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AuthenticatedUser;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::LoginSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::user::ports::UserLookup;

/// Plaintext hashed once to give unknown emails the same verification cost
/// as known ones.
const TIMING_EQUALIZER_PASSWORD: &str = "timing-equalizer!";

/// Login flow: lookup by email, password verification, token issuance.
pub struct AuthService<L>
where
    L: UserLookup,
{
    lookup: Arc<L>,
    authenticator: Arc<Authenticator>,
    lookup_timeout: Duration,
    dummy_hash: String,
}

impl<L> AuthService<L>
where
    L: UserLookup,
{
    /// Create a new login flow.
    ///
    /// # Arguments
    /// * `lookup` - Source of users by email
    /// * `authenticator` - Password verification and token issuance
    /// * `lookup_timeout` - Upper bound for the user lookup
    ///
    /// # Errors
    /// * `PasswordError` - The timing-equalizer hash could not be computed
    pub fn new(
        lookup: Arc<L>,
        authenticator: Arc<Authenticator>,
        lookup_timeout: Duration,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = authenticator
            .hash_password(TIMING_EQUALIZER_PASSWORD)
            .inspect_err(|e| {
                tracing::error!(error = %e, "Failed to prepare timing-equalizer hash");
            })?;

        Ok(Self {
            lookup,
            authenticator,
            lookup_timeout,
            dummy_hash,
        })
    }

    async fn find_user(&self, email: &EmailAddress) -> Result<Option<User>, AuthError> {
        match tokio::time::timeout(self.lookup_timeout, self.lookup.find_by_email(email)).await {
            Ok(Ok(user)) => Ok(user),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "User lookup failed during login");
                Err(AuthError::Infrastructure(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "User lookup timed out during login"
                );
                Err(AuthError::Cancelled(format!(
                    "user lookup exceeded {} ms",
                    self.lookup_timeout.as_millis()
                )))
            }
        }
    }

    /// Burn one password verification so a miss costs as much as a mismatch.
    fn reject_unknown(&self, password: &str) -> AuthError {
        let _ = self.authenticator.verify_password(password, &self.dummy_hash);
        AuthError::InvalidCredentials
    }
}

#[async_trait]
impl<L> AuthServicePort for AuthService<L>
where
    L: UserLookup,
{
    async fn login(&self, command: LoginCommand) -> Result<LoginSuccess, AuthError> {
        let Ok(email) = EmailAddress::new(command.email) else {
            tracing::info!("Login rejected: malformed email");
            return Err(self.reject_unknown(&command.password));
        };

        let Some(user) = self.find_user(&email).await? else {
            tracing::info!("Login rejected: invalid credentials");
            return Err(self.reject_unknown(&command.password));
        };

        let claims = auth::Claims::for_user(user.id, user.email.as_str(), user.name.as_str());

        let result = self
            .authenticator
            .authenticate(&command.password, &user.password_hash, &claims)
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::info!("Login rejected: invalid credentials");
                    AuthError::InvalidCredentials
                }
                other => {
                    tracing::error!(error = %other, user_id = %user.id, "Token issuance failed");
                    AuthError::Infrastructure(other.to_string())
                }
            })?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginSuccess {
            user_id: user.id,
            access_token: result.access_token,
        })
    }

    fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.authenticator.validate_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AuthError::InvalidToken
        })?;

        AuthenticatedUser::try_from(claims).map_err(|e| {
            tracing::warn!(error = %e, "Signed token carries a malformed subject");
            AuthError::InvalidToken
        })
    }
}
