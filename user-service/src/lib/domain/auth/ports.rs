use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AuthenticatedUser;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::LoginSuccess;

/// Port for the login flow and bearer token verification.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Exchange email and password for an access token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `Cancelled` - User lookup did not finish in time
    /// * `Infrastructure` - User store or token signing failed
    async fn login(&self, command: LoginCommand) -> Result<LoginSuccess, AuthError>;

    /// Verify a bearer token and return the identity it carries.
    ///
    /// Purely local: no store access.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, wrong algorithm, expired or malformed
    fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
