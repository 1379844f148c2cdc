use crate::domain::user::models::UserId;

/// Raw login credentials as submitted by the client.
///
/// The email is not parsed into an `EmailAddress` here: a malformed address
/// must fail exactly like an unknown one.
#[derive(Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }
}

impl std::fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outcome of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub user_id: UserId,
    pub access_token: String,
}

/// Identity taken from a verified bearer token.
///
/// Inserted into request extensions by the authentication middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
}

impl TryFrom<auth::Claims> for AuthenticatedUser {
    type Error = crate::user::errors::UserIdError;

    fn try_from(claims: auth::Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::from_string(&claims.sub)?,
            email: claims.email,
            name: claims.name,
        })
    }
}
