use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

/// Identity claims carried by an access token.
///
/// `sub`, `email` and `name` identify the user; `iat` and `exp` are set by
/// [`JwtHandler::issue`](super::JwtHandler::issue) and overwrite whatever the
/// caller put there. Any other claim goes into `extra` and is flattened into
/// the token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    pub email: String,

    /// Display name
    pub name: String,

    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    #[serde(default)]
    pub exp: i64,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create identity claims for an authenticated user.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `email` - User email address
    /// * `name` - User display name
    pub fn for_user(user_id: impl ToString, email: impl ToString, name: impl ToString) -> Self {
        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            iat: 0,
            exp: 0,
            extra: HashMap::new(),
        }
    }

    /// Add a custom field.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    /// Check if token is expired.
    ///
    /// A token is valid strictly before `exp`; at `exp` it is already expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_user() {
        let claims = Claims::for_user("user123", "a@b.com", "Alice");

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.name, "Alice");
        assert!(claims.extra.is_empty());
    }

    #[test]
    fn test_with_extra() {
        let claims = Claims::for_user("user123", "a@b.com", "Alice").with_extra("role", "admin");

        assert_eq!(claims.extra.get("role").unwrap().as_str(), Some("admin"));
    }

    #[test]
    fn test_extra_is_flattened() {
        let claims = Claims::for_user("user123", "a@b.com", "Alice").with_extra("role", "admin");
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["role"], "admin");
        assert_eq!(json["sub"], "user123");
        assert!(json.get("extra").is_none());
    }

    #[test]
    fn test_is_expired() {
        let mut claims = Claims::for_user("user123", "a@b.com", "Alice");
        claims.exp = 1000;

        assert!(!claims.is_expired(999));
        assert!(claims.is_expired(1000));
        assert!(claims.is_expired(1001));
    }
}
