//! Authentication utilities library
//!
//! Provides the credential and token primitives used by the user service:
//! - Password hashing (Argon2id, fixed cost)
//! - Stateless HS256 access tokens with hour-granular expiry
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{Claims, JwtHandler};
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!", 24).unwrap();
//! let claims = Claims::for_user("user123", "alice@example.com", "Alice");
//! let token = handler.issue(&claims).unwrap();
//! let decoded = handler.verify(&token).unwrap();
//! assert_eq!(decoded.sub, "user123");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, Claims};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", 24).unwrap();
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123!").unwrap();
//!
//! // Login: verify and issue token
//! let claims = Claims::for_user("user123", "alice@example.com", "Alice");
//! let result = auth.authenticate("password123!", &hash, &claims).unwrap();
//!
//! // Validate token
//! let decoded = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(decoded.email, "alice@example.com");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::Clock;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SystemClock;
pub use password::PasswordError;
pub use password::PasswordHasher;
