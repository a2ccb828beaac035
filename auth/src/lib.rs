//! Authentication infrastructure library
//!
//! Provides the cryptographic building blocks for the account service:
//! - Password hashing (Argon2id)
//! - Signed session credentials (HMAC-SHA256 access/refresh claims)
//!
//! The service defines its own domain ports and adapts these implementations.
//! Nothing in this crate knows about users, stores, or transports.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Session Credentials
//! ```
//! use auth::{CredentialKind, SessionClaims, SessionSigner};
//!
//! let signer = SessionSigner::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Mint an access credential for a user.
//! let claims = SessionClaims::issue("user123", CredentialKind::Access);
//! let token = signer.encode(&claims).unwrap();
//!
//! // Verify it. Any tampering, expiry, or malformed input yields `Invalid`.
//! let decoded = signer.verify(&token).unwrap();
//! assert_eq!(decoded.sub, "user123");
//! ```

pub mod password;
pub mod session;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use session::CredentialKind;
pub use session::SessionClaims;
pub use session::SessionError;
pub use session::SessionSigner;
