use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Which of the two session credentials a claim set belongs to.
///
/// The two kinds differ only in lifetime; each is signed independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Access,
    Refresh,
}

impl CredentialKind {
    /// Credential lifetime: 15 minutes for access, 60 for refresh.
    pub fn ttl(&self) -> Duration {
        match self {
            CredentialKind::Access => Duration::minutes(15),
            CredentialKind::Refresh => Duration::minutes(60),
        }
    }
}

/// Claims carried by a signed session credential.
///
/// All three fields are required; a token missing any of them fails
/// verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Mint claims for a subject with the lifetime of `kind`.
    pub fn issue(sub: impl ToString, kind: CredentialKind) -> Self {
        let now = Utc::now();

        Self {
            sub: sub.to_string(),
            iat: now.timestamp(),
            exp: (now + kind.ttl()).timestamp(),
        }
    }
}
