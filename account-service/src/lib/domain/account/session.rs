use auth::CredentialKind;
use auth::SessionClaims;
use auth::SessionSigner;
use chrono::DateTime;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::models::Credential;
use crate::account::models::SessionPair;
use crate::account::models::UserId;

/// Result of a sliding renewal: the refreshed subject plus the fresh
/// access credential the transport layer must emit.
///
/// Renewal looks like a read but produces a credential to write; modeling
/// it as a return value keeps that side effect at the caller.
#[derive(Debug, Clone)]
pub struct RenewedAccess {
    pub user_id: UserId,
    pub credential: Credential,
}

/// Mints and validates the signed access/refresh credential pair.
///
/// The signed claims are the sole session state; there is no server-side
/// session record. Revocation happens only through credential expiry or
/// deletion of the carrier.
pub struct SessionManager {
    signer: SessionSigner,
}

impl SessionManager {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            signer: SessionSigner::new(secret),
        }
    }

    /// Mint an independently signed access/refresh pair for a user.
    ///
    /// # Errors
    /// * `Session` - Credential signing failed
    pub fn create_session(&self, user_id: &UserId) -> Result<SessionPair, AccountError> {
        Ok(SessionPair {
            access: self.mint(user_id, CredentialKind::Access)?,
            refresh: self.mint(user_id, CredentialKind::Refresh)?,
        })
    }

    /// Decode and validate a carried credential.
    ///
    /// Returns `None` on any malformed, tampered, or expired input; the
    /// caller never learns which.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        self.signer.verify(token).ok()
    }

    /// Mint a fresh access credential on the strength of a still-valid
    /// refresh credential.
    ///
    /// # Errors
    /// * `Unauthorized` - Refresh credential is invalid, expired, or its
    ///   subject is not a user id
    pub fn renew_access(&self, refresh_token: &str) -> Result<RenewedAccess, AccountError> {
        let claims = self
            .signer
            .verify(refresh_token)
            .map_err(|_| AccountError::Unauthorized)?;

        let user_id =
            UserId::from_string(&claims.sub).map_err(|_| AccountError::Unauthorized)?;

        let credential = self.mint(&user_id, CredentialKind::Access)?;

        Ok(RenewedAccess {
            user_id,
            credential,
        })
    }

    fn mint(&self, user_id: &UserId, kind: CredentialKind) -> Result<Credential, AccountError> {
        let claims = SessionClaims::issue(user_id, kind);
        let token = self.signer.encode(&claims)?;

        Ok(Credential {
            token,
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_create_session_mints_verifiable_pair() {
        let manager = SessionManager::new(SECRET);
        let user_id = UserId::new();

        let pair = manager.create_session(&user_id).unwrap();

        let access = manager.verify(&pair.access.token).unwrap();
        let refresh = manager.verify(&pair.refresh.token).unwrap();

        assert_eq!(access.sub, user_id.to_string());
        assert_eq!(refresh.sub, user_id.to_string());
        assert_eq!(access.exp - access.iat, 15 * 60);
        assert_eq!(refresh.exp - refresh.iat, 60 * 60);
    }

    #[test]
    fn test_verify_rejects_foreign_and_malformed_credentials() {
        let manager = SessionManager::new(SECRET);
        let other = SessionManager::new(b"another_secret_at_least_32_bytes!!");

        let pair = other.create_session(&UserId::new()).unwrap();

        assert!(manager.verify(&pair.access.token).is_none());
        assert!(manager.verify("garbage").is_none());
        assert!(manager.verify("").is_none());
    }

    #[test]
    fn test_renew_access_mints_full_lifetime_credential() {
        let manager = SessionManager::new(SECRET);
        let user_id = UserId::new();

        let pair = manager.create_session(&user_id).unwrap();
        let renewed = manager.renew_access(&pair.refresh.token).unwrap();

        assert_eq!(renewed.user_id, user_id);

        let claims = manager.verify(&renewed.credential.token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_renew_access_rejects_expired_refresh() {
        let manager = SessionManager::new(SECRET);
        let signer = SessionSigner::new(SECRET);

        let now = Utc::now().timestamp();
        let stale = SessionClaims {
            sub: UserId::new().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = signer.encode(&stale).unwrap();

        assert!(matches!(
            manager.renew_access(&token),
            Err(AccountError::Unauthorized)
        ));
    }

    #[test]
    fn test_renew_access_rejects_non_user_subject() {
        let manager = SessionManager::new(SECRET);
        let signer = SessionSigner::new(SECRET);

        let claims = SessionClaims::issue("not-a-uuid", CredentialKind::Refresh);
        let token = signer.encode(&claims).unwrap();

        assert!(matches!(
            manager.renew_access(&token),
            Err(AccountError::Unauthorized)
        ));
    }

    #[test]
    fn test_renew_access_rejects_garbage() {
        let manager = SessionManager::new(SECRET);

        assert!(matches!(
            manager.renew_access("not.a.credential"),
            Err(AccountError::Unauthorized)
        ));
    }
}
