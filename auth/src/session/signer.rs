use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::SessionClaims;
use super::errors::SessionError;

/// HMAC-SHA256 signer for session claims.
///
/// Both credential kinds share the one key; a credential is a compact JWS
/// over [`SessionClaims`].
pub struct SessionSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl SessionSigner {
    /// Create a signer from a shared secret.
    ///
    /// # Arguments
    /// * `secret` - HMAC key; should be at least 256 bits for HS256
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Sign claims into a credential string.
    ///
    /// # Errors
    /// * `SigningFailed` - claim serialization or signing failed
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| SessionError::SigningFailed(e.to_string()))
    }

    /// Decode and validate a credential.
    ///
    /// Signature mismatch, wrong algorithm, malformed input, a missing
    /// claim, and expiry all produce the same `Invalid` outcome. Expiry is
    /// checked with zero leeway, so a credential is good through its `exp`
    /// second and refused strictly after it.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| SessionError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::session::CredentialKind;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_encode_and_verify() {
        let signer = SessionSigner::new(SECRET);

        let claims = SessionClaims::issue("user123", CredentialKind::Access);
        let token = signer.encode(&claims).expect("Failed to encode");

        let decoded = signer.verify(&token).expect("Failed to verify");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let signer = SessionSigner::new(SECRET);
        let other = SessionSigner::new(b"another_secret_at_least_32_bytes!!");

        let claims = SessionClaims::issue("user123", CredentialKind::Refresh);
        let token = signer.encode(&claims).expect("Failed to encode");

        assert_eq!(other.verify(&token), Err(SessionError::Invalid));
    }

    #[test]
    fn test_verify_expired_credential() {
        let signer = SessionSigner::new(SECRET);

        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: "user123".to_string(),
            iat: now - 120,
            exp: now - 60,
        };
        let token = signer.encode(&claims).expect("Failed to encode");

        assert_eq!(signer.verify(&token), Err(SessionError::Invalid));
    }

    #[test]
    fn test_verify_malformed_input() {
        let signer = SessionSigner::new(SECRET);

        assert_eq!(signer.verify(""), Err(SessionError::Invalid));
        assert_eq!(
            signer.verify("not.a.credential"),
            Err(SessionError::Invalid)
        );
    }

    #[test]
    fn test_verify_tampered_payload() {
        let signer = SessionSigner::new(SECRET);

        let claims = SessionClaims::issue("user123", CredentialKind::Access);
        let token = signer.encode(&claims).expect("Failed to encode");

        // Swap out the payload segment while keeping the original signature.
        let other = SessionClaims::issue("user456", CredentialKind::Access);
        let other_token = signer.encode(&other).expect("Failed to encode");

        let mut parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other_token.split('.').collect();
        parts[1] = other_parts[1];
        let forged = parts.join(".");

        assert_eq!(signer.verify(&forged), Err(SessionError::Invalid));
    }
}
