//! Development implementation of the `IdentityVerifier` port.
//!
//! The production deployment talks to the identity service; this verifier
//! lets the server run standalone by accepting tokens of the form
//! `user_id:display_name[:role]`. Anything else is an invalid token.

use async_trait::async_trait;

use crate::domain::{AuthError, Identity, IdentityVerifier, Role, UserId};

/// Token parser standing in for the external identity service.
#[derive(Default)]
pub struct DevTokenVerifier;

impl DevTokenVerifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentityVerifier for DevTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let mut parts = token.splitn(3, ':');
        let user_id = parts.next().unwrap_or_default();
        let display_name = parts.next().ok_or(AuthError::InvalidToken)?;
        let role = match parts.next() {
            Some(raw) => raw.parse::<Role>().map_err(|_| AuthError::InvalidToken)?,
            None => Role::Member,
        };

        let user_id = UserId::new(user_id.to_string()).map_err(|_| AuthError::InvalidToken)?;
        if display_name.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(Identity::new(user_id, display_name.to_string(), role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_parses_user_and_display_name() {
        // Test item: a two-part token yields a member identity
        // given:
        let verifier = DevTokenVerifier::new();

        // when:
        let identity = verifier.verify("alice:Alice").await.unwrap();

        // then:
        assert_eq!(identity.user_id.as_str(), "alice");
        assert_eq!(identity.display_name, "Alice");
        assert_eq!(identity.role, Role::Member);
    }

    #[tokio::test]
    async fn test_verify_parses_explicit_role() {
        // Test item: a three-part token carries its role
        // given:
        let verifier = DevTokenVerifier::new();

        // when:
        let identity = verifier.verify("nadia:Nadia:admin").await.unwrap();

        // then:
        assert_eq!(identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_verify_rejects_malformed_tokens() {
        // Test item: missing parts or unknown roles are invalid
        // given:
        let verifier = DevTokenVerifier::new();

        // when / then:
        assert_eq!(
            verifier.verify("alice").await,
            Err(AuthError::InvalidToken)
        );
        assert_eq!(verifier.verify(":Alice").await, Err(AuthError::InvalidToken));
        assert_eq!(
            verifier.verify("alice:Alice:owner").await,
            Err(AuthError::InvalidToken)
        );
    }
}
