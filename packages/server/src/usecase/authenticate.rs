//! UseCase: authenticate a connection.
//!
//! Verifies the credential token against the identity collaborator (no
//! engine lock held across the call), attaches the identity to the
//! registry entry, confirms to the origin, and fans the updated presence
//! snapshot out to every connection. Safe to repeat: re-verification
//! replaces the identity and the snapshot stays deduplicated.

use std::sync::Arc;

use crate::domain::{ConnectionId, Identity, IdentityVerifier, MessagePusher, ServerEvent};
use crate::infrastructure::ConnectionRegistry;

use super::error::EventError;

pub struct AuthenticateUseCase {
    registry: Arc<ConnectionRegistry>,
    verifier: Arc<dyn IdentityVerifier>,
    pusher: Arc<dyn MessagePusher>,
}

impl AuthenticateUseCase {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        verifier: Arc<dyn IdentityVerifier>,
        pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            verifier,
            pusher,
        }
    }

    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        token: &str,
    ) -> Result<Identity, EventError> {
        // 1. Verify against the collaborator; a failure leaves the
        //    connection unauthenticated with no side effects.
        let identity = self.verifier.verify(token).await?;

        // 2. Attach. The connection may have raced a disconnect.
        if !self.registry.attach_identity(&connection_id, identity.clone()).await {
            return Err(EventError::NotFound(
                "connection is no longer registered".to_string(),
            ));
        }
        tracing::info!(
            "Connection '{}' authenticated as '{}'",
            connection_id,
            identity.user_id
        );

        // 3. Confirm to the origin.
        let confirmation = ServerEvent::Authenticated {
            identity: identity.clone(),
        }
        .to_json();
        if let Err(e) = self.pusher.push_to(&connection_id, &confirmation).await {
            tracing::warn!("Failed to confirm authentication to '{}': {}", connection_id, e);
        }

        // 4. Presence changed: process-wide active_users snapshot.
        let users = self.registry.online_identities().await;
        self.pusher
            .broadcast_all(&ServerEvent::ActiveUsers { users }.to_json())
            .await;

        Ok(identity)
    }
}
