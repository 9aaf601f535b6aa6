use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use platform_store::{EntityStore, StoreResult};
use rand::{Rng, distributions::Alphanumeric};
use serde_json::json;

/// The three opaque strings a shareable client room is addressed by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomCredentials {
    pub room_id: String,
    pub room_password: String,
    pub room_share_token: String,
}

/// Generate fresh credentials: short alphanumeric id and password, and a
/// URL-safe share token long enough to be unguessable.
pub fn generate_credentials() -> RoomCredentials {
    let mut rng = rand::thread_rng();
    let room_id: String = (&mut rng)
        .sample_iter(Alphanumeric)
        .take(10)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    let room_password: String = (&mut rng)
        .sample_iter(Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let mut token_bytes = [0u8; 24];
    rng.fill(&mut token_bytes);
    RoomCredentials {
        room_id,
        room_password,
        room_share_token: URL_SAFE_NO_PAD.encode(token_bytes),
    }
}

/// Provisions a digital room onto an existing Lead/Client record.
#[derive(Clone)]
pub struct RoomProvisioner {
    store: Arc<dyn EntityStore>,
}

impl RoomProvisioner {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn provision(&self, collection: &str, id: &str) -> StoreResult<RoomCredentials> {
        let credentials = generate_credentials();
        self.store
            .update(
                collection,
                id,
                json!({
                    "room_id": credentials.room_id,
                    "room_password": credentials.room_password,
                    "room_share_token": credentials.room_share_token,
                }),
            )
            .await?;
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_are_opaque_and_distinct() {
        let a = generate_credentials();
        let b = generate_credentials();
        assert_eq!(a.room_id.len(), 10);
        assert_eq!(a.room_password.len(), 8);
        assert!(a.room_share_token.len() >= 32);
        assert_ne!(a.room_share_token, b.room_share_token);
        assert!(a.room_id.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
