/// Payment provider webhook events
///
/// The provider posts JSON of the form
///
/// ```json
/// {"event": "user.upgraded", "data": {"user_id": "3311741c-680c-4546-99f3-fc9efac2036c"}}
/// ```
///
/// Known event kinds decode into [`WebhookPayload`], whose variants fix the
/// shape of `data`. Any other kind is accepted and ignored, whatever its
/// `data`, so the provider stops retrying it.
///
/// # Example
///
/// ```
/// use chirpy_shared::events::webhook::WebhookEvent;
///
/// let event = WebhookEvent::from_json(br#"{"event": "user.payment_failed", "data": {"amount": 5}}"#).unwrap();
/// assert_eq!(event, WebhookEvent::Unrecognized("user.payment_failed".to_string()));
/// ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::store::{Store, StoreError};

/// Event kind that grants Chirpy Red
pub const USER_UPGRADED: &str = "user.upgraded";

/// Event kinds decoded into [`WebhookPayload`]
const KNOWN_EVENTS: [&str; 1] = [USER_UPGRADED];

/// Just the event kind, read before committing to a payload shape
#[derive(Debug, Deserialize)]
struct EventKind {
    event: String,
}

/// Body of a known event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WebhookPayload {
    /// An account bought the subscription
    #[serde(rename = "user.upgraded")]
    UserUpgraded { user_id: Uuid },
}

/// Decoded webhook event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// An account bought the subscription
    UserUpgraded { user_id: Uuid },

    /// Any other event kind
    Unrecognized(String),
}

/// What handling an event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The account now has Chirpy Red
    Upgraded(Uuid),

    /// Nothing to do
    Ignored,
}

/// Webhook errors
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Body is not JSON, has no `event`, or a known event has bad `data`
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// The account does not exist
    #[error("User {0} not found")]
    UserNotFound(Uuid),

    /// Storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<WebhookPayload> for WebhookEvent {
    fn from(payload: WebhookPayload) -> Self {
        match payload {
            WebhookPayload::UserUpgraded { user_id } => WebhookEvent::UserUpgraded { user_id },
        }
    }
}

impl WebhookEvent {
    /// Decodes a raw webhook body
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if the body has no string `event`, or if a
    /// known event's `data` does not match its variant
    pub fn from_json(body: &[u8]) -> Result<Self, WebhookError> {
        let invalid = |e: serde_json::Error| WebhookError::InvalidPayload(e.to_string());

        let EventKind { event } = serde_json::from_slice(body).map_err(invalid)?;
        if !KNOWN_EVENTS.contains(&event.as_str()) {
            return Ok(WebhookEvent::Unrecognized(event));
        }

        let payload: WebhookPayload = serde_json::from_slice(body).map_err(invalid)?;
        Ok(payload.into())
    }
}

impl WebhookEvent {
    /// Applies the event to the store
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if an upgrade names an unknown account
    pub async fn apply(&self, store: &dyn Store) -> Result<WebhookOutcome, WebhookError> {
        match self {
            WebhookEvent::UserUpgraded { user_id } => {
                if !store.upgrade_user(*user_id).await? {
                    return Err(WebhookError::UserNotFound(*user_id));
                }
                info!(user_id = %user_id, "User upgraded to Chirpy Red");
                Ok(WebhookOutcome::Upgraded(*user_id))
            }
            WebhookEvent::Unrecognized(kind) => {
                debug!(event = %kind, "Ignoring webhook event");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }
}
