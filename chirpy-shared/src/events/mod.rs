/// Inbound events
///
/// - `webhook`: Subscription events from the payment provider

pub mod webhook;

pub use webhook::{WebhookError, WebhookEvent, WebhookOutcome, WebhookPayload};
